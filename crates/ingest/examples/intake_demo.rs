use bytes::Bytes;
use ingest::{
    report, Base64Payload, IntakeConfig, IntakePipeline, MultipartUpload, FILE_SIZE_FIELD,
    UPLOAD_TIME_FIELD,
};

const PDF_HEADER: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let pipeline = IntakePipeline::new(IntakeConfig::default());

    let cases = [
        (
            "multipart, valid",
            MultipartUpload::new()
                .with_file("scan.pdf", Bytes::from_static(PDF_HEADER))
                .with_field(FILE_SIZE_FIELD, PDF_HEADER.len().to_string())
                .with_field(UPLOAD_TIME_FIELD, "2024-01-01 12:00:00"),
        ),
        (
            "multipart, wrong extension",
            MultipartUpload::new()
                .with_file("notes.txt", Bytes::from_static(PDF_HEADER))
                .with_field(FILE_SIZE_FIELD, "15")
                .with_field(UPLOAD_TIME_FIELD, "2024-01-01 12:00:00"),
        ),
        (
            "multipart, missing fields",
            MultipartUpload::new().with_file("scan.pdf", Bytes::from_static(PDF_HEADER)),
        ),
    ];

    for (label, upload) in cases {
        let response = report(pipeline.process_multipart(upload).await);
        println!("{label}: {}", serde_json::to_string(&response).unwrap_or_default());
    }

    let payloads = [
        ("base64, wrapped", "JVBERi0x\r\nLjQ="),
        ("base64, malformed", "not@@base64!!"),
        ("base64, not a pdf", "aGVsbG8gd29ybGQ="),
    ];

    for (label, encoded) in payloads {
        let payload = Base64Payload {
            user_id: Some("demo".into()),
            result_sheet_pdf: Some(encoded.into()),
            ..Default::default()
        };
        let response = report(pipeline.process_base64(Some(payload)).await);
        println!("{label}: {}", serde_json::to_string(&response).unwrap_or_default());
    }
}
