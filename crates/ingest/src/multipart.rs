//! Multipart ingestion adapter.
//!
//! Turns a buffered [`MultipartUpload`] into an [`IngestionRequest`], applying
//! the transport-level checks in order and stopping at the first failure:
//!
//! 1. a non-empty `file` part must be present
//! 2. its filename must end in `.pdf` (case-insensitive)
//! 3. the `fileSize` and `uploadTime` fields must be present and non-empty
//!
//! Signature validation happens afterwards in the pipeline, shared with the
//! Base64 path.
use crate::error::IngestError;
use crate::pdf::{base_name, has_pdf_extension};
use crate::types::{IngestSource, IngestionRequest, MultipartUpload};

/// Name of the multipart part carrying the document.
pub const FILE_FIELD: &str = "file";
/// Form field carrying the caller's declared size.
pub const FILE_SIZE_FIELD: &str = "fileSize";
/// Form field carrying the caller's declared upload time.
pub const UPLOAD_TIME_FIELD: &str = "uploadTime";

/// Validates a multipart upload and converts it into an [`IngestionRequest`].
///
/// # Errors
///
/// - [`IngestError::NoFileReceived`] when the file part is missing or empty
/// - [`IngestError::UnsupportedFileType`] when the filename is not `.pdf`
/// - [`IngestError::MissingFormFields`] naming each absent declared field
///
/// ```rust
/// use ingest::{ingest_multipart, IngestError, MultipartUpload};
///
/// let upload = MultipartUpload::new()
///     .with_file("notes.txt", &b"%PDF-1.4"[..])
///     .with_field("fileSize", "8")
///     .with_field("uploadTime", "2024-06-01 12:00:00");
///
/// assert!(matches!(
///     ingest_multipart(upload),
///     Err(IngestError::UnsupportedFileType { .. })
/// ));
/// ```
pub fn ingest_multipart(upload: MultipartUpload) -> Result<IngestionRequest, IngestError> {
    let file = match upload.file {
        Some(ref file) if !file.bytes.is_empty() => file,
        _ => return Err(IngestError::NoFileReceived),
    };

    if !has_pdf_extension(&file.filename) {
        return Err(IngestError::UnsupportedFileType {
            filename: file.filename.clone(),
        });
    }

    let declared_size = non_empty(upload.first_field(FILE_SIZE_FIELD));
    let declared_time = non_empty(upload.first_field(UPLOAD_TIME_FIELD));

    let mut missing = Vec::new();
    if declared_size.is_none() {
        missing.push(FILE_SIZE_FIELD);
    }
    if declared_time.is_none() {
        missing.push(UPLOAD_TIME_FIELD);
    }
    if !missing.is_empty() {
        return Err(IngestError::MissingFormFields { missing });
    }

    Ok(IngestionRequest {
        source: IngestSource::Multipart,
        name: base_name(&file.filename).to_string(),
        bytes: file.bytes.clone(),
        declared_size,
        declared_time,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}
