//! Base64 ingestion adapter.
//!
//! The JSON path carries the document as Base64 text in `resultSheetPDF`.
//! Clients commonly wrap long encodings at 76 columns, so every ASCII
//! whitespace character is removed before decoding with the standard padded
//! alphabet.
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use tracing::debug;

use crate::error::IngestError;
use crate::types::{Base64Payload, IngestSource, IngestionRequest};

/// Name used when a Base64 payload carries neither `UserID` nor `DateTimes`.
pub const DEFAULT_DOCUMENT_NAME: &str = "document.pdf";

/// Parses the raw body of the Base64 endpoint.
///
/// An empty (or whitespace-only) body and the JSON literal `null` both map to
/// `Ok(None)`, which [`ingest_base64`] rejects as an empty request.
///
/// # Errors
///
/// [`IngestError::InvalidJsonBody`] when the body is not JSON of the
/// [`Base64Payload`] shape.
pub fn parse_base64_body(body: &[u8]) -> Result<Option<Base64Payload>, IngestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<Base64Payload>>(body).map_err(|err| {
        debug!(error = %err, "base64 body rejected by json parser");
        IngestError::InvalidJsonBody
    })
}

/// Removes every ASCII whitespace character from Base64 text.
///
/// ```rust
/// use ingest::normalize_base64;
///
/// assert_eq!(normalize_base64("JVBE\r\nRi0x LjQ=\n"), "JVBERi0xLjQ=");
/// ```
pub fn normalize_base64(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

/// Normalizes and decodes Base64 text.
///
/// # Errors
///
/// - [`IngestError::EmptyEncodedDocument`] if nothing is left after normalization
/// - [`IngestError::MalformedEncodedDocument`] on any decoder failure; the
///   decoder's own message is logged at debug level and not returned
pub fn decode_document(text: &str) -> Result<Vec<u8>, IngestError> {
    let normalized = normalize_base64(text);
    if normalized.is_empty() {
        return Err(IngestError::EmptyEncodedDocument);
    }
    STANDARD.decode(normalized.as_bytes()).map_err(|err| {
        debug!(error = %err, encoded_len = normalized.len(), "base64 decode failed");
        IngestError::MalformedEncodedDocument
    })
}

/// Validates a Base64 payload and converts it into an [`IngestionRequest`].
///
/// `None` stands for an absent or `null` body.
///
/// ```rust
/// use ingest::{ingest_base64, Base64Payload, IngestError};
///
/// let payload = Base64Payload {
///     result_sheet_pdf: Some("not@@base64!!".into()),
///     ..Default::default()
/// };
/// assert_eq!(
///     ingest_base64(Some(payload)),
///     Err(IngestError::MalformedEncodedDocument)
/// );
/// assert_eq!(ingest_base64(None), Err(IngestError::EmptyRequestBody));
/// ```
pub fn ingest_base64(payload: Option<Base64Payload>) -> Result<IngestionRequest, IngestError> {
    let payload = payload.ok_or(IngestError::EmptyRequestBody)?;

    let encoded = payload
        .result_sheet_pdf
        .as_deref()
        .filter(|text| !text.is_empty())
        .ok_or(IngestError::EmptyEncodedDocument)?;

    let bytes = decode_document(encoded)?;

    Ok(IngestionRequest {
        source: IngestSource::Base64,
        name: document_name(&payload),
        bytes: Bytes::from(bytes),
        declared_size: payload.file_size,
        declared_time: payload.upload_time,
    })
}

/// `{UserID}_{DateTimes}.pdf`, skipping whichever part is absent.
fn document_name(payload: &Base64Payload) -> String {
    let parts: Vec<&str> = [payload.user_id.as_deref(), payload.date_times.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        DEFAULT_DOCUMENT_NAME.to_string()
    } else {
        format!("{}.pdf", parts.join("_"))
    }
}
