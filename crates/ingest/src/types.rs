//! Core data model types for the ingest crate.
//!
//! Inbound requests arrive in one of two transport shapes and are reduced by
//! their adapter to a single [`IngestionRequest`]:
//!
//! ```text
//! MultipartUpload                       Base64Payload (JSON)
//! ├── file: Option<UploadedFile>        ├── UserID
//! │   ├── filename                      ├── DateTimes
//! │   ├── content_type                  ├── FileSize
//! │   └── bytes                         ├── UploadTime
//! └── fields: name -> [values]          └── resultSheetPDF (Base64 text)
//!         │                                     │
//!         └──────── adapter ──────┬─────────────┘
//!                                 ▼
//!                         IngestionRequest
//!                         ├── source
//!                         ├── name
//!                         ├── bytes
//!                         ├── declared_size
//!                         └── declared_time
//! ```
//!
//! None of these types outlive the request that produced them.
use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Transport encoding a document arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestSource {
    /// `multipart/form-data` upload with a `file` part.
    Multipart,
    /// JSON body carrying the document as Base64 text.
    Base64,
}

impl IngestSource {
    pub fn as_str(self) -> &'static str {
        match self {
            IngestSource::Multipart => "multipart",
            IngestSource::Base64 => "base64",
        }
    }
}

impl fmt::Display for IngestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file part pulled out of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Filename as sent by the client, possibly including directories.
    pub filename: String,
    /// Content type declared on the part, if any. Informational only.
    pub content_type: Option<String>,
    /// Full part content.
    pub bytes: Bytes,
}

/// A fully buffered multipart request: at most one file plus text fields.
///
/// Text fields keep every value in arrival order; the adapter reads the first.
///
/// ```rust
/// use ingest::MultipartUpload;
///
/// let upload = MultipartUpload::new()
///     .with_file("scan.pdf", &b"%PDF-1.7"[..])
///     .with_field("fileSize", "8")
///     .with_field("fileSize", "9");
///
/// assert_eq!(upload.first_field("fileSize"), Some("8"));
/// assert_eq!(upload.first_field("uploadTime"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartUpload {
    pub file: Option<UploadedFile>,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl MultipartUpload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file part, replacing any previous one.
    pub fn with_file(mut self, filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.file = Some(UploadedFile {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        });
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_field(name, value);
        self
    }

    /// Appends a value to the named text field.
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// First value supplied for `name`, if any.
    pub fn first_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// JSON body of the Base64 upload endpoint.
///
/// Every field is optional at the schema level; required-field checks happen
/// in [`ingest_base64`](crate::ingest_base64). Unknown keys are ignored.
///
/// ```rust
/// use ingest::Base64Payload;
///
/// let payload: Base64Payload = serde_json::from_str(
///     r#"{"UserID":"u-1","FileSize":"8","resultSheetPDF":"JVBERi0xLjQ="}"#,
/// ).unwrap();
/// assert_eq!(payload.user_id.as_deref(), Some("u-1"));
/// assert!(payload.upload_time.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base64Payload {
    #[serde(rename = "UserID", default)]
    pub user_id: Option<String>,
    /// Free-form event/date label chosen by the client.
    #[serde(rename = "DateTimes", default)]
    pub date_times: Option<String>,
    #[serde(rename = "FileSize", default)]
    pub file_size: Option<String>,
    #[serde(rename = "UploadTime", default)]
    pub upload_time: Option<String>,
    /// The document, Base64 encoded. May be wrapped with whitespace.
    #[serde(rename = "resultSheetPDF", default)]
    pub result_sheet_pdf: Option<String>,
}

/// Transport-independent view of one upload, produced by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionRequest {
    pub source: IngestSource,
    /// Base filename (multipart) or identifier-derived name (Base64).
    pub name: String,
    pub bytes: Bytes,
    /// Caller-declared size, untrusted.
    pub declared_size: Option<String>,
    /// Caller-declared upload time, untrusted.
    pub declared_time: Option<String>,
}

impl IngestionRequest {
    /// Number of bytes actually received.
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared size parsed as a signed integer.
    ///
    /// Returns `None` when the field is absent or not an integer. Negative
    /// values are kept so they can be reported as a mismatch.
    pub fn declared_size_bytes(&self) -> Option<i64> {
        self.declared_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
    }
}
