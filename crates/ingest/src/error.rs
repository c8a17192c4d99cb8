//! Error types produced by the ingest crate.
//!
//! Every rejection the pipeline can emit is a variant of [`IngestError`]. The
//! `Display` text of each variant is the human-readable message that ends up
//! in the `ErrorMsg` field of the wire response, so it must never carry
//! decoder internals or other implementation detail.
//!
//! # Error Categories
//!
//! | Error | Kind | Description |
//! |-------|------|-------------|
//! | [`NoFileReceived`](IngestError::NoFileReceived) | Missing input | Multipart request has no (or an empty) file part |
//! | [`EmptyRequestBody`](IngestError::EmptyRequestBody) | Missing input | JSON body absent or `null` |
//! | [`EmptyEncodedDocument`](IngestError::EmptyEncodedDocument) | Missing input | `resultSheetPDF` absent or blank |
//! | [`UnsupportedFileType`](IngestError::UnsupportedFileType) | Unsupported format | Filename does not end in `.pdf` |
//! | [`NotAPdf`](IngestError::NotAPdf) | Unsupported format | Bytes lack the `%PDF-` signature |
//! | [`MalformedEncodedDocument`](IngestError::MalformedEncodedDocument) | Malformed encoding | Base64 text fails to decode |
//! | [`InvalidJsonBody`](IngestError::InvalidJsonBody) | Malformed encoding | Body is not JSON of the expected shape |
//! | [`MissingFormFields`](IngestError::MissingFormFields) | Missing metadata | `fileSize` / `uploadTime` absent |
//! | [`SizeMismatch`](IngestError::SizeMismatch) | Missing metadata | Declared size differs (strict policy only) |
//! | [`Internal`](IngestError::Internal) | Internal | Stream, storage, or handler failure |
//!
//! # Examples
//!
//! ```rust
//! use ingest::{ErrorKind, IngestError};
//!
//! let err = IngestError::MalformedEncodedDocument;
//! assert_eq!(err.to_string(), "malformed encoded document");
//! assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
//! assert_eq!(err.reason_code(), "malformed_encoding");
//! ```
use std::fmt;

use thiserror::Error;

/// Reasons a document can be rejected by the intake pipeline.
///
/// All variants are cloneable and comparable so tests can assert on exact
/// outcomes. The enum is `#[non_exhaustive]`; match with a catch-all arm.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The multipart request carried no `file` part, or the part was empty.
    #[error("no file received")]
    NoFileReceived,

    /// The uploaded filename does not carry a `.pdf` extension.
    ///
    /// The filename is kept for logging; it is not part of the message.
    #[error("unsupported file type: only PDF files are accepted")]
    UnsupportedFileType {
        /// Filename as supplied by the client.
        filename: String,
    },

    /// Required multipart text fields are absent or empty.
    ///
    /// `missing` lists the wire names of the absent fields in request order.
    #[error("missing form fields: {}", .missing.join(", "))]
    MissingFormFields {
        /// Wire names of the fields that were absent or empty.
        missing: Vec<&'static str>,
    },

    /// The JSON request body was empty or the literal `null`.
    #[error("empty request body")]
    EmptyRequestBody,

    /// The request body could not be deserialized into the expected schema.
    #[error("invalid JSON request body")]
    InvalidJsonBody,

    /// The Base64 document field was absent, empty, or whitespace only.
    #[error("empty encoded document")]
    EmptyEncodedDocument,

    /// The Base64 document field failed to decode.
    #[error("malformed encoded document")]
    MalformedEncodedDocument,

    /// The decoded bytes do not start with the `%PDF-` signature.
    #[error("not a valid PDF document")]
    NotAPdf,

    /// Declared size disagrees with the received byte count.
    ///
    /// Only produced under [`SizePolicy::Strict`](crate::SizePolicy::Strict).
    #[error("declared file size {declared} does not match actual size {actual}")]
    SizeMismatch {
        /// Size the caller claimed, in bytes.
        declared: i64,
        /// Size actually received, in bytes.
        actual: u64,
    },

    /// Anything else that went wrong while handling the request.
    #[error("processing failed: {0}")]
    Internal(String),
}

/// Coarse classification of an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingInput,
    UnsupportedFormat,
    MalformedEncoding,
    MissingMetadata,
    Internal,
}

impl ErrorKind {
    /// Stable snake_case code, suitable for logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "missing_input",
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::MalformedEncoding => "malformed_encoding",
            ErrorKind::MissingMetadata => "missing_metadata",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IngestError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::NoFileReceived
            | IngestError::EmptyRequestBody
            | IngestError::EmptyEncodedDocument => ErrorKind::MissingInput,
            IngestError::UnsupportedFileType { .. } | IngestError::NotAPdf => {
                ErrorKind::UnsupportedFormat
            }
            IngestError::MalformedEncodedDocument | IngestError::InvalidJsonBody => {
                ErrorKind::MalformedEncoding
            }
            IngestError::MissingFormFields { .. } | IngestError::SizeMismatch { .. } => {
                ErrorKind::MissingMetadata
            }
            IngestError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable reason code for this error, equal to `self.kind().as_str()`.
    pub fn reason_code(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns true if the caller sent something the pipeline cannot accept.
    ///
    /// ```rust
    /// use ingest::IngestError;
    ///
    /// assert!(IngestError::NotAPdf.is_client_error());
    /// assert!(!IngestError::Internal("disk full".into()).is_client_error());
    /// ```
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }

    /// Suggested HTTP status when the server runs with conventional status codes.
    ///
    /// - Missing input, malformed encoding: 400
    /// - Unsupported format: 415
    /// - Missing metadata: 422
    /// - Internal: 500
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::MissingInput | ErrorKind::MalformedEncoding => 400,
            ErrorKind::UnsupportedFormat => 415,
            ErrorKind::MissingMetadata => 422,
            ErrorKind::Internal => 500,
        }
    }
}
