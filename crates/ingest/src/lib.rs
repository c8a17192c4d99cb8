//! PDF Intake Pipeline
//!
//! This is where uploaded documents enter the service. Two transports feed
//! the same decision chain:
//!
//! - **Multipart** ([`ingest_multipart`]) - a `file` part plus `fileSize` /
//!   `uploadTime` text fields; checks presence, extension, and fields.
//! - **Base64 JSON** ([`ingest_base64`]) - a [`Base64Payload`] whose
//!   `resultSheetPDF` is whitespace-stripped and decoded.
//!
//! Both adapters produce an [`IngestionRequest`], which is checked for the
//! `%PDF-` signature ([`is_valid_pdf`]), cross-checked against the declared
//! size, optionally persisted through a [`DocumentStore`], and reported as a
//! [`ValidationOutcome`]. [`report`] turns any outcome into the uniform
//! [`IntakeResponse`] wire shape.
//!
//! Logging goes through an injected [`IntakeObserver`]; the pipeline itself
//! never touches a global logger.
//!
//! ## Example
//!
//! ```
//! use ingest::{report, Base64Payload, IntakeConfig, IntakePipeline};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pipeline = IntakePipeline::new(IntakeConfig::default());
//! let payload = Base64Payload {
//!     result_sheet_pdf: Some("JVBERi0x\nLjQ=".into()), // "%PDF-1.4", line-wrapped
//!     ..Default::default()
//! };
//!
//! let response = report(pipeline.process_base64(Some(payload)).await);
//! assert!(response.is_result);
//! assert_eq!(response.error_msg, "");
//! assert_eq!(response.actual_file_size, Some(8));
//! # }
//! ```

mod config;
mod encoded;
mod error;
mod multipart;
mod observer;
mod outcome;
mod pdf;
mod pipeline;
mod report;
mod store;
mod types;

pub use crate::config::{ConfigError, IntakeConfig, SizePolicy};
pub use crate::encoded::{
    decode_document, ingest_base64, normalize_base64, parse_base64_body, DEFAULT_DOCUMENT_NAME,
};
pub use crate::error::{ErrorKind, IngestError};
pub use crate::multipart::{ingest_multipart, FILE_FIELD, FILE_SIZE_FIELD, UPLOAD_TIME_FIELD};
pub use crate::observer::{IntakeObserver, TracingObserver};
pub use crate::outcome::{Acceptance, ValidationOutcome};
pub use crate::pdf::{base_name, has_pdf_extension, is_valid_pdf, PDF_EXTENSION, PDF_MAGIC};
pub use crate::pipeline::{
    storage_name, IntakePipeline, MAX_STORED_NAME_BYTES, STORAGE_TIMESTAMP_FORMAT,
};
pub use crate::report::{report, IntakeResponse, SERVER_TIME_FORMAT};
pub use crate::store::{
    sanitize_file_name, DocumentStore, FsDocumentStore, MemoryDocumentStore, StoreError,
};
pub use crate::types::{
    Base64Payload, IngestSource, IngestionRequest, MultipartUpload, UploadedFile,
};
