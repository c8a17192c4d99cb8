//! Observability hooks for the intake pipeline.
//!
//! The pipeline never writes to a console or a global logger directly.
//! Instead it reports events to an injected [`IntakeObserver`]; the default
//! [`TracingObserver`] turns them into structured `tracing` events.
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::IngestError;
use crate::outcome::Acceptance;
use crate::store::StoreError;
use crate::types::{Base64Payload, IngestSource, MultipartUpload};

/// Receives pipeline events. Implementations must be cheap and non-blocking.
pub trait IntakeObserver: Send + Sync {
    /// A multipart upload was fully buffered and is about to be validated.
    fn received_multipart(&self, _upload: &MultipartUpload) {}

    /// A Base64 payload was parsed and is about to be validated.
    fn received_base64(&self, _payload: &Base64Payload) {}

    /// The permissive endpoint read a raw body. `excerpt` is already truncated.
    fn received_raw_json(&self, _excerpt: &str, _total_bytes: usize) {}

    /// Declared size parsed as an integer but disagreed with the byte count.
    fn size_mismatch(&self, source: IngestSource, declared: i64, actual: u64);

    /// Declared size parsed and matched the byte count.
    fn size_matched(&self, _source: IngestSource, _size: u64) {}

    /// An accepted document could not be persisted. The error stays
    /// server-side; the caller only sees a generic failure.
    fn store_failed(&self, _source: IngestSource, _name: &str, _error: &StoreError) {}

    fn accepted(&self, acceptance: &Acceptance, elapsed: Duration);

    fn rejected(&self, source: IngestSource, error: &IngestError, elapsed: Duration);
}

/// Default observer: one structured `tracing` event per pipeline event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl IntakeObserver for TracingObserver {
    fn received_multipart(&self, upload: &MultipartUpload) {
        match &upload.file {
            Some(file) => info!(
                filename = %file.filename,
                content_type = ?file.content_type,
                size = file.bytes.len(),
                field_count = upload.fields.len(),
                "multipart_received"
            ),
            None => info!(field_count = upload.fields.len(), "multipart_received_without_file"),
        }
        for (name, values) in &upload.fields {
            debug!(field = %name, values = %values.join(","), "multipart_field");
        }
    }

    fn received_base64(&self, payload: &Base64Payload) {
        info!(
            user_id = ?payload.user_id,
            date_times = ?payload.date_times,
            declared_size = ?payload.file_size,
            declared_time = ?payload.upload_time,
            encoded_len = payload.result_sheet_pdf.as_ref().map_or(0, String::len),
            "base64_received"
        );
    }

    fn received_raw_json(&self, excerpt: &str, total_bytes: usize) {
        info!(total_bytes, body = %excerpt, "raw_json_received");
    }

    fn size_mismatch(&self, source: IngestSource, declared: i64, actual: u64) {
        warn!(%source, declared, actual, "declared_size_mismatch");
    }

    fn size_matched(&self, source: IngestSource, size: u64) {
        debug!(%source, declared = size, actual = size, "declared_size_matched");
    }

    fn store_failed(&self, source: IngestSource, name: &str, error: &StoreError) {
        error!(%source, name = %name, error = %error, "document_store_failed");
    }

    fn accepted(&self, acceptance: &Acceptance, elapsed: Duration) {
        info!(
            source = %acceptance.source,
            name = %acceptance.name,
            actual_size = acceptance.actual_byte_length,
            declared_size = ?acceptance.echoed_declared_size,
            declared_time = ?acceptance.echoed_declared_time,
            stored_at = ?acceptance.stored_at,
            elapsed_micros = elapsed.as_micros(),
            "intake_success"
        );
    }

    fn rejected(&self, source: IngestSource, error: &IngestError, elapsed: Duration) {
        warn!(
            %source,
            reason = error.reason_code(),
            error = %error,
            elapsed_micros = elapsed.as_micros(),
            "intake_failure"
        );
    }
}
