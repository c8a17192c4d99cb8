//! Prometheus counters for intake events.
use std::time::Duration;

use ingest::{
    Acceptance, Base64Payload, IngestError, IngestSource, IntakeObserver, MultipartUpload,
    StoreError, TracingObserver,
};
use metrics::{counter, histogram};

pub const ACCEPTED_TOTAL: &str = "pdf_intake_accepted_total";
pub const REJECTED_TOTAL: &str = "pdf_intake_rejected_total";
pub const SIZE_MISMATCH_TOTAL: &str = "pdf_intake_size_mismatch_total";
pub const STORE_FAILED_TOTAL: &str = "pdf_intake_store_failed_total";
pub const DOCUMENT_BYTES: &str = "pdf_intake_bytes";
pub const DURATION_SECONDS: &str = "pdf_intake_duration_seconds";

/// Records metrics for every event, then forwards to the wrapped observer.
///
/// Without an installed recorder the `metrics` macros are no-ops, so this is
/// safe to use when `/metrics` is disabled.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver<O = TracingObserver> {
    inner: O,
}

impl<O: IntakeObserver> MetricsObserver<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }
}

impl<O: IntakeObserver> IntakeObserver for MetricsObserver<O> {
    fn received_multipart(&self, upload: &MultipartUpload) {
        self.inner.received_multipart(upload);
    }

    fn received_base64(&self, payload: &Base64Payload) {
        self.inner.received_base64(payload);
    }

    fn received_raw_json(&self, excerpt: &str, total_bytes: usize) {
        counter!("pdf_intake_raw_json_total").increment(1);
        self.inner.received_raw_json(excerpt, total_bytes);
    }

    fn size_mismatch(&self, source: IngestSource, declared: i64, actual: u64) {
        counter!(SIZE_MISMATCH_TOTAL, "source" => source.as_str()).increment(1);
        self.inner.size_mismatch(source, declared, actual);
    }

    fn size_matched(&self, source: IngestSource, size: u64) {
        self.inner.size_matched(source, size);
    }

    fn store_failed(&self, source: IngestSource, name: &str, error: &StoreError) {
        counter!(STORE_FAILED_TOTAL, "source" => source.as_str()).increment(1);
        self.inner.store_failed(source, name, error);
    }

    fn accepted(&self, acceptance: &Acceptance, elapsed: Duration) {
        let source = acceptance.source.as_str();
        counter!(ACCEPTED_TOTAL, "source" => source).increment(1);
        histogram!(DOCUMENT_BYTES, "source" => source).record(acceptance.actual_byte_length as f64);
        histogram!(DURATION_SECONDS, "source" => source).record(elapsed.as_secs_f64());
        self.inner.accepted(acceptance, elapsed);
    }

    fn rejected(&self, source: IngestSource, error: &IngestError, elapsed: Duration) {
        counter!(
            REJECTED_TOTAL,
            "source" => source.as_str(),
            "reason" => error.reason_code()
        )
        .increment(1);
        histogram!(DURATION_SECONDS, "source" => source.as_str()).record(elapsed.as_secs_f64());
        self.inner.rejected(source, error, elapsed);
    }
}
