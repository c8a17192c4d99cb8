//! The intake pipeline: adapter → validator → (store) → outcome.
//!
//! [`IntakePipeline`] owns no per-request state; one instance is shared by
//! all concurrent requests. Every entry point returns a
//! [`ValidationOutcome`] instead of an error so callers can report rejections
//! in-band.
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};

use crate::config::{IntakeConfig, SizePolicy};
use crate::encoded::{ingest_base64, parse_base64_body};
use crate::error::IngestError;
use crate::multipart::ingest_multipart;
use crate::observer::{IntakeObserver, TracingObserver};
use crate::outcome::{Acceptance, ValidationOutcome};
use crate::pdf::is_valid_pdf;
use crate::report::IntakeResponse;
use crate::store::DocumentStore;
use crate::types::{Base64Payload, IngestSource, IngestionRequest, MultipartUpload};

/// `chrono` format for the timestamp prefix of stored documents.
///
/// Nanosecond resolution keeps names unique across concurrent uploads of the
/// same file.
pub const STORAGE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%9f";

/// Longest client-derived part of a stored file name, in bytes.
pub const MAX_STORED_NAME_BYTES: usize = 200;

/// `ErrorMsg` detail when persistence fails; store errors are only logged.
const STORE_FAILURE_MESSAGE: &str = "could not store document";

/// Shared, stateless validation pipeline.
#[derive(Clone)]
pub struct IntakePipeline {
    config: IntakeConfig,
    observer: Arc<dyn IntakeObserver>,
    store: Option<Arc<dyn DocumentStore>>,
}

impl std::fmt::Debug for IntakePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakePipeline")
            .field("config", &self.config)
            .field("store", &self.store.as_ref().map(|store| store.kind()))
            .finish_non_exhaustive()
    }
}

impl Default for IntakePipeline {
    fn default() -> Self {
        Self::new(IntakeConfig::default())
    }
}

impl IntakePipeline {
    /// Creates a pipeline that logs through [`TracingObserver`] and persists nothing.
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            observer: Arc::new(TracingObserver),
            store: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn IntakeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Enables persistence of accepted documents.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Kind of the configured store, or `None` when persistence is disabled.
    pub fn store_kind(&self) -> Option<&'static str> {
        self.store.as_ref().map(|store| store.kind())
    }

    /// Runs a buffered multipart upload through the pipeline.
    pub async fn process_multipart(&self, upload: MultipartUpload) -> ValidationOutcome {
        let start = Instant::now();
        self.observer.received_multipart(&upload);
        match ingest_multipart(upload) {
            Ok(request) => self.finish(request, start).await,
            Err(err) => self.reject_since(IngestSource::Multipart, err, start),
        }
    }

    /// Runs an already-deserialized Base64 payload through the pipeline.
    ///
    /// `None` stands for an absent or `null` body.
    pub async fn process_base64(&self, payload: Option<Base64Payload>) -> ValidationOutcome {
        let start = Instant::now();
        if let Some(payload) = &payload {
            self.observer.received_base64(payload);
        }
        match ingest_base64(payload) {
            Ok(request) => self.finish(request, start).await,
            Err(err) => self.reject_since(IngestSource::Base64, err, start),
        }
    }

    /// Parses a raw JSON body and runs it through the Base64 path.
    pub async fn process_base64_body(&self, body: &[u8]) -> ValidationOutcome {
        match parse_base64_body(body) {
            Ok(payload) => self.process_base64(payload).await,
            Err(err) => self.reject(IngestSource::Base64, err),
        }
    }

    /// Acknowledges an arbitrary body on the permissive endpoint.
    ///
    /// The body is never parsed. When logging is enabled, at most
    /// `max_logged_body_bytes` of it (cut on a UTF-8 boundary) reach the
    /// observer.
    pub fn acknowledge_raw_json(&self, body: &[u8]) -> IntakeResponse {
        if self.config.log_raw_json {
            let text = String::from_utf8_lossy(body);
            let excerpt = truncate_on_char_boundary(&text, self.config.max_logged_body_bytes);
            self.observer.received_raw_json(excerpt, body.len());
        }
        IntakeResponse::acknowledged()
    }

    /// Records a rejection raised outside the pipeline (e.g. a transport
    /// read failure) and wraps it in an outcome.
    pub fn reject(&self, source: IngestSource, err: IngestError) -> ValidationOutcome {
        self.reject_since(source, err, Instant::now())
    }

    fn reject_since(
        &self,
        source: IngestSource,
        err: IngestError,
        start: Instant,
    ) -> ValidationOutcome {
        self.observer.rejected(source, &err, start.elapsed());
        ValidationOutcome::Rejected(err)
    }

    async fn finish(&self, request: IngestionRequest, start: Instant) -> ValidationOutcome {
        let source = request.source;
        match self.accept(request).await {
            Ok(acceptance) => {
                self.observer.accepted(&acceptance, start.elapsed());
                ValidationOutcome::Accepted(acceptance)
            }
            Err(err) => self.reject_since(source, err, start),
        }
    }

    async fn accept(&self, request: IngestionRequest) -> Result<Acceptance, IngestError> {
        if !is_valid_pdf(&request.bytes) {
            return Err(IngestError::NotAPdf);
        }

        let size_mismatch = self.check_declared_size(&request)?;

        let now = Local::now();
        let stored_at = match &self.store {
            Some(store) => {
                let name = storage_name(&request.name, now);
                let location = store.store(&request.bytes, &name).await.map_err(|err| {
                    self.observer.store_failed(request.source, &name, &err);
                    IngestError::Internal(STORE_FAILURE_MESSAGE.to_string())
                })?;
                Some(location)
            }
            None => None,
        };

        Ok(Acceptance {
            source: request.source,
            actual_byte_length: request.byte_len(),
            name: request.name,
            server_timestamp: now,
            echoed_declared_size: request.declared_size,
            echoed_declared_time: request.declared_time,
            size_mismatch,
            stored_at,
        })
    }

    /// Returns whether the declared size disagrees with the received bytes.
    /// Unparseable declarations are ignored.
    fn check_declared_size(&self, request: &IngestionRequest) -> Result<bool, IngestError> {
        let Some(declared) = request.declared_size_bytes() else {
            return Ok(false);
        };
        let actual = request.byte_len();
        if u64::try_from(declared) == Ok(actual) {
            self.observer.size_matched(request.source, actual);
            return Ok(false);
        }

        self.observer.size_mismatch(request.source, declared, actual);
        match self.config.size_policy {
            SizePolicy::Advisory => Ok(true),
            SizePolicy::Strict => Err(IngestError::SizeMismatch { declared, actual }),
        }
    }
}

/// `{timestamp}_{name}` with the timestamp in [`STORAGE_TIMESTAMP_FORMAT`].
///
/// The client-derived `name` is cut to [`MAX_STORED_NAME_BYTES`], keeping a
/// short extension, so the result stays under common file name limits.
pub fn storage_name(name: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_{}",
        now.format(STORAGE_TIMESTAMP_FORMAT),
        cap_name(name, MAX_STORED_NAME_BYTES)
    )
}

fn cap_name(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() + 1 < max_bytes / 2 => {
            let stem = truncate_on_char_boundary(stem, max_bytes - ext.len() - 1);
            format!("{stem}.{ext}")
        }
        _ => truncate_on_char_boundary(name, max_bytes).to_string(),
    }
}

fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::{FILE_SIZE_FIELD, UPLOAD_TIME_FIELD};
    use crate::store::{FsDocumentStore, MemoryDocumentStore, StoreError};
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use bytes::Bytes;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::time::Duration;

    const PDF_1_4: &[u8] = b"%PDF-1.4";

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Mismatch(i64, u64),
        Matched(u64),
        StoreFailed(String),
        Accepted(String),
        Rejected(&'static str),
        RawJson(String, usize),
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl IntakeObserver for RecordingObserver {
        fn received_raw_json(&self, excerpt: &str, total_bytes: usize) {
            self.push(Event::RawJson(excerpt.to_string(), total_bytes));
        }

        fn size_mismatch(&self, _source: IngestSource, declared: i64, actual: u64) {
            self.push(Event::Mismatch(declared, actual));
        }

        fn size_matched(&self, _source: IngestSource, size: u64) {
            self.push(Event::Matched(size));
        }

        fn store_failed(&self, _source: IngestSource, _name: &str, error: &StoreError) {
            self.push(Event::StoreFailed(error.to_string()));
        }

        fn accepted(&self, acceptance: &Acceptance, _elapsed: Duration) {
            self.push(Event::Accepted(acceptance.name.clone()));
        }

        fn rejected(&self, _source: IngestSource, error: &IngestError, _elapsed: Duration) {
            self.push(Event::Rejected(error.reason_code()));
        }
    }

    fn pipeline(config: IntakeConfig) -> (IntakePipeline, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let pipeline = IntakePipeline::new(config).with_observer(observer.clone());
        (pipeline, observer)
    }

    fn upload(filename: &str, bytes: &'static [u8], size: &str) -> MultipartUpload {
        MultipartUpload::new()
            .with_file(filename, Bytes::from_static(bytes))
            .with_field(FILE_SIZE_FIELD, size)
            .with_field(UPLOAD_TIME_FIELD, "2024-06-01 12:00:00")
    }

    fn payload(encoded: String, size: Option<&str>) -> Base64Payload {
        Base64Payload {
            user_id: Some("u1".into()),
            date_times: Some("run-3".into()),
            file_size: size.map(str::to_owned),
            upload_time: Some("2024-06-01 12:00:00".into()),
            result_sheet_pdf: Some(encoded),
        }
    }

    #[tokio::test]
    async fn multipart_accepts_pdf() {
        let (pipeline, observer) = pipeline(IntakeConfig::default());
        let outcome = pipeline
            .process_multipart(upload("scan.pdf", PDF_1_4, "8"))
            .await;

        let acceptance = outcome.acceptance().expect("accepted");
        assert_eq!(acceptance.actual_byte_length, 8);
        assert_eq!(acceptance.echoed_declared_size.as_deref(), Some("8"));
        assert!(!acceptance.size_mismatch);
        assert!(acceptance.stored_at.is_none());
        assert_eq!(
            observer.events(),
            vec![Event::Matched(8), Event::Accepted("scan.pdf".into())]
        );
    }

    #[tokio::test]
    async fn multipart_rejects_bytes_without_signature() {
        let (pipeline, observer) = pipeline(IntakeConfig::default());
        let outcome = pipeline
            .process_multipart(upload("scan.pdf", b"hello world", "11"))
            .await;
        assert_eq!(outcome.rejection(), Some(&IngestError::NotAPdf));
        assert_eq!(observer.events(), vec![Event::Rejected("unsupported_format")]);
    }

    #[tokio::test]
    async fn base64_accepts_pdf() {
        let (pipeline, _) = pipeline(IntakeConfig::default());
        let outcome = pipeline
            .process_base64(Some(payload(STANDARD.encode(PDF_1_4), Some("8"))))
            .await;
        assert!(outcome.is_accepted());
        assert_eq!(outcome.acceptance().unwrap().name, "u1_run-3.pdf");
    }

    #[tokio::test]
    async fn base64_rejects_decoded_non_pdf() {
        let (pipeline, _) = pipeline(IntakeConfig::default());
        let outcome = pipeline
            .process_base64(Some(payload(STANDARD.encode(b"GIF89a"), None)))
            .await;
        assert_eq!(outcome.rejection(), Some(&IngestError::NotAPdf));
    }

    #[tokio::test]
    async fn size_mismatch_is_advisory_by_default() {
        let (pipeline, observer) = pipeline(IntakeConfig::default());
        let outcome = pipeline
            .process_base64(Some(payload(STANDARD.encode(PDF_1_4), Some("1024"))))
            .await;

        let acceptance = outcome.acceptance().expect("accepted despite mismatch");
        assert!(acceptance.size_mismatch);
        assert_eq!(
            observer.events(),
            vec![Event::Mismatch(1024, 8), Event::Accepted("u1_run-3.pdf".into())]
        );
    }

    #[tokio::test]
    async fn size_mismatch_rejects_under_strict_policy() {
        let (pipeline, _) = pipeline(IntakeConfig {
            size_policy: SizePolicy::Strict,
            ..Default::default()
        });

        let outcome = pipeline
            .process_multipart(upload("scan.pdf", PDF_1_4, "9"))
            .await;
        assert_eq!(
            outcome.rejection(),
            Some(&IngestError::SizeMismatch {
                declared: 9,
                actual: 8
            })
        );
    }

    #[tokio::test]
    async fn unparseable_declared_size_is_ignored() {
        let (pipeline, observer) = pipeline(IntakeConfig {
            size_policy: SizePolicy::Strict,
            ..Default::default()
        });
        let outcome = pipeline
            .process_multipart(upload("scan.pdf", PDF_1_4, "8 bytes"))
            .await;
        assert!(outcome.is_accepted());
        assert_eq!(observer.events(), vec![Event::Accepted("scan.pdf".into())]);
    }

    #[tokio::test]
    async fn accepted_documents_are_stored() {
        let store = Arc::new(MemoryDocumentStore::new());
        let pipeline = IntakePipeline::default().with_store(store.clone());
        assert_eq!(pipeline.store_kind(), Some("memory"));

        let outcome = pipeline
            .process_multipart(upload("dir/scan.pdf", PDF_1_4, "8"))
            .await;
        let location = outcome
            .acceptance()
            .and_then(|a| a.stored_at.clone())
            .expect("stored");

        let names = store.names();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with("_scan.pdf"), "{}", names[0]);
        assert_eq!(location, format!("memory://{}", names[0]));
        assert_eq!(store.get(&names[0]).as_deref(), Some(PDF_1_4));
    }

    #[tokio::test]
    async fn rejected_documents_are_not_stored() {
        let store = Arc::new(MemoryDocumentStore::new());
        let pipeline = IntakePipeline::default().with_store(store.clone());

        let outcome = pipeline
            .process_base64(Some(payload(STANDARD.encode(b"plain text"), None)))
            .await;
        assert!(!outcome.is_accepted());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn body_parsing_feeds_base64_path() {
        let (pipeline, _) = pipeline(IntakeConfig::default());
        assert_eq!(
            pipeline.process_base64_body(b"").await.rejection(),
            Some(&IngestError::EmptyRequestBody)
        );
        assert_eq!(
            pipeline.process_base64_body(b"{oops").await.rejection(),
            Some(&IngestError::InvalidJsonBody)
        );
        let body = format!(r#"{{"resultSheetPDF": "{}"}}"#, STANDARD.encode(PDF_1_4));
        assert!(pipeline
            .process_base64_body(body.as_bytes())
            .await
            .is_accepted());
    }

    #[test]
    fn raw_json_is_acknowledged_and_truncated() {
        let (pipeline, observer) = pipeline(IntakeConfig {
            max_logged_body_bytes: 3,
            ..Default::default()
        });
        let response = pipeline.acknowledge_raw_json("{\"é\":1}".as_bytes());
        assert_eq!(response, IntakeResponse::acknowledged());
        // byte 3 falls inside the two-byte 'é'
        assert_eq!(observer.events(), vec![Event::RawJson("{\"".into(), 8)]);
    }

    #[test]
    fn raw_json_logging_can_be_disabled() {
        let (pipeline, observer) = pipeline(IntakeConfig {
            log_raw_json: false,
            ..Default::default()
        });
        assert!(pipeline.acknowledge_raw_json(b"{}").is_result);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn explicit_rejection_is_observed() {
        let (pipeline, observer) = pipeline(IntakeConfig::default());
        let outcome =
            pipeline.reject(IngestSource::Multipart, IngestError::Internal("eof".into()));
        assert_eq!(
            outcome.rejection(),
            Some(&IngestError::Internal("eof".into()))
        );
        assert_eq!(observer.events(), vec![Event::Rejected("internal")]);
    }

    #[test]
    fn storage_names_embed_nanosecond_timestamp() {
        let Some(now) = Local.with_ymd_and_hms(2024, 6, 1, 9, 5, 7).single() else {
            panic!("ambiguous local timestamp");
        };
        assert_eq!(
            storage_name("scan.pdf", now),
            "20240601090507000000000_scan.pdf"
        );
    }

    #[tokio::test]
    async fn negative_declared_size_is_a_mismatch() {
        let (pipeline, observer) = pipeline(IntakeConfig::default());
        let outcome = pipeline
            .process_multipart(upload("scan.pdf", PDF_1_4, "-8"))
            .await;
        assert!(outcome.acceptance().expect("advisory accepts").size_mismatch);
        assert_eq!(observer.events()[0], Event::Mismatch(-8, 8));

        let (strict, _) = pipeline_strict();
        let outcome = strict
            .process_base64(Some(payload(STANDARD.encode(PDF_1_4), Some("-8"))))
            .await;
        assert_eq!(
            outcome.rejection(),
            Some(&IngestError::SizeMismatch {
                declared: -8,
                actual: 8
            })
        );
    }

    fn pipeline_strict() -> (IntakePipeline, Arc<RecordingObserver>) {
        pipeline(IntakeConfig {
            size_policy: SizePolicy::Strict,
            ..Default::default()
        })
    }

    fn long_label_payload() -> Base64Payload {
        Base64Payload {
            date_times: Some("x".repeat(300)),
            ..payload(STANDARD.encode(PDF_1_4), Some("8"))
        }
    }

    #[tokio::test]
    async fn long_identifiers_still_store_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsDocumentStore::open(dir.path()).await.expect("open store");
        let pipeline = IntakePipeline::default().with_store(Arc::new(store));

        let outcome = pipeline.process_base64(Some(long_label_payload())).await;
        let acceptance = outcome.acceptance().expect("accepted");
        assert!(acceptance.stored_at.is_some());

        let written: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(written.len(), 1);
        let name = written[0].to_string_lossy().into_owned();
        assert!(name.len() < 255, "{} bytes", name.len());
        assert!(name.ends_with(".pdf"));
        assert!(name.contains("_u1_xxx"));
    }

    #[tokio::test]
    async fn long_identifiers_are_capped_in_memory_store() {
        let store = Arc::new(MemoryDocumentStore::new());
        let pipeline = IntakePipeline::default().with_store(store.clone());
        assert!(pipeline
            .process_base64(Some(long_label_payload()))
            .await
            .is_accepted());
        let names = store.names();
        let (_, client_part) = names[0].split_once('_').expect("timestamp prefix");
        assert_eq!(client_part.len(), MAX_STORED_NAME_BYTES);
        assert!(client_part.ends_with(".pdf"));
    }

    #[test]
    fn cap_name_keeps_extension_and_char_boundaries() {
        assert_eq!(cap_name("scan.pdf", 200), "scan.pdf");

        let capped = cap_name(&format!("{}.pdf", "é".repeat(150)), 200);
        assert!(capped.len() <= 200);
        assert!(capped.ends_with(".pdf"));
        assert!(capped.trim_end_matches(".pdf").chars().all(|c| c == 'é'));

        let no_ext = cap_name(&"y".repeat(300), 200);
        assert_eq!(no_ext.len(), 200);
    }

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn store(&self, _bytes: &[u8], suggested_name: &str) -> Result<String, StoreError> {
            Err(StoreError::Io {
                path: std::path::PathBuf::from("/srv/private/intake").join(suggested_name),
                source: std::io::Error::other("disk full"),
            })
        }

        fn kind(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn store_failures_stay_server_side() {
        let (pipeline, observer) = pipeline(IntakeConfig::default());
        let pipeline = pipeline.with_store(Arc::new(BrokenStore));

        let outcome = pipeline
            .process_multipart(upload("scan.pdf", PDF_1_4, "8"))
            .await;
        let err = outcome.rejection().expect("rejected");
        assert_eq!(err.to_string(), "processing failed: could not store document");
        assert!(!err.to_string().contains("/srv"));

        let events = observer.events();
        assert!(matches!(
            &events[1],
            Event::StoreFailed(detail) if detail.contains("/srv/private/intake")
        ));
        assert_eq!(events[2], Event::Rejected("internal"));
    }
}
