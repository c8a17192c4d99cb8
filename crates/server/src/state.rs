use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::observer::MetricsObserver;
use ingest::{FsDocumentStore, IntakePipeline, TracingObserver};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Intake pipeline (shared across requests)
    pub pipeline: Arc<IntakePipeline>,

    /// Render handle for `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state, opening the filesystem store when
    /// `storage_dir` is configured.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        config.intake.validate()?;

        let mut pipeline = IntakePipeline::new(config.intake.clone())
            .with_observer(Arc::new(MetricsObserver::new(TracingObserver)));

        if let Some(dir) = &config.storage_dir {
            let store = FsDocumentStore::open(dir).await?;
            tracing::info!(root = %store.root().display(), "document store ready");
            pipeline = pipeline.with_store(Arc::new(store));
        }

        Ok(Self::with_pipeline(config, pipeline))
    }

    /// State around a prebuilt pipeline, e.g. one backed by a memory store.
    pub fn with_pipeline(config: ServerConfig, pipeline: IntakePipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metrics: None,
        }
    }

    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
