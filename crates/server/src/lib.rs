//! PDF Intake Server - HTTP front end for the `ingest` pipeline
//!
//! Exposes the intake pipeline over three upload endpoints plus the usual
//! probes. Every upload endpoint answers with the same JSON body:
//!
//! ```json
//! { "IsResult": false, "ErrorMsg": "no file received" }
//! ```
//!
//! By default the HTTP status is always 200 and failure is signalled in the
//! body; set `status_codes = "conventional"` to map rejections to 4xx/5xx.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /pdf/upload` - multipart form: `file`, `fileSize`, `uploadTime`
//! - `POST /pdf/upload-base64` - JSON: `UserID`, `DateTimes`, `FileSize`,
//!   `UploadTime`, `resultSheetPDF`
//! - `POST /pdf/upload-any-json` - any body; logged and acknowledged
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (reports storage)
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod middleware;
pub mod observer;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ServerConfig, StatusCodePolicy};
pub use error::{ServerError, ServerResult};
pub use observer::MetricsObserver;
pub use server::{build_router, start_server};
pub use state::ServerState;
