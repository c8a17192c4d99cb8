//! Wire response shared by every intake endpoint.
//!
//! Success and failure use the same JSON object so clients never branch on
//! transport:
//!
//! ```json
//! { "IsResult": true, "ErrorMsg": "", "ReceivedFileSize": "8",
//!   "ReceivedUploadTime": "2024-06-01 12:00:00", "ActualFileSize": 8,
//!   "ServerTime": "2024-06-01 12:00:01" }
//! { "IsResult": false, "ErrorMsg": "not a valid PDF document" }
//! ```
//!
//! Optional fields are omitted (not `null`) when absent.
use serde::{Deserialize, Serialize};

use crate::outcome::ValidationOutcome;

/// `chrono` format string for `ServerTime` (`yyyy-MM-dd HH:mm:ss`).
pub const SERVER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// In-band response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeResponse {
    #[serde(rename = "IsResult")]
    pub is_result: bool,

    /// Empty on success, human-readable reason on failure.
    #[serde(rename = "ErrorMsg")]
    pub error_msg: String,

    #[serde(
        rename = "ReceivedFileSize",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub received_file_size: Option<String>,

    #[serde(
        rename = "ReceivedUploadTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub received_upload_time: Option<String>,

    #[serde(
        rename = "ActualFileSize",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_file_size: Option<u64>,

    #[serde(rename = "ServerTime", default, skip_serializing_if = "Option::is_none")]
    pub server_time: Option<String>,
}

impl IntakeResponse {
    /// Bare success: `{ "IsResult": true, "ErrorMsg": "" }`.
    pub fn acknowledged() -> Self {
        Self {
            is_result: true,
            error_msg: String::new(),
            received_file_size: None,
            received_upload_time: None,
            actual_file_size: None,
            server_time: None,
        }
    }

    /// Failure carrying `message` in `ErrorMsg`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_result: false,
            error_msg: message.into(),
            ..Self::acknowledged()
        }
    }
}

/// Builds the wire response for an outcome.
///
/// ```rust
/// use ingest::{report, IngestError, ValidationOutcome};
///
/// let response = report(ValidationOutcome::Rejected(IngestError::NoFileReceived));
/// assert!(!response.is_result);
/// assert_eq!(response.error_msg, "no file received");
/// assert!(response.actual_file_size.is_none());
/// ```
pub fn report(outcome: ValidationOutcome) -> IntakeResponse {
    match outcome {
        ValidationOutcome::Accepted(acceptance) => IntakeResponse {
            is_result: true,
            error_msg: String::new(),
            received_file_size: acceptance.echoed_declared_size,
            received_upload_time: acceptance.echoed_declared_time,
            actual_file_size: Some(acceptance.actual_byte_length),
            server_time: Some(
                acceptance
                    .server_timestamp
                    .format(SERVER_TIME_FORMAT)
                    .to_string(),
            ),
        },
        ValidationOutcome::Rejected(err) => IntakeResponse::failure(err.to_string()),
    }
}

impl From<ValidationOutcome> for IntakeResponse {
    fn from(outcome: ValidationOutcome) -> Self {
        report(outcome)
    }
}
