//! The result of running one upload through the pipeline.
use chrono::{DateTime, Local};

use crate::error::IngestError;
use crate::types::IngestSource;

/// Details of an accepted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    pub source: IngestSource,
    /// Base filename or identifier-derived name of the document.
    pub name: String,
    /// Bytes actually received (after Base64 decoding on the JSON path).
    pub actual_byte_length: u64,
    /// Server clock at acceptance time.
    pub server_timestamp: DateTime<Local>,
    pub echoed_declared_size: Option<String>,
    pub echoed_declared_time: Option<String>,
    /// Set when the declared size parsed but disagreed with `actual_byte_length`.
    pub size_mismatch: bool,
    /// Location returned by the document store, when one is configured.
    pub stored_at: Option<String>,
}

/// Accepted or rejected, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted(Acceptance),
    Rejected(IngestError),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }

    /// The rejection reason, if this outcome is a rejection.
    pub fn rejection(&self) -> Option<&IngestError> {
        match self {
            ValidationOutcome::Rejected(err) => Some(err),
            ValidationOutcome::Accepted(_) => None,
        }
    }

    pub fn acceptance(&self) -> Option<&Acceptance> {
        match self {
            ValidationOutcome::Accepted(acceptance) => Some(acceptance),
            ValidationOutcome::Rejected(_) => None,
        }
    }
}

impl From<IngestError> for ValidationOutcome {
    fn from(err: IngestError) -> Self {
        ValidationOutcome::Rejected(err)
    }
}
