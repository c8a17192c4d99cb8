//! Configuration types for the intake pipeline.
//!
//! [`IntakeConfig`] is small, cheap to clone, and deserializable from any
//! serde format so the server can embed it in its own configuration file.
//!
//! ```rust
//! use ingest::{IntakeConfig, SizePolicy};
//!
//! let config = IntakeConfig {
//!     size_policy: SizePolicy::Strict,
//!     ..Default::default()
//! };
//! config.validate().expect("valid configuration");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a declared size that disagrees with the received byte count is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// Report the mismatch to the observer and accept the document.
    #[default]
    Advisory,
    /// Reject the document with [`IngestError::SizeMismatch`](crate::IngestError::SizeMismatch).
    Strict,
}

/// Runtime configuration for the intake pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Policy applied to declared-size mismatches on both adapters.
    pub size_policy: SizePolicy,

    /// Whether the permissive JSON endpoint logs the raw body it received.
    pub log_raw_json: bool,

    /// Upper bound on how much of a raw JSON body is logged, in bytes.
    pub max_logged_body_bytes: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            size_policy: SizePolicy::Advisory,
            log_raw_json: true,
            max_logged_body_bytes: 4096,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Raw JSON logging is enabled with a zero byte budget.
    #[error("log_raw_json is enabled but max_logged_body_bytes is 0")]
    EmptyLogBudget,
}

impl IntakeConfig {
    /// Checks internal consistency. Call once at start-up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_raw_json && self.max_logged_body_bytes == 0 {
            return Err(ConfigError::EmptyLogBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = IntakeConfig::default();
        assert_eq!(cfg.size_policy, SizePolicy::Advisory);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_log_budget_rejected() {
        let cfg = IntakeConfig {
            max_logged_body_bytes: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyLogBudget));

        let cfg = IntakeConfig {
            log_raw_json: false,
            max_logged_body_bytes: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let cfg: IntakeConfig = serde_json::from_str(r#"{"size_policy": "strict"}"#).unwrap();
        assert_eq!(cfg.size_policy, SizePolicy::Strict);
        assert_eq!(cfg.max_logged_body_bytes, 4096);
    }
}
