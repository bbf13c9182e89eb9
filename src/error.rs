//! error.rs — Error taxonomy for the scoring pipeline.
//!
//! Three failure classes with distinct propagation policies:
//! - `Validation`: malformed request input, rejected before computation.
//! - `MissingData`: no impact factor and no category fallback; recovered
//!   per-item inside the aggregator, surfaced only when the whole request
//!   cannot proceed (e.g. unknown dataset version).
//! - `Configuration`: invalid weights/thresholds, fatal at load time and
//!   never produced per-request.
//!
//! A duplicate provenance write is deliberately *not* an error: the recorder
//! resolves it by returning the existing record.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EcoError {
    /// Malformed input (negative mass, fraction sum > 1, empty required field).
    #[error("validation: {0}")]
    Validation(String),

    /// No exact factor and no category fallback for the named entry.
    #[error("missing data: '{what}' not found (dataset '{dataset_version}')")]
    MissingData {
        what: String,
        dataset_version: String,
    },

    /// Invalid weights or threshold table. Blocks startup/refresh.
    #[error("configuration: {0}")]
    Configuration(String),
}

impl EcoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing(what: impl Into<String>, dataset_version: impl Into<String>) -> Self {
        Self::MissingData {
            what: what.into(),
            dataset_version: dataset_version.into(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
