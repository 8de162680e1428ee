use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum GrayReleaseError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to request gray rule: {0}")]
    RuleRequest(#[from] reqwest::Error),
    #[error("gray rule transport failed: {0}")]
    RuleTransport(String),
    #[error("gray rule endpoint answered with status {0}")]
    UnexpectedStatus(u16),
    #[error("failed to parse gray rule: {0}")]
    RuleParsing(#[from] serde_json::Error),
    #[error("failed to load canary pages from {path}: {reason}")]
    CanaryPages { path: String, reason: String },
    #[error("navigation failed: {0}")]
    Navigation(anyhow::Error),
}

impl GrayReleaseError {
    /// Returns a short error code for logs and metrics labels.
    pub fn error_code(&self) -> &'static str {
        match self {
            GrayReleaseError::Storage(_) => "storage_error",
            GrayReleaseError::RuleRequest(e) if e.is_timeout() => "rule_request_timeout",
            GrayReleaseError::RuleRequest(_) => "rule_request_error",
            GrayReleaseError::RuleTransport(_) => "rule_transport_error",
            GrayReleaseError::UnexpectedStatus(_) => "unexpected_status",
            GrayReleaseError::RuleParsing(_) => "rule_parsing_error",
            GrayReleaseError::CanaryPages { .. } => "canary_pages_error",
            GrayReleaseError::Navigation(_) => "navigation_error",
        }
    }
}
