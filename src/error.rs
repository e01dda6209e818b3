//! Error types shared by the engine, the job manager and the API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A request was rejected before any work was scheduled.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rule {rule_id} has an invalid pattern: {source}")]
    InvalidPattern {
        rule_id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Contract source is {size} bytes, which exceeds the {limit} byte limit")]
    SourceTooLarge { size: usize, limit: usize },

    #[error("Analysis job not found")]
    JobNotFound(String),

    #[error("Analysis result not found")]
    ResultNotFound(u64),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
