//! Durable storage for evaluation records.
//!
//! Sinks are invoked off the response path; see
//! [`EvaluationService::persist`](super::service::EvaluationService::persist).

mod directory;
mod http;

pub use directory::DirectoryResultSink;
pub use http::HttpResultSink;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::domain::EvaluationRecord;

/// Storage abstraction so the orchestrator can be exercised without real storage.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Stores the record, returning the key it was written under.
    async fn store(&self, record: &EvaluationRecord) -> Result<String, ResultSinkError>;
}

/// Error enumeration for sink failures. Never surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ResultSinkError {
    #[error("result sink io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to encode evaluation record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("result sink unavailable: {0}")]
    Backend(String),
    #[error("result sink timed out after {0:?}")]
    Timeout(Duration),
}

/// Sink used when persistence is switched off; records are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledResultSink;

#[async_trait]
impl ResultSink for DisabledResultSink {
    async fn store(&self, record: &EvaluationRecord) -> Result<String, ResultSinkError> {
        let key = record.storage_key();
        debug!(%key, "result persistence disabled; dropping record");
        Ok(key)
    }
}
