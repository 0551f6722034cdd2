//! Sources of raw audit records.  Every provider answers the same question, "which audit records
//! might describe this object in this time window", and leaves classification to `kr-core`.
mod cloudwatch;
mod file;
mod window;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
pub use cloudwatch::{
    AwsLogsClient,
    CloudWatchProvider,
    LogQueryClient,
    PollConfig,
    QueryState,
};
pub use file::FileProvider;
use kr_core::prelude::*;
pub use window::TimeWindow;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("audit log file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("log query {query_id} did not complete within {timeout:?}")]
    QueryTimeout { query_id: String, timeout: Duration },

    #[error("log query {query_id} finished with status {status}")]
    QueryFailed { query_id: String, status: String },

    #[error("log backend did not return a query ID")]
    MissingQueryId,
}

/// Everything a provider needs to narrow its scan to one object.
#[derive(Clone, Debug)]
pub struct AuditQuery {
    pub identity: Identity,
    pub window: TimeWindow,

    /// Backend filter expression from [`ObjectLifecycle::query`]; providers that can't push down
    /// filters ignore it.
    pub query: String,
}

#[async_trait]
pub trait AuditProvider: Send + Sync {
    async fn get_events(&self, request: &AuditQuery) -> anyhow::Result<Vec<AuditEvent>>;
}

#[cfg(test)]
mod tests;
