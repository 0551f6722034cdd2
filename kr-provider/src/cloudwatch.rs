use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{
    BehaviorVersion,
    Region,
};
use aws_sdk_cloudwatchlogs::types::{
    QueryStatus,
    ResultField,
};
use chrono::{
    DateTime,
    Utc,
};
use kr_core::lifecycle::MAX_QUERY_ROWS;
use kr_core::prelude::*;
use tokio::time::{
    sleep,
    Instant,
};
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use crate::{
    AuditProvider,
    AuditQuery,
    ProviderError,
};

const MESSAGE_FIELD: &str = "@message";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Bounds for waiting on an asynchronous log query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig { interval: DEFAULT_POLL_INTERVAL, timeout: DEFAULT_QUERY_TIMEOUT }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryState {
    Running,
    /// The raw `@message` value of every result row.
    Complete(Vec<String>),
    /// Any terminal status other than success.
    Failed(String),
}

/// The two calls of an asynchronous Logs Insights query.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogQueryClient: Send + Sync {
    async fn start_query(&self, query: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> anyhow::Result<String>;
    async fn query_results(&self, query_id: &str) -> anyhow::Result<QueryState>;
}

/// A [`LogQueryClient`] backed by the AWS SDK, scoped to one log group.
pub struct AwsLogsClient {
    client: aws_sdk_cloudwatchlogs::Client,
    log_group: String,
}

impl AwsLogsClient {
    /// Credentials and the default region come from the standard AWS configuration chain.
    pub async fn new(log_group: &str, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;

        AwsLogsClient {
            client: aws_sdk_cloudwatchlogs::Client::new(&config),
            log_group: log_group.into(),
        }
    }
}

#[async_trait]
impl LogQueryClient for AwsLogsClient {
    async fn start_query(&self, query: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> anyhow::Result<String> {
        let output = self
            .client
            .start_query()
            .log_group_identifiers(&self.log_group)
            .query_string(query)
            .start_time(start.timestamp())
            .end_time(end.timestamp() + i64::from(end.timestamp_subsec_nanos() > 0))
            .send()
            .await
            .with_context(|| format!("could not start log query against {}", self.log_group))?;

        match output.query_id() {
            Some(id) => Ok(id.into()),
            None => bail!(ProviderError::MissingQueryId),
        }
    }

    async fn query_results(&self, query_id: &str) -> anyhow::Result<QueryState> {
        let output = self
            .client
            .get_query_results()
            .query_id(query_id)
            .send()
            .await
            .with_context(|| format!("could not fetch results for log query {query_id}"))?;

        Ok(match output.status() {
            Some(QueryStatus::Complete) => QueryState::Complete(messages(output.results())),
            Some(status @ (QueryStatus::Failed | QueryStatus::Cancelled | QueryStatus::Timeout)) => {
                QueryState::Failed(status.as_str().into())
            },
            _ => QueryState::Running,
        })
    }
}

fn messages(rows: &[Vec<ResultField>]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.iter().find(|f| f.field() == Some(MESSAGE_FIELD)))
        .filter_map(|f| f.value().map(String::from))
        .collect()
}

/// Fetches audit records from a CloudWatch Logs Insights query, polling until the query finishes
/// or the configured timeout elapses.
pub struct CloudWatchProvider<C> {
    client: C,
    poll: PollConfig,
}

impl<C: LogQueryClient> CloudWatchProvider<C> {
    pub fn new(client: C, poll: PollConfig) -> Self {
        CloudWatchProvider { client, poll }
    }

    #[instrument(skip_all, fields(start = %start, end = %end))]
    async fn run_query(&self, query: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
        let query_id = self.client.start_query(query, start, end).await?;
        info!(%query_id, "started log query");

        let deadline = Instant::now() + self.poll.timeout;
        loop {
            match self.client.query_results(&query_id).await? {
                QueryState::Complete(rows) => {
                    info!(%query_id, rows = rows.len(), "log query complete");
                    if rows.len() >= MAX_QUERY_ROWS {
                        warn!(%query_id, limit = MAX_QUERY_ROWS, "log query hit the row limit; older records were dropped");
                    }
                    return Ok(rows);
                },
                QueryState::Failed(status) => bail!(ProviderError::QueryFailed { query_id, status }),
                QueryState::Running => (),
            }

            if Instant::now() >= deadline {
                bail!(ProviderError::QueryTimeout { query_id, timeout: self.poll.timeout });
            }
            debug!(%query_id, "log query still running");
            sleep(self.poll.interval).await;
        }
    }
}

#[async_trait]
impl<C: LogQueryClient> AuditProvider for CloudWatchProvider<C> {
    #[instrument(skip_all, fields(identity = %request.identity))]
    async fn get_events(&self, request: &AuditQuery) -> anyhow::Result<Vec<AuditEvent>> {
        let (start, end) = request.window.bounded(Utc::now());
        let rows = self.run_query(&request.query, start, end).await?;

        // The backend only sees whole seconds, so the exact window is applied again here.
        let (mut skipped, mut outside) = (0usize, 0usize);
        let mut records = vec![];
        for message in &rows {
            match serde_json::from_str::<AuditEvent>(message) {
                Ok(record) if request.window.contains(record.received_at()) => records.push(record),
                Ok(_) => outside += 1,
                Err(err) => {
                    debug!("could not decode audit record: {err}");
                    skipped += 1;
                },
            }
        }

        if skipped > 0 {
            warn!(skipped, "skipped undecodable query results");
        }
        debug!(outside_window = outside, "dropped query results outside the window");
        Ok(records)
    }
}
