use std::path::PathBuf;
use std::time::Duration;

use chrono::{
    DateTime,
    Local,
    Utc,
};
use kr_core::prelude::*;
use kr_provider::{
    AuditProvider,
    AwsLogsClient,
    CloudWatchProvider,
    FileProvider,
    PollConfig,
    TimeWindow,
};

/// Where audit records come from; exactly one must be given.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    #[arg(short = 'f', long, long_help = "path to an audit log file (one JSON record per line)")]
    pub audit_log: Option<PathBuf>,

    #[arg(short = 'g', long, long_help = "CloudWatch log group receiving the cluster's audit logs")]
    pub log_group: Option<String>,
}

#[derive(clap::Args)]
pub struct CloudWatchArgs {
    #[arg(short, long, long_help = "AWS region of the log group; defaults to the AWS config chain")]
    pub region: Option<String>,

    #[arg(long, value_name = "MILLIS", default_value_t = 500, long_help = "delay between log query status checks")]
    pub poll_interval: u64,

    #[arg(long, value_name = "SECONDS", default_value_t = 300, long_help = "give up on a log query after this long")]
    pub query_timeout: u64,
}

impl CloudWatchArgs {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval),
            timeout: Duration::from_secs(self.query_timeout),
        }
    }
}

impl SourceArgs {
    pub async fn provider(&self, cloudwatch: &CloudWatchArgs) -> anyhow::Result<Box<dyn AuditProvider>> {
        match (&self.audit_log, &self.log_group) {
            (Some(path), _) => Ok(Box::new(FileProvider::new(path)?)),
            (None, Some(log_group)) => {
                let client = AwsLogsClient::new(log_group, cloudwatch.region.as_deref()).await;
                Ok(Box::new(CloudWatchProvider::new(client, cloudwatch.poll_config())))
            },
            (None, None) => bail!("one of --audit-log or --log-group is required"),
        }
    }
}

#[derive(clap::Args)]
pub struct WindowArgs {
    #[arg(long, long_help = "ignore records before this time (RFC 3339, or relative like \"2 hours ago\")")]
    pub start: Option<String>,

    #[arg(long, long_help = "ignore records after this time (RFC 3339, or relative like \"30 minutes ago\")")]
    pub end: Option<String>,

    #[arg(long, long_help = "reconstruct the object as it was at this time; takes precedence over --end")]
    pub at: Option<String>,
}

impl WindowArgs {
    pub fn resolve(&self, now: DateTime<Local>) -> anyhow::Result<TimeWindow> {
        let start = self.start.as_deref().map(|arg| parse_time(now, arg)).transpose()?;
        let end = self.at.as_deref().or(self.end.as_deref()).map(|arg| parse_time(now, arg)).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            ensure!(start <= end, "start time {start} is after end time {end}");
        }
        Ok(TimeWindow::new(start, end))
    }
}

pub fn parse_time(now: DateTime<Local>, arg: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(arg) {
        return Ok(ts.with_timezone(&Utc));
    }

    parse_datetime_fork::parse_datetime_at_date(now, arg)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| anyhow!("could not parse time {arg:?}: {err}"))
}
