use chrono::Local;
use kr_core::lifecycle::{
    self,
    Replay,
};
use kr_core::prelude::*;
use kr_provider::AuditQuery;
use tracing::{
    info,
    instrument,
};

use crate::source::{
    CloudWatchArgs,
    SourceArgs,
    WindowArgs,
};

#[derive(clap::Args)]
pub struct Args {
    #[arg(long_help = "object type (pod, node)")]
    pub kind: String,

    #[arg(long_help = "object name")]
    pub name: String,

    #[arg(short, long, default_value = "default", long_help = "object namespace; ignored for nodes")]
    pub namespace: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub cloudwatch: CloudWatchArgs,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Fetch the records for the requested object and coalesce them.  `None` means no record in the
/// window belonged to the object.
#[instrument(skip_all, fields(intent = %intent, kind = %args.kind, name = %args.name))]
pub async fn snapshot(args: &Args, intent: QueryIntent) -> anyhow::Result<(Identity, Option<Snapshot>)> {
    let dispatcher = Dispatcher::default();
    let handler = dispatcher.registry().for_kind_arg(&args.kind)?;
    let identity = handler.identity(&args.namespace, &args.name);

    let request = AuditQuery {
        identity: identity.clone(),
        window: args.window.resolve(Local::now())?,
        query: handler.query(intent, &identity),
    };
    let provider = args.source.provider(&args.cloudwatch).await?;

    let records = tokio::select! {
        res = provider.get_events(&request) => res?,
        _ = tokio::signal::ctrl_c() => bail!("interrupted while fetching audit records"),
    };
    info!(records = records.len(), "fetched audit records");

    let Replay { snapshot, .. } = lifecycle::replay(&dispatcher, handler, &identity, &records);
    Ok((identity, snapshot))
}

pub fn no_events(identity: &Identity) -> String {
    format!("No events found for: {identity}")
}
