use std::fmt::{
    self,
    Write,
};

use chrono::{
    DateTime,
    SecondsFormat,
    Utc,
};
use kr_core::lifecycle::{
    NodeSnapshot,
    PodSnapshot,
};
use kr_core::prelude::*;

use crate::replay;

const NOT_AVAILABLE: &str = "N/A";

pub async fn cmd(args: &replay::Args) -> EmptyResult {
    match replay::snapshot(args, QueryIntent::Describe).await? {
        (_, Some(snapshot)) => print!("{}", render(&snapshot)?),
        (identity, None) => println!("{}", replay::no_events(&identity)),
    }
    Ok(())
}

pub fn render(snapshot: &Snapshot) -> anyhow::Result<String> {
    let mut out = String::new();
    match snapshot {
        Snapshot::Pod(pod) => render_pod(&mut out, pod)?,
        Snapshot::Node(node) => render_node(&mut out, node)?,
    }
    Ok(out)
}

fn header(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

fn field(out: &mut String, name: &str, value: Option<&str>) -> fmt::Result {
    writeln!(out, "{name}: {}", value.unwrap_or(NOT_AVAILABLE))
}

fn time_field(out: &mut String, name: &str, ts: Option<DateTime<Utc>>) -> fmt::Result {
    field(out, name, ts.map(format_ts).as_deref())
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn render_pod(out: &mut String, pod: &PodSnapshot) -> fmt::Result {
    header(out, &pod.identity.to_string())?;
    field(out, "NodeName", pod.node_name.as_deref())?;
    field(out, "Phase", pod.phase.as_deref())?;
    writeln!(out)?;

    time_field(out, "CreationTime", pod.creation_time)?;
    time_field(out, "LastUpdatedTime", pod.last_updated_time)?;
    time_field(out, "BindTime", pod.bind_time)?;
    time_field(out, "EvictionTime", pod.eviction_time)?;
    time_field(out, "StatusChangedTime", pod.status_changed_time)?;
    time_field(out, "DeletionTime", pod.deletion_time)?;
    writeln!(out)?;

    header(out, "Nominations")?;
    if pod.nominations.is_empty() {
        writeln!(out, "<none>")?;
    }
    for nomination in &pod.nominations {
        let node = nomination.node_name.as_deref().unwrap_or(NOT_AVAILABLE);
        writeln!(out, "{}  {node}", format_ts(nomination.ts))?;
    }
    Ok(())
}

// The describe query for nodes skips update records, so there is no last-updated time to show.
fn render_node(out: &mut String, node: &NodeSnapshot) -> fmt::Result {
    header(out, &node.identity.to_string())?;
    time_field(out, "CreationTime", node.creation_time)?;
    time_field(out, "DeletionTime", node.deletion_time)
}
