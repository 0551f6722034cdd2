//! Classification of raw audit records into typed lifecycle events, and coalescing of those events
//! into a point-in-time snapshot of one object.
//!
//! The pipeline is split into two phases with very different concurrency properties:
//!
//! 1. Extraction ([`Dispatcher::extract`]) is a pure function of each record, so it runs as a
//!    parallel map whose results are collected into an immutable `Vec` before anything else
//!    looks at them.
//! 2. Coalescing ([`ObjectLifecycle::coalesce`]) is a sequential reduction over that `Vec`.  Each
//!    snapshot field is the latest event of its kind, chosen by `(timestamp, auditID)`, so the
//!    result does not depend on the order in which the source delivered the records.
mod dispatch;
mod node;
mod pod;
mod query;
mod registry;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
pub use dispatch::{
    Dispatched,
    Dispatcher,
    Extraction,
    ExtractionStats,
};
use k8s_openapi::api::core::v1 as corev1;
use kube::Resource;
pub use node::{
    NodeEvent,
    NodeLifecycle,
    NodeSnapshot,
};
pub use pod::{
    Nomination,
    PodEvent,
    PodLifecycle,
    PodSnapshot,
};
pub use query::{
    InsightsQuery,
    QueryIntent,
    MAX_QUERY_ROWS,
};
pub use registry::{
    KindError,
    KindRegistry,
};
use serde::de::DeserializeOwned;
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;
use tracing::{
    info,
    instrument,
};

use crate::audit::AuditEvent;
use crate::k8s::{
    sanitize_obj,
    Identity,
};

pub const NODE_NAME_ATTR: &str = "nodeName";
pub const PHASE_ATTR: &str = "phase";
pub const NOMINATION_ATTR: &str = "nomination";
pub const NOMINATED_NODE_ATTR: &str = "nominatedNode";

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Pod,
    Node,
}

impl ObjectKind {
    /// The `objectRef.resource` string the API server records for this kind.
    pub fn resource(self) -> &'static str {
        match self {
            ObjectKind::Pod => "pods",
            ObjectKind::Node => "nodes",
        }
    }

    /// Names accepted on the command line, kubectl-style.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            ObjectKind::Pod => &["pod", "pods", "po"],
            ObjectKind::Node => &["node", "nodes", "no"],
        }
    }

    pub fn is_namespaced(self) -> bool {
        match self {
            ObjectKind::Pod => true,
            ObjectKind::Node => false,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Pod => write!(f, "Pod"),
            ObjectKind::Node => write!(f, "Node"),
        }
    }
}

/// The event-kind tag; each object kind has its own, non-overlapping enumeration.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Pod(PodEvent),
    Node(NodeEvent),
}

impl EventKind {
    pub fn object_kind(self) -> ObjectKind {
        match self {
            EventKind::Pod(_) => ObjectKind::Pod,
            EventKind::Node(_) => ObjectKind::Node,
        }
    }
}

/// A decoded, sanitized object body carried by `Created`/`Updated` events.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrackedObject {
    Pod(Box<corev1::Pod>),
    Node(Box<corev1::Node>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleEvent {
    pub ts: DateTime<Utc>,
    pub audit_id: String,
    pub identity: Identity,
    pub kind: EventKind,
    pub object: Option<TrackedObject>,
    pub attributes: BTreeMap<String, String>,
}

impl LifecycleEvent {
    /// An event with no body; identity comes from the record's `objectRef`.
    pub(crate) fn from_ref(record: &AuditEvent, kind: EventKind) -> Self {
        let identity = if kind.object_kind().is_namespaced() {
            Identity::namespaced(record.namespace(), record.name())
        } else {
            Identity::cluster_scoped(record.name())
        };

        LifecycleEvent {
            ts: record.received_at(),
            audit_id: record.audit_id.clone(),
            identity,
            kind,
            object: None,
            attributes: BTreeMap::new(),
        }
    }

    pub(crate) fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Total order used to pick the "latest" event of a kind.  Equal timestamps fall back to the
    /// audit ID so that the winner never depends on delivery order.
    pub fn ordering_key(&self) -> (DateTime<Utc>, &str) {
        (self.ts, self.audit_id.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("record is missing required field {0}")]
    MissingField(&'static str),

    #[error("could not decode {kind} body: {reason}")]
    MalformedBody { kind: ObjectKind, reason: String },
}

/// The coalesced state of one object.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    Pod(PodSnapshot),
    Node(NodeSnapshot),
}

impl Snapshot {
    pub fn identity(&self) -> &Identity {
        match self {
            Snapshot::Pod(p) => &p.identity,
            Snapshot::Node(n) => &n.identity,
        }
    }

    /// The most recent recorded object body, serialized as a generic JSON value.
    pub fn object(&self) -> Option<serde_json::Value> {
        let value = match self {
            Snapshot::Pod(p) => p.pod.as_ref().map(serde_json::to_value),
            Snapshot::Node(n) => n.node.as_ref().map(serde_json::to_value),
        };
        value.and_then(Result::ok)
    }
}

/// The capability set each tracked object kind provides: classification of raw records,
/// coalescing of classified events, and the backend query descriptors used to narrow a scan to
/// one identity.
pub trait ObjectLifecycle: Send + Sync {
    fn kind(&self) -> ObjectKind;

    /// Convert one record into at most one lifecycle event.  `Ok(None)` means the record is not a
    /// lifecycle transition for this kind; an error means it should have been one but could not be
    /// decoded.
    fn classify(&self, record: &AuditEvent) -> Result<Option<LifecycleEvent>, ClassifyError>;

    /// Fold events into a snapshot for `identity`.  Events for other identities or kinds are
    /// ignored.  Must be independent of the order of `events`.
    fn coalesce(&self, identity: &Identity, events: &[LifecycleEvent]) -> Snapshot;

    fn get_query(&self, identity: &Identity) -> String;

    fn describe_query(&self, identity: &Identity) -> String;

    fn query(&self, intent: QueryIntent, identity: &Identity) -> String {
        match intent {
            QueryIntent::Get => self.get_query(identity),
            QueryIntent::Describe => self.describe_query(identity),
        }
    }

    /// Build the identity a user asked for; the namespace is dropped for cluster-scoped kinds.
    fn identity(&self, namespace: &str, name: &str) -> Identity {
        if self.kind().is_namespaced() {
            Identity::namespaced(namespace, name)
        } else {
            Identity::cluster_scoped(name)
        }
    }
}

/// The outcome of replaying a batch of records for one identity.
#[derive(Debug)]
pub struct Replay {
    /// `None` when no event in the batch belonged to the requested identity.
    pub snapshot: Option<Snapshot>,
    pub matched: usize,
    pub stats: ExtractionStats,
}

/// Classify `records`, keep the events belonging to `identity`, and coalesce them.
#[instrument(skip_all, fields(kind = %lifecycle.kind(), identity = %identity, records = records.len()))]
pub fn replay(
    dispatcher: &Dispatcher,
    lifecycle: &dyn ObjectLifecycle,
    identity: &Identity,
    records: &[AuditEvent],
) -> Replay {
    let Extraction { events, stats } = dispatcher.extract(records);
    let matched: Vec<LifecycleEvent> = events
        .into_iter()
        .filter(|e| e.kind.object_kind() == lifecycle.kind() && e.identity == *identity)
        .collect();

    info!(matched = matched.len(), "coalescing lifecycle events");
    let snapshot = (!matched.is_empty()).then(|| lifecycle.coalesce(identity, &matched));
    Replay { snapshot, matched: matched.len(), stats }
}

/// The latest event (by [`LifecycleEvent::ordering_key`]) among `events`.
pub(crate) fn latest<'a, I>(events: I) -> Option<&'a LifecycleEvent>
where
    I: IntoIterator<Item = &'a LifecycleEvent>,
{
    events.into_iter().max_by(|a, b| a.ordering_key().cmp(&b.ordering_key()))
}

/// The events for `identity` whose kind tag `select` maps into this object kind's enumeration.
pub(crate) fn select_events<'a, K>(
    events: &'a [LifecycleEvent],
    identity: &Identity,
    select: impl Fn(EventKind) -> Option<K>,
) -> Vec<(K, &'a LifecycleEvent)> {
    events
        .iter()
        .filter(|e| e.identity == *identity)
        .filter_map(|e| select(e.kind).map(|k| (k, e)))
        .collect()
}

pub(crate) fn events_of<'a, K: PartialEq + 'a>(
    selected: &'a [(K, &'a LifecycleEvent)],
    kinds: &'a [K],
) -> impl Iterator<Item = &'a LifecycleEvent> + 'a {
    selected.iter().filter(move |(k, _)| kinds.contains(k)).map(|(_, e)| *e)
}

pub(crate) fn latest_ts<K: PartialEq>(selected: &[(K, &LifecycleEvent)], kind: K) -> Option<DateTime<Utc>> {
    latest(events_of(selected, &[kind])).map(|e| e.ts)
}

/// Decode the record's `responseObject` into `K` and strip bookkeeping fields.
pub(crate) fn decode_body<K>(record: &AuditEvent, kind: ObjectKind) -> Result<K, ClassifyError>
where
    K: Resource + DeserializeOwned,
{
    let body = record.response_object.as_ref().ok_or(ClassifyError::MissingField("responseObject"))?;
    let mut obj = K::deserialize(body).map_err(|err| ClassifyError::MalformedBody { kind, reason: err.to_string() })?;
    sanitize_obj(&mut obj);
    Ok(obj)
}

/// Look up a string at a JSON pointer inside the record's `requestObject`.
pub(crate) fn request_str<'a>(record: &'a AuditEvent, pointer: &str) -> Option<&'a str> {
    record
        .request_object
        .as_ref()
        .and_then(|obj| obj.pointer(pointer))
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests;
