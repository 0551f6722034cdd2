use chrono::{
    DateTime,
    Utc,
};
use k8s_openapi::api::core::v1 as corev1;
use serde::Serialize;
use tracing::debug;

use super::*;

/// Node lifecycle transitions; nodes have no binding, eviction, or status-phase concept.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum NodeEvent {
    Created,
    Updated,
    Deleted,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub identity: Identity,
    pub node: Option<corev1::Node>,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_updated_time: Option<DateTime<Utc>>,
    pub deletion_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NodeLifecycle;

impl NodeLifecycle {
    fn event_from_body(record: &AuditEvent, kind: NodeEvent) -> Result<LifecycleEvent, ClassifyError> {
        let node: corev1::Node = decode_body(record, ObjectKind::Node)?;

        let mut identity = Identity::cluster_scoped(node.metadata.name.as_deref().unwrap_or_default());
        if identity.is_empty() {
            identity = Identity::cluster_scoped(record.name());
        }

        Ok(LifecycleEvent {
            ts: record.received_at(),
            audit_id: record.audit_id.clone(),
            identity,
            kind: EventKind::Node(kind),
            object: Some(TrackedObject::Node(Box::new(node))),
            attributes: BTreeMap::new(),
        })
    }
}

impl ObjectLifecycle for NodeLifecycle {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Node
    }

    // CSI/CNI sidecars write to node subresources constantly; that traffic is excluded by the
    // backend query rather than here.
    fn classify(&self, record: &AuditEvent) -> Result<Option<LifecycleEvent>, ClassifyError> {
        let event = match record.verb.as_str() {
            "create" => Self::event_from_body(record, NodeEvent::Created)?,
            "update" => Self::event_from_body(record, NodeEvent::Updated)?,
            "delete" => LifecycleEvent::from_ref(record, EventKind::Node(NodeEvent::Deleted)),
            _ => return Ok(None),
        };

        if event.identity.is_empty() {
            debug!(audit_id = %record.audit_id, "node event has no identity, dropping");
            return Ok(None);
        }
        Ok(Some(event))
    }

    fn coalesce(&self, identity: &Identity, events: &[LifecycleEvent]) -> Snapshot {
        let selected = select_events(events, identity, |kind| match kind {
            EventKind::Node(k) => Some(k),
            EventKind::Pod(_) => None,
        });

        let node = latest(events_of(&selected, &[NodeEvent::Created, NodeEvent::Updated]).filter(|e| e.object.is_some()))
            .and_then(|e| match &e.object {
                Some(TrackedObject::Node(node)) => Some(node.as_ref().clone()),
                _ => None,
            });

        Snapshot::Node(NodeSnapshot {
            identity: identity.clone(),
            node,
            creation_time: latest_ts(&selected, NodeEvent::Created),
            last_updated_time: latest_ts(&selected, NodeEvent::Updated),
            deletion_time: latest_ts(&selected, NodeEvent::Deleted),
        })
    }

    fn get_query(&self, identity: &Identity) -> String {
        node_query(identity, &["create", "update", "delete"])
    }

    // Nodes are updated every few seconds by the kubelet and controllers; the timeline only needs
    // the create and delete records.
    fn describe_query(&self, identity: &Identity) -> String {
        node_query(identity, &["create", "delete"])
    }
}

fn node_query(identity: &Identity, verbs: &[&str]) -> String {
    InsightsQuery::audit(ObjectKind::Node.resource())
        .verbs(verbs)
        .uri_excludes("csi")
        .uri_excludes("cni")
        .mentions(&identity.name)
        .build()
}
