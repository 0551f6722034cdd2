use chrono::{
    DateTime,
    Utc,
};
use k8s_openapi::api::core::v1 as corev1;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::*;

// Best-effort marker for requests issued by an external node provisioner on behalf of the
// scheduler.  This is substring matching on free-text fields, so it can both miss nominations and
// tag unrelated updates.
lazy_static! {
    static ref NOMINATION_MARKER: Regex = Regex::new("karpenter").unwrap();
}

const BINDING_TARGET_PATH: &str = "/target/name";
const SPEC_NODE_NAME_PATH: &str = "/spec/nodeName";
const STATUS_PHASE_PATH: &str = "/status/phase";

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PodEvent {
    Created,
    Updated,
    Bound,
    Evicted,
    StatusChanged,
    Deleted,
}

/// A scheduler-extension nomination observed on an `Updated` event.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Nomination {
    pub ts: DateTime<Utc>,
    pub node_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSnapshot {
    pub identity: Identity,
    pub pod: Option<corev1::Pod>,
    pub node_name: Option<String>,
    pub phase: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_updated_time: Option<DateTime<Utc>>,
    pub bind_time: Option<DateTime<Utc>>,
    pub eviction_time: Option<DateTime<Utc>>,
    pub status_changed_time: Option<DateTime<Utc>>,
    pub deletion_time: Option<DateTime<Utc>>,
    pub nominations: Vec<Nomination>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PodLifecycle;

impl PodLifecycle {
    fn event_from_body(record: &AuditEvent, kind: PodEvent) -> Result<LifecycleEvent, ClassifyError> {
        let pod: corev1::Pod = decode_body(record, ObjectKind::Pod)?;

        // The body is authoritative, but fall back to the request path for the namespace in case
        // the server omitted it.
        let mut identity = Identity::from_obj(&pod);
        if identity.namespace.is_none() && !record.namespace().is_empty() {
            identity.namespace = Some(record.namespace().into());
        }

        Ok(LifecycleEvent {
            ts: record.received_at(),
            audit_id: record.audit_id.clone(),
            identity,
            kind: EventKind::Pod(kind),
            object: Some(TrackedObject::Pod(Box::new(pod))),
            attributes: BTreeMap::new(),
        })
    }

    fn is_nomination(record: &AuditEvent) -> bool {
        NOMINATION_MARKER.is_match(&record.user.username) || NOMINATION_MARKER.is_match(&record.request_uri)
    }
}

impl ObjectLifecycle for PodLifecycle {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Pod
    }

    fn classify(&self, record: &AuditEvent) -> Result<Option<LifecycleEvent>, ClassifyError> {
        let uri = record.request_uri.as_str();
        let path = uri.split('?').next().unwrap_or_default();

        let event = match record.verb.as_str() {
            "create" if uri.contains("binding") => {
                let node_name = request_str(record, BINDING_TARGET_PATH)
                    .ok_or(ClassifyError::MissingField("requestObject.target.name"))?;
                LifecycleEvent::from_ref(record, EventKind::Pod(PodEvent::Bound)).with_attr(NODE_NAME_ATTR, node_name)
            },
            "create" if uri.contains("eviction") => {
                LifecycleEvent::from_ref(record, EventKind::Pod(PodEvent::Evicted))
            },
            "create" => Self::event_from_body(record, PodEvent::Created)?,
            "update" => {
                let mut event = Self::event_from_body(record, PodEvent::Updated)?;
                if Self::is_nomination(record) {
                    event = event.with_attr(NOMINATION_ATTR, "true");
                    let nominated = request_str(record, BINDING_TARGET_PATH)
                        .or_else(|| request_str(record, SPEC_NODE_NAME_PATH));
                    if let Some(node_name) = nominated {
                        event = event.with_attr(NOMINATED_NODE_ATTR, node_name);
                    }
                }
                event
            },
            "patch" if path.ends_with("/status") => {
                let event = LifecycleEvent::from_ref(record, EventKind::Pod(PodEvent::StatusChanged));
                match request_str(record, STATUS_PHASE_PATH) {
                    Some(phase) => event.with_attr(PHASE_ATTR, phase),
                    None => event,
                }
            },
            "delete" => LifecycleEvent::from_ref(record, EventKind::Pod(PodEvent::Deleted)),
            _ => return Ok(None),
        };

        if event.identity.is_empty() {
            debug!(audit_id = %record.audit_id, "pod event has no identity, dropping");
            return Ok(None);
        }
        Ok(Some(event))
    }

    fn coalesce(&self, identity: &Identity, events: &[LifecycleEvent]) -> Snapshot {
        let selected = select_events(events, identity, |kind| match kind {
            EventKind::Pod(k) => Some(k),
            EventKind::Node(_) => None,
        });

        let bound = latest(events_of(&selected, &[PodEvent::Bound]));
        let pod = latest(events_of(&selected, &[PodEvent::Created, PodEvent::Updated]).filter(|e| e.object.is_some()))
            .and_then(|e| match &e.object {
                Some(TrackedObject::Pod(pod)) => Some(pod.as_ref().clone()),
                _ => None,
            });
        let phase = latest(events_of(&selected, &[PodEvent::StatusChanged]).filter(|e| e.attr(PHASE_ATTR).is_some()))
            .and_then(|e| e.attr(PHASE_ATTR));

        let mut nominations: Vec<Nomination> = events_of(&selected, &[PodEvent::Updated])
            .filter(|e| e.attr(NOMINATION_ATTR).is_some())
            .map(|e| Nomination { ts: e.ts, node_name: e.attr(NOMINATED_NODE_ATTR).map(String::from) })
            .collect();
        nominations.sort();
        nominations.dedup();

        Snapshot::Pod(PodSnapshot {
            identity: identity.clone(),
            pod,
            node_name: bound.and_then(|e| e.attr(NODE_NAME_ATTR)).map(String::from),
            phase: phase.map(String::from),
            creation_time: latest_ts(&selected, PodEvent::Created),
            last_updated_time: latest_ts(&selected, PodEvent::Updated),
            bind_time: bound.map(|e| e.ts),
            eviction_time: latest_ts(&selected, PodEvent::Evicted),
            status_changed_time: latest_ts(&selected, PodEvent::StatusChanged),
            deletion_time: latest_ts(&selected, PodEvent::Deleted),
            nominations,
        })
    }

    fn get_query(&self, identity: &Identity) -> String {
        InsightsQuery::audit(ObjectKind::Pod.resource())
            .verbs(&["create", "update", "delete"])
            .mentions(&identity.name)
            .uri_contains(&namespace_path(identity))
            .build()
    }

    fn describe_query(&self, identity: &Identity) -> String {
        InsightsQuery::audit(ObjectKind::Pod.resource())
            .verbs(&["create", "update", "patch", "delete"])
            .mentions(&identity.name)
            .uri_contains(&namespace_path(identity))
            .build()
    }
}

fn namespace_path(identity: &Identity) -> String {
    format!("/namespaces/{}/", identity.namespace.as_deref().unwrap_or("default"))
}
