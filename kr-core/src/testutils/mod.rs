//! Audit record builders and fixtures shared by the workspace's tests.
use chrono::{
    DateTime,
    Duration,
    SecondsFormat,
    TimeZone,
    Utc,
};
use rstest::*;
use serde_json::json;

use crate::audit::AuditEvent;
use crate::lifecycle::{
    Dispatcher,
    KindRegistry,
};

pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_POD: &str = "the-pod";
pub const TEST_NODE: &str = "node-7";
pub const TEST_IMAGE: &str = "nginx:1.27";

/// Seconds after a fixed epoch, so tests can talk about "t=10" instead of full timestamps.
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
}

#[derive(Clone)]
pub struct RecordBuilder {
    value: serde_json::Value,
}

impl RecordBuilder {
    pub fn new(verb: &str, resource: &str, namespace: &str, name: &str, secs: i64) -> Self {
        let stamp = ts(secs).to_rfc3339_opts(SecondsFormat::Micros, true);
        let path = match (namespace, name) {
            ("", "") => format!("/api/v1/{resource}"),
            ("", name) => format!("/api/v1/{resource}/{name}"),
            (ns, "") => format!("/api/v1/namespaces/{ns}/{resource}"),
            (ns, name) => format!("/api/v1/namespaces/{ns}/{resource}/{name}"),
        };
        RecordBuilder {
            value: json!({
                "kind": "Event",
                "apiVersion": "audit.k8s.io/v1",
                "level": "RequestResponse",
                "auditID": format!("{verb}-{resource}-{name}-{secs}"),
                "stage": "ResponseComplete",
                "requestURI": path,
                "verb": verb,
                "user": {"username": "kubernetes-admin", "groups": ["system:masters", "system:authenticated"]},
                "objectRef": {
                    "resource": resource,
                    "namespace": namespace,
                    "name": name,
                    "apiVersion": "v1",
                },
                "responseStatus": {"metadata": {}, "code": 200},
                "requestReceivedTimestamp": stamp,
                "stageTimestamp": stamp,
            }),
        }
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.value["requestURI"] = json!(uri);
        self
    }

    pub fn subresource(mut self, subresource: &str) -> Self {
        let uri = format!("{}/{subresource}", self.value["requestURI"].as_str().unwrap());
        self.value["objectRef"]["subresource"] = json!(subresource);
        self.uri(&uri)
    }

    pub fn audit_id(mut self, id: &str) -> Self {
        self.value["auditID"] = json!(id);
        self
    }

    pub fn user(mut self, username: &str) -> Self {
        self.value["user"]["username"] = json!(username);
        self
    }

    pub fn stage(mut self, stage: &str) -> Self {
        self.value["stage"] = json!(stage);
        self
    }

    pub fn code(mut self, code: i32) -> Self {
        self.value["responseStatus"]["code"] = json!(code);
        self
    }

    pub fn request(mut self, body: serde_json::Value) -> Self {
        self.value["requestObject"] = body;
        self
    }

    pub fn response(mut self, body: serde_json::Value) -> Self {
        self.value["responseObject"] = body;
        self
    }

    pub fn json(&self) -> serde_json::Value {
        self.value.clone()
    }

    pub fn line(&self) -> String {
        self.value.to_string()
    }

    pub fn build(self) -> AuditEvent {
        serde_json::from_value(self.value).unwrap()
    }
}

pub fn pod_body(namespace: &str, name: &str, image: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "6a1b4a3c-6a8e-4bb1-9a47-3f1a2c5d9e10",
            "annotations": {
                "kubectl.kubernetes.io/last-applied-configuration": "{}",
                "team": "platform",
            },
            "managedFields": [{"manager": "kubectl-client-side-apply", "operation": "Update", "apiVersion": "v1"}],
        },
        "spec": {"containers": [{"name": "main", "image": image}]},
        "status": {"phase": "Pending"},
    })
}

pub fn node_body(name: &str, instance_type: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Node",
        "metadata": {
            "name": name,
            "labels": {"node.kubernetes.io/instance-type": instance_type},
            "managedFields": [{"manager": "kubelet", "operation": "Update", "apiVersion": "v1"}],
        },
        "spec": {"providerID": format!("aws:///us-west-2a/{name}")},
    })
}

pub fn pod_create(namespace: &str, name: &str, image: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("create", "pods", namespace, name, secs)
        .uri(&format!("/api/v1/namespaces/{namespace}/pods"))
        .code(201)
        .response(pod_body(namespace, name, image))
}

pub fn pod_update(namespace: &str, name: &str, image: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("update", "pods", namespace, name, secs)
        .request(pod_body(namespace, name, image))
        .response(pod_body(namespace, name, image))
}

pub fn pod_binding(namespace: &str, name: &str, node: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("create", "pods", namespace, name, secs)
        .subresource("binding")
        .user("system:kube-scheduler")
        .code(201)
        .request(json!({
            "kind": "Binding",
            "apiVersion": "v1",
            "metadata": {"name": name, "namespace": namespace},
            "target": {"kind": "Node", "name": node},
        }))
}

pub fn pod_eviction(namespace: &str, name: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("create", "pods", namespace, name, secs)
        .subresource("eviction")
        .code(201)
        .request(json!({
            "kind": "Eviction",
            "apiVersion": "policy/v1",
            "metadata": {"name": name, "namespace": namespace},
        }))
}

pub fn pod_status_patch(namespace: &str, name: &str, phase: Option<&str>, secs: i64) -> RecordBuilder {
    let status = match phase {
        Some(phase) => json!({"phase": phase}),
        None => json!({"conditions": [{"type": "Ready", "status": "True"}]}),
    };
    RecordBuilder::new("patch", "pods", namespace, name, secs)
        .subresource("status")
        .user("system:node:node-7")
        .request(json!({"status": status}))
}

pub fn pod_delete(namespace: &str, name: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("delete", "pods", namespace, name, secs)
}

pub fn node_create(name: &str, instance_type: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("create", "nodes", "", name, secs)
        .uri("/api/v1/nodes")
        .code(201)
        .user(&format!("system:node:{name}"))
        .response(node_body(name, instance_type))
}

pub fn node_update(name: &str, instance_type: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("update", "nodes", "", name, secs)
        .user(&format!("system:node:{name}"))
        .response(node_body(name, instance_type))
}

pub fn node_delete(name: &str, secs: i64) -> RecordBuilder {
    RecordBuilder::new("delete", "nodes", "", name, secs)
}

#[fixture]
pub fn test_registry() -> KindRegistry {
    KindRegistry::default()
}

#[fixture]
pub fn test_dispatcher() -> Dispatcher {
    Dispatcher::default()
}
