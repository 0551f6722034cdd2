//! The Kubernetes API-server audit event, as written by the `Log` audit backend (one JSON object per
//! line) and forwarded verbatim by managed log services.
//!
//! Only `requestReceivedTimestamp` is required; everything else is defaulted so that records logged
//! at `Metadata` level, or with partial `objectRef`s, still decode.
use chrono::{
    DateTime,
    Utc,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use serde::{
    Deserialize,
    Serialize,
};

pub const STAGE_RESPONSE_COMPLETE: &str = "ResponseComplete";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub level: String,
    #[serde(rename = "auditID", default)]
    pub audit_id: String,
    #[serde(default)]
    pub stage: String,
    #[serde(rename = "requestURI", default)]
    pub request_uri: String,
    #[serde(default)]
    pub verb: String,
    #[serde(default)]
    pub user: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_ref: Option<ObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<ResponseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_object: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_object: Option<serde_json::Value>,
    pub request_received_timestamp: metav1::MicroTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_timestamp: Option<metav1::MicroTime>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// The subset of `metav1.Status` that audit records carry in `responseStatus`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResponseStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub api_group: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub resource_version: String,
    #[serde(default)]
    pub subresource: String,
}

impl AuditEvent {
    pub fn received_at(&self) -> DateTime<Utc> {
        self.request_received_timestamp.0
    }

    pub fn resource(&self) -> Option<&str> {
        self.object_ref.as_ref().map(|r| r.resource.as_str())
    }

    pub fn namespace(&self) -> &str {
        self.object_ref.as_ref().map_or("", |r| r.namespace.as_str())
    }

    pub fn name(&self) -> &str {
        self.object_ref.as_ref().map_or("", |r| r.name.as_str())
    }

    /// Multi-stage audit policies log the same request once per stage; only the final stage carries
    /// the response body.  Records without a stage are treated as complete.
    pub fn is_complete(&self) -> bool {
        self.stage.is_empty() || self.stage == STAGE_RESPONSE_COMPLETE
    }

    /// Whether the API server rejected the request (e.g. an eviction refused by a disruption
    /// budget); rejected requests did not change the object.
    pub fn is_rejected(&self) -> bool {
        self.response_status.as_ref().and_then(|s| s.code).is_some_and(|code| code >= 400)
    }
}
