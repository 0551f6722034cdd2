use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// Audit logs on EKS land in log streams named `kube-apiserver-audit-<id>`.
pub const AUDIT_LOG_STREAM: &str = "kube-apiserver-audit";

/// Insights refuses to return more than this many rows from a single query.  A result of exactly
/// this size has probably been truncated.
pub const MAX_QUERY_ROWS: usize = 10_000;

/// What the caller intends to render; `describe` needs a wider set of records than `get`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryIntent {
    Get,
    Describe,
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryIntent::Get => write!(f, "get"),
            QueryIntent::Describe => write!(f, "describe"),
        }
    }
}

/// Builder for a CloudWatch Logs Insights query over API-server audit records.  Every query
/// projects `@timestamp` and `@message` and is restricted to the audit log streams.
#[derive(Clone, Debug)]
pub struct InsightsQuery {
    filters: Vec<String>,
}

impl InsightsQuery {
    pub fn audit(resource: &str) -> Self {
        InsightsQuery {
            filters: vec![
                format!(r#"@logStream like "{AUDIT_LOG_STREAM}""#),
                format!(r#"objectRef.resource = "{resource}""#),
            ],
        }
    }

    pub fn verbs(self, verbs: &[&str]) -> Self {
        let quoted: Vec<_> = verbs.iter().map(|v| format!(r#""{v}""#)).collect();
        self.filter(format!("verb in [{}]", quoted.join(", ")))
    }

    /// `@message` contains `needle` anywhere; used for names because `objectRef.name` is empty on
    /// create requests for objects named via `generateName`.
    pub fn mentions(self, needle: &str) -> Self {
        self.filter(format!(r#"@message like "{needle}""#))
    }

    pub fn uri_contains(self, needle: &str) -> Self {
        self.filter(format!(r#"requestURI like "{needle}""#))
    }

    pub fn uri_excludes(self, needle: &str) -> Self {
        self.filter(format!(r#"requestURI not like "{needle}""#))
    }

    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.filters.push(clause.into());
        self
    }

    pub fn build(&self) -> String {
        let mut lines = vec!["fields @timestamp, @message".to_string()];
        lines.extend(self.filters.iter().map(|f| format!("| filter {f}")));
        // Newest first: when the row cap is hit, the oldest records are the ones dropped.
        lines.push("| sort @timestamp desc".into());
        lines.push(format!("| limit {MAX_QUERY_ROWS}"));
        lines.join("\n")
    }
}
