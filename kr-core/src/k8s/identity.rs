use std::fmt;

use kube::{
    Resource,
    ResourceExt,
};
use serde::{
    Deserialize,
    Serialize,
};

/// The coalescing key for a tracked object: `namespace/name` for namespaced kinds, `name` alone
/// for cluster-scoped kinds.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity {
    pub namespace: Option<String>,
    pub name: String,
}

impl Identity {
    pub fn namespaced(namespace: &str, name: &str) -> Self {
        Self { namespace: non_empty(namespace), name: name.into() }
    }

    pub fn cluster_scoped(name: &str) -> Self {
        Self { namespace: None, name: name.into() }
    }

    /// Identity as recorded in an object's own metadata.  An empty namespace is treated as absent.
    pub fn from_obj<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace().and_then(|ns| non_empty(&ns)),
            name: obj.meta().name.clone().unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.into())
}
