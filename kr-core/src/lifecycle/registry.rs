use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    NodeLifecycle,
    ObjectKind,
    ObjectLifecycle,
    PodLifecycle,
};
use crate::err_impl;

err_impl! {KindError,
    #[error("unsupported object type: {0}")]
    Unsupported(String) => unsupported,
}

/// Maps API resource names (`pods`, `nodes`) to the lifecycle implementation for that kind.  Built
/// once per invocation; lookups never inspect decoded payloads.
#[derive(Clone)]
pub struct KindRegistry {
    kinds: BTreeMap<&'static str, Arc<dyn ObjectLifecycle>>,
}

impl KindRegistry {
    pub fn empty() -> Self {
        KindRegistry { kinds: BTreeMap::new() }
    }

    pub fn register(&mut self, lifecycle: Arc<dyn ObjectLifecycle>) {
        self.kinds.insert(lifecycle.kind().resource(), lifecycle);
    }

    /// Lookup by `objectRef.resource`; `None` for kinds nobody tracks.
    pub fn for_resource(&self, resource: &str) -> Option<&dyn ObjectLifecycle> {
        self.kinds.get(resource).map(Arc::as_ref)
    }

    /// Lookup by a user-supplied object type (`pod`, `nodes`, `po`, ...), case-insensitively.
    pub fn for_kind_arg(&self, arg: &str) -> anyhow::Result<&dyn ObjectLifecycle> {
        let arg = arg.to_lowercase();
        self.kinds
            .values()
            .find(|lifecycle| lifecycle.kind().aliases().contains(&arg.as_str()))
            .map(Arc::as_ref)
            .ok_or_else(|| KindError::unsupported(&arg))
    }

    pub fn kinds(&self) -> impl Iterator<Item = ObjectKind> + '_ {
        self.kinds.values().map(|lifecycle| lifecycle.kind())
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = KindRegistry::empty();
        registry.register(Arc::new(PodLifecycle));
        registry.register(Arc::new(NodeLifecycle));
        registry
    }
}
