pub use crate::audit::AuditEvent;
pub use crate::errors::*;
pub use crate::k8s::Identity;
pub use crate::lifecycle::{
    Dispatcher,
    KindRegistry,
    LifecycleEvent,
    ObjectKind,
    ObjectLifecycle,
    QueryIntent,
    Snapshot,
};
pub use crate::logging;
