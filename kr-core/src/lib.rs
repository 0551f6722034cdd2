//! # kr-core: lifecycle reconstruction from Kubernetes audit logs
//!
//! `kr-core` turns a batch of API-server audit records into the point-in-time state of a single
//! pod or node, without ever talking to a cluster.
//!
//! ## Pipeline overview
//! 1. Decoding ([`audit::AuditEvent`]): the audit event JSON shape, one record per log line.
//! 2. Dispatch ([`lifecycle::Dispatcher`]): route each record to the classifier registered for
//!    its `objectRef.resource` in the [`lifecycle::KindRegistry`]; unknown resources are dropped.
//! 3. Classification ([`lifecycle::ObjectLifecycle::classify`]): turn a record into zero or one
//!    typed [`lifecycle::LifecycleEvent`].
//! 4. Coalescing ([`lifecycle::ObjectLifecycle::coalesce`]): fold the events for one
//!    [`k8s::Identity`] into a [`lifecycle::Snapshot`], independently of delivery order.
//!
//! Fetching records (files, log backends) and rendering snapshots live in other crates.
pub mod audit;
pub mod errors;
pub mod k8s;
pub mod lifecycle;
pub mod logging;
pub mod prelude;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
