use rayon::prelude::*;
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use super::{
    ClassifyError,
    KindRegistry,
    LifecycleEvent,
};
use crate::audit::AuditEvent;

/// What became of a single record.
#[derive(Debug)]
pub enum Dispatched {
    Event(Box<LifecycleEvent>),
    /// A tracked kind, but not a lifecycle transition (wrong verb, incomplete stage, rejected
    /// request).
    Ignored,
    /// No classifier is registered for the record's resource.
    Unrecognized,
    Malformed(ClassifyError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub records: usize,
    pub events: usize,
    pub ignored: usize,
    pub unrecognized: usize,
    pub malformed: usize,
}

/// The immutable result of classifying a batch of records.
#[derive(Debug, Default)]
pub struct Extraction {
    pub events: Vec<LifecycleEvent>,
    pub stats: ExtractionStats,
}

/// Routes each record to the classifier registered for its `objectRef.resource`.
///
/// The dispatcher holds no mutable state, so `dispatch` may be called concurrently on independent
/// records.
#[derive(Clone, Default)]
pub struct Dispatcher {
    registry: KindRegistry,
}

impl Dispatcher {
    pub fn new(registry: KindRegistry) -> Self {
        Dispatcher { registry }
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn dispatch(&self, record: &AuditEvent) -> Dispatched {
        let Some(lifecycle) = record.resource().and_then(|r| self.registry.for_resource(r)) else {
            return Dispatched::Unrecognized;
        };

        if !record.is_complete() || record.is_rejected() {
            return Dispatched::Ignored;
        }

        match lifecycle.classify(record) {
            Ok(Some(event)) => Dispatched::Event(Box::new(event)),
            Ok(None) => Dispatched::Ignored,
            Err(err) => Dispatched::Malformed(err),
        }
    }

    /// Classify every record in parallel, then collect the results in a single sequential pass.
    /// The returned events keep the input order of their records.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn extract(&self, records: &[AuditEvent]) -> Extraction {
        let dispatched: Vec<Dispatched> = records.par_iter().map(|record| self.dispatch(record)).collect();

        let mut extraction = Extraction::default();
        extraction.stats.records = records.len();
        for (record, outcome) in records.iter().zip(dispatched) {
            match outcome {
                Dispatched::Event(event) => extraction.events.push(*event),
                Dispatched::Ignored => extraction.stats.ignored += 1,
                Dispatched::Unrecognized => extraction.stats.unrecognized += 1,
                Dispatched::Malformed(err) => {
                    warn!(audit_id = %record.audit_id, verb = %record.verb, "skipping malformed audit record: {err}");
                    extraction.stats.malformed += 1;
                },
            }
        }
        extraction.stats.events = extraction.events.len();

        if extraction.stats.unrecognized > 0 {
            debug!(unrecognized = extraction.stats.unrecognized, "dropped records for untracked resources");
        }
        info!(
            events = extraction.stats.events,
            ignored = extraction.stats.ignored,
            malformed = extraction.stats.malformed,
            "extracted lifecycle events"
        );
        extraction
    }
}
