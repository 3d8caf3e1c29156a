//! Mock implementations for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use anyhow::{Result, anyhow};
use doc_directives::domain::entity::Inspection;
use doc_directives::domain::ports::InspectionSource;

/// In-memory source that serves a queue of inspections, one per `load`.
///
/// The last inspection is served again once the queue is drained.
pub struct MockInspectionSource {
    snapshots: Mutex<Vec<Inspection>>,
    loads: AtomicUsize,
}

impl MockInspectionSource {
    pub fn new(first: Inspection) -> Self {
        Self {
            snapshots: Mutex::new(vec![first]),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn then(self, next: Inspection) -> Self {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(next);
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl InspectionSource for MockInspectionSource {
    fn load(&self) -> Result<Inspection> {
        let n = self.loads.fetch_add(1, Ordering::SeqCst);
        let snapshots = self.snapshots.lock().unwrap_or_else(PoisonError::into_inner);
        snapshots
            .get(n)
            .or_else(|| snapshots.last())
            .cloned()
            .ok_or_else(|| anyhow!("no inspection queued"))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Source whose every load fails.
pub struct FailingInspectionSource;

impl InspectionSource for FailingInspectionSource {
    fn load(&self) -> Result<Inspection> {
        Err(anyhow!("inspector crashed"))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}
