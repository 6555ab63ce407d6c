//! Read-only projections of engine state.
//!
//! These are what callers see: snapshots for inspection and visualization,
//! per-entity views, and the deadlock report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use waitgraph_ledger::{Process, ProcessId, ProcessStatus, ResourceId, UnitMap, Units};

/// A process with its current allocations and pending requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessView {
    /// Process identity.
    pub id: ProcessId,
    /// Display name given at creation.
    pub name: String,
    /// Current lifecycle status.
    pub status: ProcessStatus,
    /// resource → units currently granted.
    pub allocated: BTreeMap<ResourceId, Units>,
    /// resource → units still pending.
    pub requested: BTreeMap<ResourceId, Units>,
}

/// A resource with its current holders and waiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceView {
    /// Resource identity.
    pub id: ResourceId,
    /// Display name given at creation.
    pub name: String,
    /// Total capacity, fixed at creation.
    pub units: Units,
    /// process → units currently held.
    pub allocated: BTreeMap<ProcessId, Units>,
    /// process → units waited for.
    pub requested: BTreeMap<ProcessId, Units>,
}

impl ResourceView {
    /// Units not currently granted to anyone.
    pub fn available(&self) -> Units {
        let held: Units = self.allocated.values().sum();
        self.units.saturating_sub(held)
    }
}

/// Full engine snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    /// Processes in creation order.
    pub processes: Vec<ProcessView>,
    /// Resources in creation order.
    pub resources: Vec<ResourceView>,
    /// process → resource → units granted.
    pub allocation_graph: UnitMap,
    /// process → resource → units pending.
    pub request_graph: UnitMap,
}

impl SystemState {
    /// Returns `true` when no entity exists.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty() && self.resources.is_empty()
    }
}

/// Identity and name of a process, as listed in a deadlock report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRef {
    /// Process identity.
    pub id: ProcessId,
    /// Display name given at creation.
    pub name: String,
}

impl From<&Process> for ProcessRef {
    fn from(process: &Process) -> Self {
        Self {
            id: process.id(),
            name: process.name().to_string(),
        }
    }
}

/// Result of a deadlock check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockReport {
    /// `true` iff `deadlocked_processes` is non-empty.
    pub deadlock_detected: bool,
    /// Processes in, or waiting on, a circular wait; creation order.
    pub deadlocked_processes: Vec<ProcessRef>,
}

impl DeadlockReport {
    pub(crate) fn new(deadlocked_processes: Vec<ProcessRef>) -> Self {
        Self {
            deadlock_detected: !deadlocked_processes.is_empty(),
            deadlocked_processes,
        }
    }

    /// Returns `true` if `id` is reported as deadlocked.
    pub fn contains(&self, id: ProcessId) -> bool {
        self.deadlocked_processes.iter().any(|p| p.id == id)
    }
}
