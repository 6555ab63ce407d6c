//! # Request Queue
//!
//! Pending (ungranted) requests. Each resource's waiters are kept in the
//! order their request was first recorded, which is the order the
//! request-satisfaction scan walks them.

use crate::models::{ProcessId, ResourceId, Units};
use crate::table::{UnitMap, UnitTable};
use std::collections::BTreeMap;

/// Pending requests, viewable per resource and per process.
#[derive(Debug, Default)]
pub struct RequestQueue {
    table: UnitTable,
}

impl RequestQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request. A process re-requesting the same resource replaces
    /// its pending amount but keeps its place in line.
    pub fn record(&mut self, process: ProcessId, resource: ResourceId, units: Units) {
        self.table.set(process, resource, units);
    }

    /// Removes a pending request, returning its units.
    pub fn withdraw(&mut self, process: ProcessId, resource: ResourceId) -> Option<Units> {
        self.table.remove(process, resource)
    }

    /// Pending units for a pair.
    pub fn pending(&self, process: ProcessId, resource: ResourceId) -> Option<Units> {
        self.table.get(process, resource)
    }

    /// Waiters on `resource`, in insertion order.
    pub fn waiting_on(&self, resource: ResourceId) -> impl Iterator<Item = (ProcessId, Units)> + '_ {
        self.table.by_resource(resource)
    }

    /// Resources `process` is waiting on, in insertion order.
    pub fn pending_for(&self, process: ProcessId) -> impl Iterator<Item = (ResourceId, Units)> + '_ {
        self.table.by_process(process)
    }

    /// Returns `true` if `process` has at least one pending request.
    pub fn is_waiting(&self, process: ProcessId) -> bool {
        self.table.has_process(process)
    }

    /// Per-resource view.
    pub fn resource_view(&self, resource: ResourceId) -> BTreeMap<ProcessId, Units> {
        self.table.resource_view(resource)
    }

    /// Per-process view.
    pub fn process_view(&self, process: ProcessId) -> BTreeMap<ResourceId, Units> {
        self.table.process_view(process)
    }

    /// Global request graph.
    pub fn graph<I: IntoIterator<Item = ProcessId>>(&self, processes: I) -> UnitMap {
        self.table.nested(processes)
    }

    /// Underlying table.
    pub fn table(&self) -> &UnitTable {
        &self.table
    }

    /// Drops every pending request.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rerequest_keeps_place() {
        let (a, b) = (ProcessId::new(), ProcessId::new());
        let r = ResourceId::new();
        let mut queue = RequestQueue::new();
        queue.record(a, r, 2);
        queue.record(b, r, 1);
        queue.record(a, r, 1);

        let waiters: Vec<_> = queue.waiting_on(r).collect();
        assert_eq!(waiters, vec![(a, 1), (b, 1)]);
    }

    #[test]
    fn test_withdraw() {
        let p = ProcessId::new();
        let r = ResourceId::new();
        let mut queue = RequestQueue::new();
        queue.record(p, r, 1);
        assert!(queue.is_waiting(p));
        assert_eq!(queue.withdraw(p, r), Some(1));
        assert!(!queue.is_waiting(p));
        assert_eq!(queue.withdraw(p, r), None);
    }
}
