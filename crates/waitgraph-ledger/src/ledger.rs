//! # Allocation Ledger
//!
//! Granted units per (process, resource) pair. The ledger does not know
//! resource capacities; the allocator checks capacity before granting.

use crate::models::{ProcessId, ResourceId, Units};
use crate::table::{UnitMap, UnitTable};
use std::collections::BTreeMap;

/// Outcome of [`AllocationLedger::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// The whole holding was returned and the entry removed.
    All(Units),
    /// Only part of the holding was returned; `remaining` is still held.
    Partial {
        /// Units returned.
        released: Units,
        /// Units still held.
        remaining: Units,
    },
}

impl Released {
    /// Units returned to the resource.
    pub fn units(&self) -> Units {
        match *self {
            Self::All(units) => units,
            Self::Partial { released, .. } => released,
        }
    }
}

/// Granted units, viewable per resource and per process.
#[derive(Debug, Default)]
pub struct AllocationLedger {
    table: UnitTable,
}

impl AllocationLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units of `resource` held by `process` (zero when none).
    pub fn held(&self, process: ProcessId, resource: ResourceId) -> Units {
        self.table.get(process, resource).unwrap_or(0)
    }

    /// Total units of `resource` currently granted.
    pub fn allocated_units(&self, resource: ResourceId) -> u64 {
        self.table.total_for_resource(resource)
    }

    /// Grants `units` more of `resource` to `process` and returns the new holding.
    pub fn grant(&mut self, process: ProcessId, resource: ResourceId, units: Units) -> Units {
        self.table.add(process, resource, units)
    }

    /// Returns units to the resource.
    ///
    /// With `units` unset, or at least the current holding, the whole holding
    /// is released and the entry removed. Returns `None` if nothing is held.
    pub fn release(
        &mut self,
        process: ProcessId,
        resource: ResourceId,
        units: Option<Units>,
    ) -> Option<Released> {
        let held = self.table.get(process, resource)?;
        match units {
            Some(n) if n < held => {
                let remaining = held - n;
                self.table.set(process, resource, remaining);
                Some(Released::Partial {
                    released: n,
                    remaining,
                })
            }
            _ => {
                self.table.remove(process, resource);
                Some(Released::All(held))
            }
        }
    }

    /// Holders of `resource`, in the order they were first granted.
    pub fn holders(&self, resource: ResourceId) -> impl Iterator<Item = (ProcessId, Units)> + '_ {
        self.table.by_resource(resource)
    }

    /// Resources held by `process`.
    pub fn holdings(&self, process: ProcessId) -> impl Iterator<Item = (ResourceId, Units)> + '_ {
        self.table.by_process(process)
    }

    /// Per-resource view.
    pub fn resource_view(&self, resource: ResourceId) -> BTreeMap<ProcessId, Units> {
        self.table.resource_view(resource)
    }

    /// Per-process view.
    pub fn process_view(&self, process: ProcessId) -> BTreeMap<ResourceId, Units> {
        self.table.process_view(process)
    }

    /// Global allocation graph.
    pub fn graph<I: IntoIterator<Item = ProcessId>>(&self, processes: I) -> UnitMap {
        self.table.nested(processes)
    }

    /// Underlying table.
    pub fn table(&self) -> &UnitTable {
        &self.table
    }

    /// Drops every allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_release_keeps_entry() {
        let p = ProcessId::new();
        let r = ResourceId::new();
        let mut ledger = AllocationLedger::new();
        ledger.grant(p, r, 3);

        let released = ledger.release(p, r, Some(1)).unwrap();
        assert_eq!(
            released,
            Released::Partial {
                released: 1,
                remaining: 2
            }
        );
        assert_eq!(ledger.held(p, r), 2);
    }

    #[test]
    fn test_oversized_release_removes_entry() {
        let p = ProcessId::new();
        let r = ResourceId::new();
        let mut ledger = AllocationLedger::new();
        ledger.grant(p, r, 2);

        assert_eq!(ledger.release(p, r, Some(5)), Some(Released::All(2)));
        assert_eq!(ledger.holdings(p).count(), 0);
    }

    #[test]
    fn test_release_without_units_releases_all() {
        let p = ProcessId::new();
        let r = ResourceId::new();
        let mut ledger = AllocationLedger::new();
        ledger.grant(p, r, 4);
        assert_eq!(ledger.release(p, r, None).map(|r| r.units()), Some(4));
        assert_eq!(ledger.allocated_units(r), 0);
    }

    #[test]
    fn test_release_nothing_held() {
        let mut ledger = AllocationLedger::new();
        assert!(ledger.release(ProcessId::new(), ResourceId::new(), None).is_none());
    }
}
