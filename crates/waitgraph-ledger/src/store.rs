//! # Entity Store
//!
//! Owns every [`Process`] and [`Resource`] record. Entities are kept in
//! creation order and indexed by id; there is no per-entity deletion, only
//! [`EntityStore::clear`].

use crate::error::{LedgerError, Result};
use crate::models::{Process, ProcessId, ProcessStatus, Resource, ResourceId, Units};
use std::collections::HashMap;

/// Registry of processes and resources.
///
/// # Example
///
/// ```rust
/// use waitgraph_ledger::EntityStore;
///
/// let mut store = EntityStore::new();
/// let pid = store.create_process("P1").id();
/// let rid = store.create_resource("printer", 2)?.id();
///
/// assert_eq!(store.process(pid)?.name(), "P1");
/// assert_eq!(store.resource(rid)?.total_units(), 2);
/// assert!(store.create_resource("broken", 0).is_err());
/// # Ok::<(), waitgraph_ledger::LedgerError>(())
/// ```
#[derive(Debug, Default)]
pub struct EntityStore {
    processes: Vec<Process>,
    process_index: HashMap<ProcessId, usize>,
    resources: Vec<Resource>,
    resource_index: HashMap<ResourceId, usize>,
}

impl EntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new active process under a fresh id.
    pub fn create_process(&mut self, name: impl Into<String>) -> &Process {
        let process = Process::new(name);
        let idx = self.processes.len();
        self.process_index.insert(process.id(), idx);
        self.processes.push(process);
        &self.processes[idx]
    }

    /// Registers a new resource with `total_units` capacity.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidArgument`] if `total_units` is zero.
    pub fn create_resource(&mut self, name: impl Into<String>, total_units: Units) -> Result<&Resource> {
        if total_units == 0 {
            return Err(LedgerError::InvalidArgument(
                "total_units must be at least 1".to_string(),
            ));
        }
        let resource = Resource::new(name, total_units);
        let idx = self.resources.len();
        self.resource_index.insert(resource.id(), idx);
        self.resources.push(resource);
        Ok(&self.resources[idx])
    }

    /// Looks up a process.
    pub fn process(&self, id: ProcessId) -> Result<&Process> {
        self.process_index
            .get(&id)
            .map(|&i| &self.processes[i])
            .ok_or(LedgerError::ProcessNotFound(id))
    }

    /// Looks up a resource.
    pub fn resource(&self, id: ResourceId) -> Result<&Resource> {
        self.resource_index
            .get(&id)
            .map(|&i| &self.resources[i])
            .ok_or(LedgerError::ResourceNotFound(id))
    }

    /// Returns `true` if the process is registered.
    pub fn contains_process(&self, id: ProcessId) -> bool {
        self.process_index.contains_key(&id)
    }

    /// Updates a process status.
    pub fn set_status(&mut self, id: ProcessId, status: ProcessStatus) -> Result<()> {
        let idx = *self
            .process_index
            .get(&id)
            .ok_or(LedgerError::ProcessNotFound(id))?;
        self.processes[idx].set_status(status);
        Ok(())
    }

    /// Processes in creation order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Resources in creation order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Process ids in creation order.
    pub fn process_ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.processes.iter().map(Process::id)
    }

    /// Forgets every entity.
    pub fn clear(&mut self) {
        self.processes.clear();
        self.process_index.clear();
        self.resources.clear();
        self.resource_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_order_preserved() {
        let mut store = EntityStore::new();
        let a = store.create_process("A").id();
        let b = store.create_process("B").id();
        let ids: Vec<_> = store.process_ids().collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_zero_units_rejected_without_mutation() {
        let mut store = EntityStore::new();
        let err = store.create_resource("R", 0).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert!(store.resources().is_empty());
    }

    #[test]
    fn test_unknown_ids() {
        let store = EntityStore::new();
        assert!(store.process(ProcessId::new()).unwrap_err().is_not_found());
        assert!(store.resource(ResourceId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_status() {
        let mut store = EntityStore::new();
        let pid = store.create_process("P").id();
        store.set_status(pid, ProcessStatus::Blocked).unwrap();
        assert_eq!(store.process(pid).unwrap().status(), ProcessStatus::Blocked);
        assert!(store.set_status(ProcessId::new(), ProcessStatus::Active).is_err());
    }

    #[test]
    fn test_clear() {
        let mut store = EntityStore::new();
        let pid = store.create_process("P").id();
        store.create_resource("R", 1).unwrap();
        store.clear();
        assert!(store.processes().is_empty());
        assert!(store.resources().is_empty());
        assert!(!store.contains_process(pid));
    }
}
