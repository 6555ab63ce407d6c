//! Insertion-ordered process × resource unit table.
//!
//! Both the allocation and the request relation are stored in a single
//! `UnitTable` each. Rows are the only place units live; the pair index and
//! the per-resource and per-process indices hold row keys, never counts, so
//! the views projected from them can never disagree.

use crate::models::{ProcessId, ResourceId, Units};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Nested process → resource → units map, as exported in snapshots.
pub type UnitMap = BTreeMap<ProcessId, BTreeMap<ResourceId, Units>>;

/// One row of a [`UnitTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Owning process.
    pub process: ProcessId,
    /// Resource the units belong to.
    pub resource: ResourceId,
    /// Unit count, always positive.
    pub units: Units,
}

/// Process × resource relation keeping first-insertion order.
///
/// Overwriting an existing pair keeps its original position; removing a pair
/// and inserting it again moves it to the back.
///
/// Every row gets a sequence number when first inserted. Lookups by pair,
/// resource or process go through indices keyed on that number and never
/// walk unrelated rows.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    rows: BTreeMap<u64, Entry>,
    pairs: HashMap<(ProcessId, ResourceId), u64>,
    by_resource: HashMap<ResourceId, BTreeMap<u64, ProcessId>>,
    by_process: HashMap<ProcessId, BTreeMap<u64, ResourceId>>,
    next_seq: u64,
}

impl UnitTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn seq(&self, process: ProcessId, resource: ResourceId) -> Option<u64> {
        self.pairs.get(&(process, resource)).copied()
    }

    fn insert(&mut self, process: ProcessId, resource: ResourceId, units: Units) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.insert(
            seq,
            Entry {
                process,
                resource,
                units,
            },
        );
        self.pairs.insert((process, resource), seq);
        self.by_resource.entry(resource).or_default().insert(seq, process);
        self.by_process.entry(process).or_default().insert(seq, resource);
    }

    /// Returns the units recorded for a pair.
    pub fn get(&self, process: ProcessId, resource: ResourceId) -> Option<Units> {
        self.seq(process, resource)
            .and_then(|seq| self.rows.get(&seq))
            .map(|e| e.units)
    }

    /// Sets the units for a pair, keeping its position if already present.
    pub fn set(&mut self, process: ProcessId, resource: ResourceId, units: Units) {
        match self.seq(process, resource).and_then(|seq| self.rows.get_mut(&seq)) {
            Some(entry) => entry.units = units,
            None => self.insert(process, resource, units),
        }
    }

    /// Adds units to a pair and returns the new amount.
    pub fn add(&mut self, process: ProcessId, resource: ResourceId, units: Units) -> Units {
        match self.seq(process, resource).and_then(|seq| self.rows.get_mut(&seq)) {
            Some(entry) => {
                entry.units = entry.units.saturating_add(units);
                entry.units
            }
            None => {
                self.insert(process, resource, units);
                units
            }
        }
    }

    /// Removes a pair, returning the units it held.
    pub fn remove(&mut self, process: ProcessId, resource: ResourceId) -> Option<Units> {
        let seq = self.pairs.remove(&(process, resource))?;
        if let Some(seqs) = self.by_resource.get_mut(&resource) {
            seqs.remove(&seq);
            if seqs.is_empty() {
                self.by_resource.remove(&resource);
            }
        }
        if let Some(seqs) = self.by_process.get_mut(&process) {
            seqs.remove(&seq);
            if seqs.is_empty() {
                self.by_process.remove(&process);
            }
        }
        self.rows.remove(&seq).map(|e| e.units)
    }

    /// Entries for one resource, in insertion order.
    pub fn by_resource(&self, resource: ResourceId) -> impl Iterator<Item = (ProcessId, Units)> + '_ {
        self.by_resource
            .get(&resource)
            .into_iter()
            .flat_map(|seqs| seqs.keys())
            .filter_map(move |seq| self.rows.get(seq))
            .map(|e| (e.process, e.units))
    }

    /// Entries for one process, in insertion order.
    pub fn by_process(&self, process: ProcessId) -> impl Iterator<Item = (ResourceId, Units)> + '_ {
        self.by_process
            .get(&process)
            .into_iter()
            .flat_map(|seqs| seqs.keys())
            .filter_map(move |seq| self.rows.get(seq))
            .map(|e| (e.resource, e.units))
    }

    /// Returns `true` if the process has at least one row.
    pub fn has_process(&self, process: ProcessId) -> bool {
        self.by_process.contains_key(&process)
    }

    /// Sum of all units recorded against a resource.
    pub fn total_for_resource(&self, resource: ResourceId) -> u64 {
        self.by_resource(resource).map(|(_, units)| u64::from(units)).sum()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.rows.values()
    }

    /// Number of recorded pairs.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no pair is recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.pairs.clear();
        self.by_resource.clear();
        self.by_process.clear();
    }

    /// Per-resource view: process → units for one resource.
    pub fn resource_view(&self, resource: ResourceId) -> BTreeMap<ProcessId, Units> {
        self.by_resource(resource).collect()
    }

    /// Per-process view: resource → units for one process.
    pub fn process_view(&self, process: ProcessId) -> BTreeMap<ResourceId, Units> {
        self.by_process(process).collect()
    }

    /// Global nested view, with an entry (possibly empty) for each listed process.
    pub fn nested<I>(&self, processes: I) -> UnitMap
    where
        I: IntoIterator<Item = ProcessId>,
    {
        let mut map: UnitMap = processes
            .into_iter()
            .map(|p| (p, BTreeMap::new()))
            .collect();
        for e in self.rows.values() {
            map.entry(e.process).or_default().insert(e.resource, e.units);
        }
        map
    }
}
