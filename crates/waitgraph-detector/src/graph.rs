//! Wait-for graph construction.
//!
//! An edge `p → h` means process `p` has a pending request on some resource
//! that `h` currently holds units of. Only processes with at least one
//! pending request are source nodes.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use waitgraph_ledger::{AllocationLedger, ProcessId, RequestQueue};

/// Directed process → process graph of who waits on whom.
///
/// Source nodes and each node's edges keep first-seen order, which makes
/// traversal order (and so detection) deterministic.
///
/// # Example
///
/// ```rust
/// use waitgraph_detector::WaitForGraph;
/// use waitgraph_ledger::ProcessId;
///
/// let (a, b) = (ProcessId::new(), ProcessId::new());
/// let mut graph = WaitForGraph::new();
/// graph.add_edge(a, b);
/// graph.add_edge(a, a); // self edges are ignored
///
/// assert_eq!(graph.waits_for(a), &[b]);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WaitForGraph {
    waiters: Vec<ProcessId>,
    edges: HashMap<ProcessId, Vec<ProcessId>>,
}

impl WaitForGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from the current ledger and queue.
    ///
    /// `processes` fixes the order source nodes are added in; callers pass
    /// processes in creation order.
    pub fn build<I>(processes: I, ledger: &AllocationLedger, queue: &RequestQueue) -> Self
    where
        I: IntoIterator<Item = ProcessId>,
    {
        let mut graph = Self::new();
        for process in processes {
            if !queue.is_waiting(process) {
                continue;
            }
            graph.add_waiter(process);
            for (resource, _) in queue.pending_for(process) {
                for (holder, _) in ledger.holders(resource) {
                    graph.add_edge(process, holder);
                }
            }
        }
        graph
    }

    /// Adds a source node with no edges yet.
    pub fn add_waiter(&mut self, process: ProcessId) {
        if !self.edges.contains_key(&process) {
            self.waiters.push(process);
            self.edges.insert(process, Vec::new());
        }
    }

    /// Adds `from → to`. Self edges and duplicates are dropped.
    pub fn add_edge(&mut self, from: ProcessId, to: ProcessId) {
        if from == to {
            return;
        }
        self.add_waiter(from);
        if let Some(targets) = self.edges.get_mut(&from) {
            if !targets.contains(&to) {
                targets.push(to);
            }
        }
    }

    /// Source nodes, in insertion order.
    pub fn waiters(&self) -> &[ProcessId] {
        &self.waiters
    }

    /// Processes that `process` waits on. Empty for non-source nodes.
    pub fn waits_for(&self, process: ProcessId) -> &[ProcessId] {
        self.edges.get(&process).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges, grouped by source in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (ProcessId, ProcessId)> + '_ {
        self.waiters
            .iter()
            .flat_map(move |&from| self.waits_for(from).iter().map(move |&to| (from, to)))
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Returns `true` if no process is waiting.
    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Adjacency map for export.
    pub fn adjacency(&self) -> BTreeMap<ProcessId, Vec<ProcessId>> {
        self.waiters
            .iter()
            .map(|&p| (p, self.waits_for(p).to_vec()))
            .collect()
    }
}

impl Serialize for WaitForGraph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.adjacency().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waitgraph_ledger::ResourceId;

    #[test]
    fn test_idle_processes_are_not_nodes() {
        let (a, b) = (ProcessId::new(), ProcessId::new());
        let r = ResourceId::new();
        let mut ledger = AllocationLedger::new();
        ledger.grant(a, r, 1);
        let queue = RequestQueue::new();

        let graph = WaitForGraph::build([a, b], &ledger, &queue);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_edges_point_at_every_holder() {
        let (a, b, c) = (ProcessId::new(), ProcessId::new(), ProcessId::new());
        let r = ResourceId::new();
        let mut ledger = AllocationLedger::new();
        ledger.grant(b, r, 1);
        ledger.grant(c, r, 1);
        let mut queue = RequestQueue::new();
        queue.record(a, r, 2);

        let graph = WaitForGraph::build([a, b, c], &ledger, &queue);
        assert_eq!(graph.waiters(), &[a]);
        assert_eq!(graph.waits_for(a), &[b, c]);
    }

    #[test]
    fn test_waiter_holding_same_resource_has_no_self_edge() {
        let a = ProcessId::new();
        let r = ResourceId::new();
        let mut ledger = AllocationLedger::new();
        ledger.grant(a, r, 1);
        let mut queue = RequestQueue::new();
        queue.record(a, r, 5);

        let graph = WaitForGraph::build([a], &ledger, &queue);
        assert_eq!(graph.waiters(), &[a]);
        assert!(graph.waits_for(a).is_empty());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let (a, b) = (ProcessId::new(), ProcessId::new());
        let (r1, r2) = (ResourceId::new(), ResourceId::new());
        let mut ledger = AllocationLedger::new();
        ledger.grant(b, r1, 1);
        ledger.grant(b, r2, 1);
        let mut queue = RequestQueue::new();
        queue.record(a, r1, 1);
        queue.record(a, r2, 1);

        let graph = WaitForGraph::build([a, b], &ledger, &queue);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(a, b)]);
    }
}
