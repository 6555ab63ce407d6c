//! Deadlock detection over a [`WaitForGraph`].
//!
//! Depth-first search with three node states. An edge into a node that is
//! still on the current path closes a cycle; that node's caller and every
//! ancestor on the path are then reported, and the search unwinds without
//! exploring their remaining edges.

use crate::graph::WaitForGraph;
use std::collections::{HashMap, HashSet};
use tracing::trace;
use waitgraph_ledger::ProcessId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path, or on a path that reached a cycle.
    OnPath,
    /// Fully explored without reaching a cycle.
    Explored,
}

/// Reports processes stuck in, or waiting on, a circular wait.
///
/// A process is deadlocked if its wait chain reaches a cycle, not only if
/// it sits on the cycle itself: a process waiting on a deadlocked process is
/// deadlocked too.
///
/// # Example
///
/// ```rust
/// use waitgraph_detector::{DeadlockDetector, WaitForGraph};
/// use waitgraph_ledger::ProcessId;
///
/// let (p1, p2, p3) = (ProcessId::new(), ProcessId::new(), ProcessId::new());
/// let mut graph = WaitForGraph::new();
/// graph.add_edge(p1, p2);
/// graph.add_edge(p2, p1);
/// graph.add_edge(p3, p1);
///
/// let deadlocked = DeadlockDetector::new().detect(&graph);
/// assert_eq!(deadlocked, vec![p1, p2, p3]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DeadlockDetector;

impl DeadlockDetector {
    /// Creates a detector.
    pub fn new() -> Self {
        Self
    }

    /// Returns the deadlocked processes, in the graph's source-node order.
    ///
    /// The search keeps its path on a heap-allocated stack of
    /// `(node, next edge)` frames, so chain length is bounded by memory and
    /// not by the thread stack.
    pub fn detect(&self, graph: &WaitForGraph) -> Vec<ProcessId> {
        let mut marks: HashMap<ProcessId, Mark> = HashMap::new();
        let mut deadlocked: HashSet<ProcessId> = HashSet::new();
        let mut stack: Vec<(ProcessId, usize)> = Vec::new();

        for &start in graph.waiters() {
            if marks.contains_key(&start) {
                continue;
            }
            marks.insert(start, Mark::OnPath);
            stack.push((start, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, edge) = *frame;
                let Some(&next) = graph.waits_for(node).get(edge) else {
                    marks.insert(node, Mark::Explored);
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                match marks.get(&next) {
                    None => {
                        marks.insert(next, Mark::OnPath);
                        stack.push((next, 0));
                    }
                    Some(Mark::OnPath) => {
                        trace!(from = %node, to = %next, "back edge in wait-for graph");
                        // Frames unwound here keep OnPath, so later searches
                        // that reach them also report a cycle.
                        deadlocked.extend(stack.drain(..).map(|(p, _)| p));
                    }
                    Some(Mark::Explored) => {}
                }
            }
        }

        graph
            .waiters()
            .iter()
            .copied()
            .filter(|p| deadlocked.contains(p))
            .collect()
    }

    /// Returns `true` if any process is deadlocked.
    pub fn has_deadlock(&self, graph: &WaitForGraph) -> bool {
        !self.detect(graph).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<const N: usize>() -> [ProcessId; N] {
        std::array::from_fn(|_| ProcessId::new())
    }

    #[test]
    fn test_empty_graph() {
        let graph = WaitForGraph::new();
        assert!(DeadlockDetector::new().detect(&graph).is_empty());
    }

    #[test]
    fn test_chain_without_cycle() {
        let [a, b, c] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(b, c);

        assert!(!DeadlockDetector::new().has_deadlock(&graph));
    }

    #[test]
    fn test_two_cycle() {
        let [a, b] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(b, a);

        assert_eq!(DeadlockDetector::new().detect(&graph), vec![a, b]);
    }

    #[test]
    fn test_three_cycle() {
        let [a, b, c] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        graph.add_edge(c, a);

        assert_eq!(DeadlockDetector::new().detect(&graph), vec![a, b, c]);
    }

    #[test]
    fn test_waiter_searched_after_cycle_is_reported() {
        let [a, b, c] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(c, a);

        assert_eq!(DeadlockDetector::new().detect(&graph), vec![a, b, c]);
    }

    #[test]
    fn test_waiter_searched_before_cycle_is_reported() {
        let [tail, a, b] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(tail, a);
        graph.add_edge(a, b);
        graph.add_edge(b, a);

        assert_eq!(DeadlockDetector::new().detect(&graph), vec![tail, a, b]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let [a, b, c, d] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(a, c);
        graph.add_edge(b, d);
        graph.add_edge(c, d);

        assert!(DeadlockDetector::new().detect(&graph).is_empty());
    }

    #[test]
    fn test_long_chain_without_cycle() {
        let chain: Vec<ProcessId> = (0..20_000).map(|_| ProcessId::new()).collect();
        let mut graph = WaitForGraph::new();
        for pair in chain.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }

        assert!(DeadlockDetector::new().detect(&graph).is_empty());
    }

    #[test]
    fn test_long_chain_into_cycle_reports_every_member() {
        let chain: Vec<ProcessId> = (0..20_000).map(|_| ProcessId::new()).collect();
        let mut graph = WaitForGraph::new();
        for pair in chain.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        let n = chain.len();
        graph.add_edge(chain[n - 1], chain[n - 2]);

        assert_eq!(DeadlockDetector::new().detect(&graph), chain);
    }

    #[test]
    fn test_branch_explored_before_back_edge() {
        let [a, dead_end, b] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(a, dead_end);
        graph.add_edge(a, b);
        graph.add_edge(b, a);

        assert_eq!(DeadlockDetector::new().detect(&graph), vec![a, b]);
    }

    #[test]
    fn test_independent_branch_not_reported() {
        let [a, b, idle_waiter, holder] = ids();
        let mut graph = WaitForGraph::new();
        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(idle_waiter, holder);

        assert_eq!(DeadlockDetector::new().detect(&graph), vec![a, b]);
    }
}
