//! # Deadlock Detector
//!
//! Builds a wait-for graph from the allocation ledger and request queue and
//! finds deadlocked processes with a three-state depth-first search.
//!
//! ## Semantics
//!
//! - Source nodes are processes with at least one pending request.
//! - `p → h` for every process `h ≠ p` holding units of a resource `p`
//!   waits on.
//! - A back edge marks a cycle. Every process on the search path that led
//!   to it is reported, so wait-chain members count as deadlocked even when
//!   they are not on the cycle.
//!
//! ## Example
//!
//! ```rust
//! use waitgraph_detector::{DeadlockDetector, WaitForGraph};
//! use waitgraph_ledger::{AllocationLedger, EntityStore, RequestQueue};
//!
//! let mut store = EntityStore::new();
//! let p1 = store.create_process("P1").id();
//! let p2 = store.create_process("P2").id();
//! let r1 = store.create_resource("R1", 1)?.id();
//! let r2 = store.create_resource("R2", 1)?.id();
//!
//! let mut ledger = AllocationLedger::new();
//! let mut queue = RequestQueue::new();
//! ledger.grant(p1, r1, 1);
//! ledger.grant(p2, r2, 1);
//! queue.record(p1, r2, 1);
//! queue.record(p2, r1, 1);
//!
//! let graph = WaitForGraph::build(store.process_ids(), &ledger, &queue);
//! assert_eq!(DeadlockDetector::new().detect(&graph), vec![p1, p2]);
//! # Ok::<(), waitgraph_ledger::LedgerError>(())
//! ```
//!
//! ## References
//!
//! - Tarjan, R. E. (1972). "Depth-first search and linear graph algorithms"
//! - Coffman, E. G., Elphick, M., Shoshani, A. (1971). "System Deadlocks"

mod detector;
mod graph;

pub use detector::DeadlockDetector;
pub use graph::WaitForGraph;
