//! # Waitgraph Ledger
//!
//! Bookkeeping for processes competing over multi-unit resources.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`EntityStore`] | Process and resource records, in creation order |
//! | [`AllocationLedger`] | Granted units per (process, resource) |
//! | [`RequestQueue`] | Pending units per (process, resource), in request order |
//! | [`UnitTable`] | Single insertion-ordered table behind both relations |
//!
//! Each relation is stored exactly once. The per-resource view, the
//! per-process view and the global nested map are projections of that one
//! table:
//!
//! ```text
//!                 ┌──────────────┐
//!                 │  UnitTable   │
//!                 └──────┬───────┘
//!        ┌───────────────┼───────────────┐
//!        ▼               ▼               ▼
//!  resource_view    process_view      nested()
//!  (p → units)      (r → units)    (p → r → units)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use waitgraph_ledger::{AllocationLedger, EntityStore, RequestQueue};
//!
//! let mut store = EntityStore::new();
//! let p = store.create_process("P1").id();
//! let r = store.create_resource("disk", 1)?.id();
//!
//! let mut ledger = AllocationLedger::new();
//! let mut queue = RequestQueue::new();
//!
//! queue.record(p, r, 1);
//! ledger.grant(p, r, 1);
//! queue.withdraw(p, r);
//!
//! assert_eq!(ledger.held(p, r), 1);
//! assert!(!queue.is_waiting(p));
//! # Ok::<(), waitgraph_ledger::LedgerError>(())
//! ```

mod error;
mod ledger;
mod models;
mod queue;
mod store;
mod table;

pub use error::{LedgerError, Result};
pub use ledger::{AllocationLedger, Released};
pub use models::{Process, ProcessId, ProcessStatus, Resource, ResourceId, Units};
pub use queue::RequestQueue;
pub use store::EntityStore;
pub use table::{Entry, UnitMap, UnitTable};
