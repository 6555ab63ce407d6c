//! # Waitgraph Core
//!
//! Resource allocation and deadlock detection engine. Processes request and
//! release units of shared, finite resources; the engine grants what it can,
//! queues the rest, and reports which processes are deadlocked.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Simulator                          │
//! │                                                         │
//! │   create_* ─► EntityStore                               │
//! │   request  ─► RequestQueue ──grant──► AllocationLedger  │
//! │   release  ─► AllocationLedger ──scan──► RequestQueue   │
//! │   detect   ─► WaitForGraph ─► DeadlockDetector          │
//! │   state    ─► SystemState (pure projection)             │
//! └─────────────────────────────────────────────────────────┘
//!            │ create_process
//!            ▼
//!       EventSink (fire-and-forget analytics)
//! ```
//!
//! ## Grant policy
//!
//! A release triggers one scan of that resource's waiters in the order
//! they first asked. Every waiter whose request fits in the remaining free
//! units is granted in full; larger requests are skipped, not waited for.
//! This is best-fit-by-scan-order, and a large request can starve behind a
//! stream of smaller ones.
//!
//! ## Usage
//!
//! ```rust
//! use waitgraph_core::{Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::default())?;
//! let a = sim.create_process("A").id();
//! let b = sim.create_process("B").id();
//! let disk = sim.create_resource("disk", 1)?.id();
//!
//! assert!(sim.request(a, disk, 1)?);
//! assert!(!sim.request(b, disk, 1)?);   // b is now blocked
//! assert!(sim.release(a, disk, None)?); // scan grants b
//!
//! assert_eq!(sim.process(b)?.allocated[&disk], 1);
//! assert!(!sim.detect().deadlock_detected);
//! # Ok::<(), waitgraph_core::SimulatorError>(())
//! ```
//!
//! ## Concurrency
//!
//! [`Simulator`] is single-owner. [`SharedSimulator`] puts it behind one
//! async mutex so each operation runs to completion before the next.

mod analytics;
mod config;
mod error;
mod scenario;
mod shared;
mod simulator;
mod state;

pub use analytics::{
    AnalyticsEvent, ChannelSink, EventSink, NoopSink, SinkError, TracingSink, CREATE_PROCESS_EVENT,
};
pub use config::{AnalyticsConfig, DefaultsConfig, SimulatorConfig};
pub use error::{ErrorKind, SimulatorError};
pub use scenario::{Scenario, ScenarioRunner, Step, StepOutcome};
pub use shared::SharedSimulator;
pub use simulator::Simulator;
pub use state::{DeadlockReport, ProcessRef, ProcessView, ResourceView, SystemState};

// Re-export component types for convenience
pub use waitgraph_detector::{DeadlockDetector, WaitForGraph};
pub use waitgraph_ledger::{
    LedgerError, Process, ProcessId, ProcessStatus, Resource, ResourceId, UnitMap, Units,
};

/// Core result type for engine operations.
pub type Result<T> = std::result::Result<T, SimulatorError>;
