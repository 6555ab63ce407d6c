//! A `Simulator` behind a single async lock.
//!
//! Each method takes the lock once and performs exactly one engine
//! operation, so callers on different tasks never observe half-applied
//! bookkeeping.

use crate::{
    simulator::Simulator,
    state::{DeadlockReport, SystemState},
    Result,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use waitgraph_ledger::{Process, ProcessId, Resource, ResourceId, Units};

/// Cloneable handle to one shared [`Simulator`].
///
/// # Example
///
/// ```rust
/// use waitgraph_core::{SharedSimulator, Simulator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), waitgraph_core::SimulatorError> {
/// let shared = SharedSimulator::new(Simulator::default());
/// let p = shared.create_process("P1").await.id();
/// let r = shared.create_resource("R1", 1).await?.id();
/// assert!(shared.request(p, r, 1).await?);
/// assert!(!shared.detect().await.deadlock_detected);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SharedSimulator {
    inner: Arc<Mutex<Simulator>>,
}

impl SharedSimulator {
    /// Wraps a simulator.
    pub fn new(simulator: Simulator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulator)),
        }
    }

    /// Runs `f` with exclusive access, for multi-step reads or writes that
    /// must not interleave with other callers.
    pub async fn with<R>(&self, f: impl FnOnce(&mut Simulator) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut *guard)
    }

    /// See [`Simulator::create_process`].
    pub async fn create_process(&self, name: impl Into<String>) -> Process {
        self.inner.lock().await.create_process(name)
    }

    /// See [`Simulator::create_resource`].
    pub async fn create_resource(&self, name: impl Into<String>, total_units: Units) -> Result<Resource> {
        self.inner.lock().await.create_resource(name, total_units)
    }

    /// See [`Simulator::request`].
    pub async fn request(&self, process: ProcessId, resource: ResourceId, units: Units) -> Result<bool> {
        self.inner.lock().await.request(process, resource, units)
    }

    /// See [`Simulator::release`].
    pub async fn release(
        &self,
        process: ProcessId,
        resource: ResourceId,
        units: Option<Units>,
    ) -> Result<bool> {
        self.inner.lock().await.release(process, resource, units)
    }

    /// See [`Simulator::detect`].
    pub async fn detect(&self) -> DeadlockReport {
        self.inner.lock().await.detect()
    }

    /// See [`Simulator::state`].
    pub async fn state(&self) -> SystemState {
        self.inner.lock().await.state()
    }

    /// See [`Simulator::reset`].
    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }
}
