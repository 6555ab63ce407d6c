//! The `Simulator` facade.
//!
//! Owns the entity store, allocation ledger and request queue, and
//! implements the request/release/grant protocol on top of them. Deadlock
//! detection is a pure read over the same state.

use crate::{
    analytics::{AnalyticsEvent, EventSink, NoopSink, CREATE_PROCESS_EVENT},
    config::SimulatorConfig,
    state::{DeadlockReport, ProcessRef, ProcessView, ResourceView, SystemState},
    Result,
};

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use waitgraph_detector::{DeadlockDetector, WaitForGraph};
use waitgraph_ledger::{
    AllocationLedger, EntityStore, LedgerError, Process, ProcessId, ProcessStatus, RequestQueue,
    Resource, ResourceId, Units,
};

/// Resource allocation engine with deadlock detection.
///
/// Every method runs to completion before returning and nothing blocks
/// waiting for capacity: a request that cannot be met is recorded as
/// pending and reported as not granted. The simulator is not internally
/// synchronized; wrap it in a [`SharedSimulator`](crate::SharedSimulator)
/// to share it between tasks.
///
/// # Example
///
/// ```rust
/// use waitgraph_core::Simulator;
///
/// let mut sim = Simulator::default();
/// let p1 = sim.create_process("P1").id();
/// let p2 = sim.create_process("P2").id();
/// let r1 = sim.create_resource("R1", 1)?.id();
/// let r2 = sim.create_resource("R2", 1)?.id();
///
/// assert!(sim.request(p1, r1, 1)?);
/// assert!(sim.request(p2, r2, 1)?);
/// assert!(!sim.request(p1, r2, 1)?);
/// assert!(!sim.request(p2, r1, 1)?);
///
/// let report = sim.detect();
/// assert!(report.deadlock_detected);
/// assert_eq!(report.deadlocked_processes.len(), 2);
/// # Ok::<(), waitgraph_core::SimulatorError>(())
/// ```
pub struct Simulator {
    /// Configuration.
    config: SimulatorConfig,

    /// Processes and resources.
    store: EntityStore,

    /// Granted units.
    ledger: AllocationLedger,

    /// Pending requests.
    queue: RequestQueue,

    /// Cycle search over the wait-for graph.
    detector: DeadlockDetector,

    /// Destination for process-creation notifications.
    sink: Arc<dyn EventSink>,
}

impl Simulator {
    /// Creates a simulator with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, Arc::new(NoopSink)))
    }

    fn from_parts(config: SimulatorConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            store: EntityStore::new(),
            ledger: AllocationLedger::new(),
            queue: RequestQueue::new(),
            detector: DeadlockDetector::new(),
            sink,
        }
    }

    /// Replaces the analytics sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    /// Registers a new active process.
    pub fn create_process(&mut self, name: impl Into<String>) -> Process {
        let process = self.store.create_process(name).clone();
        info!(process_id = %process.id(), name = process.name(), "process created");
        self.notify_process_created(&process);
        process
    }

    /// Registers a new resource.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `total_units` is zero.
    pub fn create_resource(&mut self, name: impl Into<String>, total_units: Units) -> Result<Resource> {
        let resource = self.store.create_resource(name, total_units)?.clone();
        info!(
            resource_id = %resource.id(),
            name = resource.name(),
            units = total_units,
            "resource created"
        );
        Ok(resource)
    }

    fn notify_process_created(&self, process: &Process) {
        let analytics = &self.config.analytics;
        if !analytics.enabled {
            return;
        }
        let event = AnalyticsEvent {
            user_id: analytics.user_id.clone(),
            lab_type: analytics.lab_type.clone(),
            event_type: CREATE_PROCESS_EVENT.to_string(),
            event_data: serde_json::json!({
                "process_id": process.id(),
                "process_name": process.name(),
            }),
        };
        if let Err(e) = self.sink.emit(event) {
            warn!(process_id = %process.id(), error = %e, "failed to send analytics event");
        }
    }

    // ------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------

    fn available(&self, resource: ResourceId, total_units: Units) -> u64 {
        u64::from(total_units).saturating_sub(self.ledger.allocated_units(resource))
    }

    /// Asks for `units` of a resource. Returns whether it was granted now.
    ///
    /// The request is recorded first; if enough units are free it is
    /// granted in full and the pending entry cleared. Otherwise the process
    /// becomes `Blocked` and the request stays queued. An immediate grant
    /// leaves the status alone, so a process blocked elsewhere stays blocked.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `InvalidArgument` for zero units. State
    /// is untouched on error. A zero-unit request is an error, not a no-op
    /// grant: callers that expect `Ok(true)` for zero units must skip the call.
    pub fn request(&mut self, process: ProcessId, resource: ResourceId, units: Units) -> Result<bool> {
        self.store.process(process)?;
        let total_units = self.store.resource(resource)?.total_units();
        if units == 0 {
            return Err(
                LedgerError::InvalidArgument("requested units must be at least 1".to_string()).into(),
            );
        }

        let available = self.available(resource, total_units);
        self.queue.record(process, resource, units);

        if available >= u64::from(units) {
            self.ledger.grant(process, resource, units);
            self.queue.withdraw(process, resource);
            debug!(%process, %resource, units, "request granted");
            Ok(true)
        } else {
            self.store.set_status(process, ProcessStatus::Blocked)?;
            debug!(%process, %resource, units, available, "request blocked");
            Ok(false)
        }
    }

    /// Returns units of a resource, then tries to satisfy its waiters.
    ///
    /// `None`, or a count at least the current holding, releases everything.
    /// Returns `false` without side effects if nothing is held.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn release(
        &mut self,
        process: ProcessId,
        resource: ResourceId,
        units: Option<Units>,
    ) -> Result<bool> {
        self.store.process(process)?;
        self.store.resource(resource)?;

        let Some(released) = self.ledger.release(process, resource, units) else {
            debug!(%process, %resource, "nothing to release");
            return Ok(false);
        };
        debug!(%process, %resource, units = released.units(), "units released");

        let granted = self.satisfy_waiting(resource)?;
        if !granted.is_empty() {
            debug!(%resource, granted = granted.len(), "waiting requests granted");
        }
        Ok(true)
    }

    /// Grants every pending request on `resource` that fits, in request order.
    ///
    /// Oversized requests are skipped rather than waited for, so a large
    /// request can be overtaken indefinitely by smaller ones behind it.
    fn satisfy_waiting(&mut self, resource: ResourceId) -> Result<Vec<ProcessId>> {
        let total_units = self.store.resource(resource)?.total_units();
        let mut available = self.available(resource, total_units);
        if available == 0 {
            return Ok(Vec::new());
        }

        let waiting: Vec<(ProcessId, Units)> = self.queue.waiting_on(resource).collect();
        let mut granted = Vec::new();

        for (process, units) in waiting {
            if u64::from(units) > available {
                continue;
            }
            self.ledger.grant(process, resource, units);
            self.queue.withdraw(process, resource);
            self.store.set_status(process, ProcessStatus::Active)?;
            available -= u64::from(units);
            granted.push(process);

            if available == 0 {
                break;
            }
        }

        Ok(granted)
    }

    // ------------------------------------------------------------------
    // Detection
    // ------------------------------------------------------------------

    /// Builds the current wait-for graph.
    pub fn wait_for_graph(&self) -> WaitForGraph {
        WaitForGraph::build(self.store.process_ids(), &self.ledger, &self.queue)
    }

    /// Reports processes in, or waiting on, a circular wait.
    pub fn detect(&self) -> DeadlockReport {
        let graph = self.wait_for_graph();
        let deadlocked: Vec<ProcessRef> = self
            .detector
            .detect(&graph)
            .into_iter()
            .filter_map(|id| self.store.process(id).ok())
            .map(ProcessRef::from)
            .collect();

        if !deadlocked.is_empty() {
            info!(count = deadlocked.len(), "deadlock detected");
        }
        DeadlockReport::new(deadlocked)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    fn process_view(&self, process: &Process) -> ProcessView {
        ProcessView {
            id: process.id(),
            name: process.name().to_string(),
            status: process.status(),
            allocated: self.ledger.process_view(process.id()),
            requested: self.queue.process_view(process.id()),
        }
    }

    fn resource_view(&self, resource: &Resource) -> ResourceView {
        ResourceView {
            id: resource.id(),
            name: resource.name().to_string(),
            units: resource.total_units(),
            allocated: self.ledger.resource_view(resource.id()),
            requested: self.queue.resource_view(resource.id()),
        }
    }

    /// Looks up one process.
    pub fn process(&self, id: ProcessId) -> Result<ProcessView> {
        Ok(self.process_view(self.store.process(id)?))
    }

    /// Looks up one resource.
    pub fn resource(&self, id: ResourceId) -> Result<ResourceView> {
        Ok(self.resource_view(self.store.resource(id)?))
    }

    /// Current status of a process.
    pub fn process_status(&self, id: ProcessId) -> Result<ProcessStatus> {
        Ok(self.store.process(id)?.status())
    }

    /// Units of a resource not granted to anyone.
    pub fn available_units(&self, id: ResourceId) -> Result<u64> {
        let total_units = self.store.resource(id)?.total_units();
        Ok(self.available(id, total_units))
    }

    /// All processes, in creation order.
    pub fn processes(&self) -> Vec<ProcessView> {
        self.store
            .processes()
            .iter()
            .map(|p| self.process_view(p))
            .collect()
    }

    /// All resources, in creation order.
    pub fn resources(&self) -> Vec<ResourceView> {
        self.store
            .resources()
            .iter()
            .map(|r| self.resource_view(r))
            .collect()
    }

    /// Full snapshot of processes, resources and both graphs.
    pub fn state(&self) -> SystemState {
        SystemState {
            processes: self.processes(),
            resources: self.resources(),
            allocation_graph: self.ledger.graph(self.store.process_ids()),
            request_graph: self.queue.graph(self.store.process_ids()),
        }
    }

    /// Clears every entity, allocation and request.
    pub fn reset(&mut self) {
        self.store.clear();
        self.ledger.clear();
        self.queue.clear();
        info!("simulator reset");
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::from_parts(SimulatorConfig::default(), Arc::new(NoopSink))
    }
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("processes", &self.store.processes().len())
            .field("resources", &self.store.resources().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{ChannelSink, SinkError};
    use crate::error::ErrorKind;

    struct FailingSink;

    impl EventSink for FailingSink {
        fn emit(&self, _event: AnalyticsEvent) -> std::result::Result<(), SinkError> {
            Err(SinkError::Rejected("unreachable".to_string()))
        }
    }

    #[test]
    fn test_immediate_grant() {
        let mut sim = Simulator::default();
        let p = sim.create_process("P").id();
        let r = sim.create_resource("R", 3).unwrap().id();

        assert!(sim.request(p, r, 2).unwrap());
        assert_eq!(sim.available_units(r).unwrap(), 1);
        assert!(sim.process(p).unwrap().requested.is_empty());
        assert_eq!(sim.process_status(p).unwrap(), ProcessStatus::Active);
    }

    #[test]
    fn test_blocked_request_stays_pending() {
        let mut sim = Simulator::default();
        let (a, b) = (sim.create_process("A").id(), sim.create_process("B").id());
        let r = sim.create_resource("R", 1).unwrap().id();

        assert!(sim.request(a, r, 1).unwrap());
        assert!(!sim.request(b, r, 1).unwrap());
        assert_eq!(sim.process_status(b).unwrap(), ProcessStatus::Blocked);
        assert_eq!(sim.resource(r).unwrap().requested[&b], 1);
    }

    #[test]
    fn test_immediate_grant_keeps_blocked_status() {
        let mut sim = Simulator::default();
        let (a, b) = (sim.create_process("A").id(), sim.create_process("B").id());
        let r1 = sim.create_resource("R1", 1).unwrap().id();
        let r2 = sim.create_resource("R2", 1).unwrap().id();

        sim.request(a, r1, 1).unwrap();
        assert!(!sim.request(b, r1, 1).unwrap());
        assert!(sim.request(b, r2, 1).unwrap());
        assert_eq!(sim.process_status(b).unwrap(), ProcessStatus::Blocked);
    }

    #[test]
    fn test_request_validation_leaves_state_untouched() {
        let mut sim = Simulator::default();
        let p = sim.create_process("P").id();
        let r = sim.create_resource("R", 1).unwrap().id();
        let before = sim.state();

        let err = sim.request(ProcessId::new(), r, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = sim.request(p, ResourceId::new(), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = sim.request(p, r, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(sim.state(), before);
    }

    #[test]
    fn test_release_nothing_held_is_noop() {
        let mut sim = Simulator::default();
        let p = sim.create_process("P").id();
        let r = sim.create_resource("R", 1).unwrap().id();
        assert!(!sim.release(p, r, None).unwrap());
        assert_eq!(
            sim.release(ProcessId::new(), r, None).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_partial_release() {
        let mut sim = Simulator::default();
        let p = sim.create_process("P").id();
        let r = sim.create_resource("R", 4).unwrap().id();
        sim.request(p, r, 4).unwrap();

        assert!(sim.release(p, r, Some(1)).unwrap());
        assert_eq!(sim.process(p).unwrap().allocated[&r], 3);
        assert!(sim.release(p, r, Some(10)).unwrap());
        assert!(sim.process(p).unwrap().allocated.is_empty());
    }

    #[test]
    fn test_scan_skips_oversized_request() {
        let mut sim = Simulator::default();
        let holder = sim.create_process("holder").id();
        let big = sim.create_process("big").id();
        let small = sim.create_process("small").id();
        let r = sim.create_resource("R", 2).unwrap().id();

        sim.request(holder, r, 2).unwrap();
        assert!(!sim.request(big, r, 2).unwrap());
        assert!(!sim.request(small, r, 1).unwrap());

        sim.release(holder, r, Some(1)).unwrap();
        assert_eq!(sim.process_status(big).unwrap(), ProcessStatus::Blocked);
        assert_eq!(sim.process_status(small).unwrap(), ProcessStatus::Active);
        assert_eq!(sim.process(small).unwrap().allocated[&r], 1);
        assert_eq!(sim.process(big).unwrap().requested[&r], 2);
    }

    #[test]
    fn test_analytics_event_on_process_creation() {
        let (sink, mut rx) = ChannelSink::bounded(4);
        let mut sim = Simulator::default().with_sink(Arc::new(sink));
        let p = sim.create_process("P1");
        sim.create_resource("R", 1).unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type, "create_process");
        assert_eq!(event.lab_type, "deadlock-sim");
        assert_eq!(event.event_data["process_name"], "P1");
        assert_eq!(event.event_data["process_id"], p.id().to_string());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_analytics_disabled() {
        let (sink, mut rx) = ChannelSink::bounded(4);
        let config = SimulatorConfig::new().with_analytics(false);
        let mut sim = Simulator::new(config).unwrap().with_sink(Arc::new(sink));
        sim.create_process("P1");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let mut sim = Simulator::default().with_sink(Arc::new(FailingSink));
        let p = sim.create_process("P1");
        assert_eq!(sim.process(p.id()).unwrap().name, "P1");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulatorConfig::new().with_default_request_units(0);
        assert_eq!(Simulator::new(config).unwrap_err().kind(), ErrorKind::Config);
    }
}
