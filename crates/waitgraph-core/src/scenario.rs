//! # Scenarios
//!
//! Scripted sequences of engine operations, loaded from JSON or TOML.
//! Entities are referred to by name rather than id, so a scenario file can
//! be written by hand:
//!
//! ```toml
//! [[steps]]
//! op = "create_process"
//! name = "P1"
//!
//! [[steps]]
//! op = "create_resource"
//! name = "R1"
//! units = 1
//!
//! [[steps]]
//! op = "request"
//! process = "P1"
//! resource = "R1"
//!
//! [[steps]]
//! op = "detect"
//! ```
//!
//! When a name is created twice the later entity shadows the earlier one.

use crate::{
    error::SimulatorError,
    simulator::Simulator,
    state::{DeadlockReport, SystemState},
    Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use waitgraph_ledger::{ProcessId, ProcessStatus, ResourceId, Units};

/// One scripted operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Create a process.
    CreateProcess { name: String },
    /// Create a resource; `units` defaults to the configured capacity.
    CreateResource {
        name: String,
        #[serde(default)]
        units: Option<Units>,
    },
    /// Request units; `units` defaults to the configured request size.
    Request {
        process: String,
        resource: String,
        #[serde(default)]
        units: Option<Units>,
    },
    /// Release units; no `units` releases everything held.
    Release {
        process: String,
        resource: String,
        #[serde(default)]
        units: Option<Units>,
    },
    /// Run deadlock detection.
    Detect,
    /// Capture a full snapshot.
    State,
    /// Clear everything.
    Reset,
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Steps, run in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parses a JSON scenario.
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| SimulatorError::Scenario(e.to_string()))
    }

    /// Parses a TOML scenario.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| SimulatorError::Scenario(e.to_string()))
    }

    /// Loads a scenario file; `.toml` files are TOML, anything else JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&source),
            _ => Self::from_json_str(&source),
        }
    }

    /// Two processes each holding one single-unit resource and requesting
    /// the other's, followed by a detection step.
    pub fn classic_deadlock() -> Self {
        let create_process = |name: &str| Step::CreateProcess {
            name: name.to_string(),
        };
        let create_resource = |name: &str| Step::CreateResource {
            name: name.to_string(),
            units: Some(1),
        };
        let request = |process: &str, resource: &str| Step::Request {
            process: process.to_string(),
            resource: resource.to_string(),
            units: Some(1),
        };

        Self {
            name: Some("classic deadlock".to_string()),
            steps: vec![
                create_process("P1"),
                create_process("P2"),
                create_resource("R1"),
                create_resource("R2"),
                request("P1", "R1"),
                request("P2", "R2"),
                request("P1", "R2"),
                request("P2", "R1"),
                Step::Detect,
            ],
        }
    }
}

/// Result of running one [`Step`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepOutcome {
    CreateProcess {
        id: ProcessId,
        name: String,
        status: ProcessStatus,
    },
    CreateResource {
        id: ResourceId,
        name: String,
        units: Units,
    },
    Request {
        request_granted: bool,
        process_status: ProcessStatus,
    },
    Release {
        success: bool,
    },
    Detect(DeadlockReport),
    State(SystemState),
    Reset {
        message: String,
    },
}

/// Runs scenarios against a simulator, resolving names to ids.
#[derive(Debug)]
pub struct ScenarioRunner<'a> {
    simulator: &'a mut Simulator,
    processes: HashMap<String, ProcessId>,
    resources: HashMap<String, ResourceId>,
}

impl<'a> ScenarioRunner<'a> {
    /// Creates a runner. Names are only known for entities it creates.
    pub fn new(simulator: &'a mut Simulator) -> Self {
        Self {
            simulator,
            processes: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    /// Runs every step, stopping at the first error.
    pub fn run(&mut self, scenario: &Scenario) -> Result<Vec<StepOutcome>> {
        scenario
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                self.run_step(step).map_err(|e| match e {
                    SimulatorError::Scenario(msg) => {
                        SimulatorError::Scenario(format!("step {}: {}", i + 1, msg))
                    }
                    other => other,
                })
            })
            .collect()
    }

    fn process_id(&self, name: &str) -> Result<ProcessId> {
        self.processes
            .get(name)
            .copied()
            .ok_or_else(|| SimulatorError::Scenario(format!("unknown process '{name}'")))
    }

    fn resource_id(&self, name: &str) -> Result<ResourceId> {
        self.resources
            .get(name)
            .copied()
            .ok_or_else(|| SimulatorError::Scenario(format!("unknown resource '{name}'")))
    }

    /// Runs a single step.
    pub fn run_step(&mut self, step: &Step) -> Result<StepOutcome> {
        debug!(?step, "running scenario step");
        let defaults = self.simulator.config().defaults;

        let outcome = match step {
            Step::CreateProcess { name } => {
                let process = self.simulator.create_process(name.clone());
                self.processes.insert(name.clone(), process.id());
                StepOutcome::CreateProcess {
                    id: process.id(),
                    name: process.name().to_string(),
                    status: process.status(),
                }
            }
            Step::CreateResource { name, units } => {
                let units = units.unwrap_or(defaults.resource_units);
                let resource = self.simulator.create_resource(name.clone(), units)?;
                self.resources.insert(name.clone(), resource.id());
                StepOutcome::CreateResource {
                    id: resource.id(),
                    name: resource.name().to_string(),
                    units: resource.total_units(),
                }
            }
            Step::Request {
                process,
                resource,
                units,
            } => {
                let pid = self.process_id(process)?;
                let rid = self.resource_id(resource)?;
                let units = units.unwrap_or(defaults.request_units);
                let request_granted = self.simulator.request(pid, rid, units)?;
                StepOutcome::Request {
                    request_granted,
                    process_status: self.simulator.process_status(pid)?,
                }
            }
            Step::Release {
                process,
                resource,
                units,
            } => {
                let pid = self.process_id(process)?;
                let rid = self.resource_id(resource)?;
                StepOutcome::Release {
                    success: self.simulator.release(pid, rid, *units)?,
                }
            }
            Step::Detect => StepOutcome::Detect(self.simulator.detect()),
            Step::State => StepOutcome::State(self.simulator.state()),
            Step::Reset => {
                self.simulator.reset();
                self.processes.clear();
                self.resources.clear();
                StepOutcome::Reset {
                    message: "Simulator reset".to_string(),
                }
            }
        };
        Ok(outcome)
    }
}
