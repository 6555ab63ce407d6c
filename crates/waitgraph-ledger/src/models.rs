//! # Core Data Models
//!
//! Identities and entity records shared by every waitgraph crate.
//!
//! Processes and resources are identified by random v4 UUIDs wrapped in
//! distinct newtypes, so a process id can never be passed where a resource
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A count of resource units.
pub type Units = u32;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identity.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

entity_id!(
    /// Unique identity of a process.
    ProcessId
);

entity_id!(
    /// Unique identity of a resource.
    ResourceId
);

/// Scheduling status of a process.
///
/// `Blocked` means the process issued a request that could not be satisfied
/// immediately and has not been granted since. `Terminated` is part of the
/// interface but no operation currently produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// No unsatisfied request is outstanding.
    #[default]
    Active,
    /// Waiting on at least one request.
    Blocked,
    /// Reserved for lifecycle management.
    Terminated,
}

impl ProcessStatus {
    /// Lower-case name, as used in snapshots.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A process competing for resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    id: ProcessId,
    name: String,
    status: ProcessStatus,
}

impl Process {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProcessId::new(),
            name: name.into(),
            status: ProcessStatus::Active,
        }
    }

    /// Returns the process identity.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current status.
    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ProcessStatus) {
        self.status = status;
    }
}

/// A shared resource with a fixed number of units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    id: ResourceId,
    name: String,
    total_units: Units,
}

impl Resource {
    pub(crate) fn new(name: impl Into<String>, total_units: Units) -> Self {
        Self {
            id: ResourceId::new(),
            name: name.into(),
            total_units,
        }
    }

    /// Returns the resource identity.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the capacity fixed at creation.
    pub fn total_units(&self) -> Units {
        self.total_units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ProcessId::new(), ProcessId::new());
        assert_ne!(ResourceId::new(), ResourceId::new());
    }

    #[test]
    fn test_id_parse_roundtrip() {
        let id = ProcessId::new();
        let parsed: ProcessId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ResourceId>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ProcessStatus::Blocked).unwrap();
        assert_eq!(json, "\"blocked\"");
        assert_eq!(ProcessStatus::Terminated.to_string(), "terminated");
    }

    #[test]
    fn test_new_process_is_active() {
        let process = Process::new("P1");
        assert_eq!(process.status(), ProcessStatus::Active);
        assert_eq!(process.name(), "P1");
    }
}
