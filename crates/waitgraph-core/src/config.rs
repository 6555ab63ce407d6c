//! Configuration types for the waitgraph engine.

use crate::{error::SimulatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use waitgraph_ledger::Units;

/// Configuration for the [`Simulator`](crate::Simulator).
///
/// # Example
///
/// ```rust
/// use waitgraph_core::SimulatorConfig;
///
/// let config = SimulatorConfig::new()
///     .with_analytics(false)
///     .with_default_resource_units(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Analytics notification settings.
    pub analytics: AnalyticsConfig,

    /// Defaults applied when a caller omits a unit count.
    pub defaults: DefaultsConfig,
}

/// Analytics notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Emit a notification on process creation.
    pub enabled: bool,

    /// User the events are attributed to.
    pub user_id: String,

    /// Lab identifier attached to every event.
    pub lab_type: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_id: "user1".to_string(),
            lab_type: "deadlock-sim".to_string(),
        }
    }
}

/// Unit counts used when a request or resource omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Units asked for by a request without an explicit count.
    pub request_units: Units,

    /// Capacity of a resource created without an explicit count.
    pub resource_units: Units,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            request_units: 1,
            resource_units: 1,
        }
    }
}

impl SimulatorConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables analytics notifications.
    #[must_use]
    pub fn with_analytics(mut self, enabled: bool) -> Self {
        self.analytics.enabled = enabled;
        self
    }

    /// Sets the user id attached to analytics events.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.analytics.user_id = user_id.into();
        self
    }

    /// Sets the default request size.
    #[must_use]
    pub fn with_default_request_units(mut self, units: Units) -> Self {
        self.defaults.request_units = units;
        self
    }

    /// Sets the default resource capacity.
    #[must_use]
    pub fn with_default_resource_units(mut self, units: Units) -> Self {
        self.defaults.resource_units = units;
        self
    }

    /// Parses a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| SimulatorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.defaults.request_units == 0 {
            return Err(SimulatorError::Config(
                "defaults.request_units must be at least 1".to_string(),
            ));
        }
        if self.defaults.resource_units == 0 {
            return Err(SimulatorError::Config(
                "defaults.resource_units must be at least 1".to_string(),
            ));
        }
        if self.analytics.enabled && self.analytics.lab_type.trim().is_empty() {
            return Err(SimulatorError::Config(
                "analytics.lab_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulatorConfig::default();
        assert!(config.analytics.enabled);
        assert_eq!(config.analytics.user_id, "user1");
        assert_eq!(config.analytics.lab_type, "deadlock-sim");
        assert_eq!(config.defaults.request_units, 1);
        assert_eq!(config.defaults.resource_units, 1);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimulatorConfig::from_toml_str(
            r#"
            [defaults]
            resource_units = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.defaults.resource_units, 3);
        assert_eq!(config.defaults.request_units, 1);
        assert!(config.analytics.enabled);
    }

    #[test]
    fn test_zero_default_rejected() {
        let err = SimulatorConfig::from_toml_str("[defaults]\nrequest_units = 0\n").unwrap_err();
        assert!(err.to_string().contains("request_units"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(SimulatorConfig::from_toml_str("analytics = [").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = SimulatorConfig::new().with_user_id("alice");
        let text = toml::to_string(&config).unwrap();
        let parsed = SimulatorConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
