//! Configuration model for filelease.
//!
//! This module defines the LeaseConfig struct that represents
//! `.filelease/config.yaml`. It supports forward-compatible YAML parsing
//! (unknown fields are ignored), sensible defaults for optional fields,
//! and validation of config values.

use crate::error::{LeaseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the lease engine.
///
/// This struct represents the contents of `.filelease/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseConfig {
    /// Lease duration in minutes when the caller does not specify one.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,

    /// Upper bound on a requested lease duration. Longer requests are
    /// rejected so a single feature cannot park leases indefinitely.
    #[serde(default = "default_max_duration_minutes")]
    pub max_duration_minutes: i64,

    /// Upper bound on a single extension. Cumulative extension is not
    /// capped, but every extension is audit-logged.
    #[serde(default = "default_max_extension_minutes")]
    pub max_extension_minutes: i64,
}

// Default value functions for serde
fn default_duration_minutes() -> i64 {
    60
}
fn default_max_duration_minutes() -> i64 {
    480
}
fn default_max_extension_minutes() -> i64 {
    240
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: default_duration_minutes(),
            max_duration_minutes: default_max_duration_minutes(),
            max_extension_minutes: default_max_extension_minutes(),
        }
    }
}

impl LeaseConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward
    /// compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LeaseError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: LeaseConfig = serde_yaml::from_str(yaml)
            .map_err(|e| LeaseError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LeaseError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - all minute values must be positive
    /// - `default_duration_minutes` must not exceed `max_duration_minutes`
    pub fn validate(&self) -> Result<()> {
        if self.default_duration_minutes <= 0 {
            return Err(LeaseError::UserError(
                "config validation failed: default_duration_minutes must be greater than 0"
                    .to_string(),
            ));
        }

        if self.max_duration_minutes <= 0 {
            return Err(LeaseError::UserError(
                "config validation failed: max_duration_minutes must be greater than 0"
                    .to_string(),
            ));
        }

        if self.max_extension_minutes <= 0 {
            return Err(LeaseError::UserError(
                "config validation failed: max_extension_minutes must be greater than 0"
                    .to_string(),
            ));
        }

        if self.default_duration_minutes > self.max_duration_minutes {
            return Err(LeaseError::UserError(format!(
                "config validation failed: default_duration_minutes ({}) exceeds max_duration_minutes ({})",
                self.default_duration_minutes, self.max_duration_minutes
            )));
        }

        Ok(())
    }
}
