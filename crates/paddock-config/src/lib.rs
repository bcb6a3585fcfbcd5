//! Configuration management for Paddock
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (PADDOCK_* prefix, highest precedence)
//! 2. paddock.local.toml (gitignored, local overrides)
//! 3. paddock.toml (git-tracked, project config)
//! 4. ~/.config/paddock/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Paddock configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddockConfig {
    pub guard: GuardConfig,
    pub audit: AuditConfig,
}

/// Settings for the "authorization performed" check around request handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// When false, handlers that never authorize are let through.
    pub enforce: bool,
    /// If non-empty, only these endpoints are checked.
    pub only: Vec<String>,
    /// Endpoints never checked.
    pub except: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enforce: true,
            only: Vec::new(),
            except: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Log declarations and authorization outcomes.
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PaddockConfig {
    /// Parse a single TOML file, without merging any other source
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration for test suites: checks on, logging off
    pub fn testing() -> Self {
        Self {
            audit: AuditConfig { enabled: false },
            ..Default::default()
        }
    }

    /// Reject settings that contradict each other
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = self
            .guard
            .only
            .iter()
            .find(|endpoint| self.guard.except.contains(endpoint))
        {
            return Err(ConfigError::ValidationError(format!(
                "endpoint '{endpoint}' is listed in both guard.only and guard.except"
            )));
        }

        if let Some(endpoint) = self
            .guard
            .only
            .iter()
            .chain(&self.guard.except)
            .find(|endpoint| endpoint.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(format!(
                "guard endpoint names must not be blank, got {endpoint:?}"
            )));
        }

        Ok(())
    }
}
