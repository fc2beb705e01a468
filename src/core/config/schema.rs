//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$GHAT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/ghat/config.toml`
//! 3. `~/.ghat/config.toml`
//!
//! # Repo Config
//!
//! Located at `.github/ghat.toml`.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::source::Host;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// default_host = "gitlab"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Host assumed when a source string names none
    pub default_host: Option<String>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_host(self.default_host.as_deref())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// default_host = "github"
/// workflows_dir = ".github/workflows"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Host assumed when a source string names none
    pub default_host: Option<String>,

    /// Where generated workflows are written, relative to the repository root
    pub workflows_dir: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_host(self.default_host.as_deref())?;

        if let Some(dir) = &self.workflows_dir {
            let path = Path::new(dir);
            if dir.is_empty()
                || path
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
            {
                return Err(ConfigError::InvalidValue(format!(
                    "workflows_dir '{}' must be a relative path inside the repository",
                    dir
                )));
            }
        }

        Ok(())
    }
}

fn validate_host(host: Option<&str>) -> Result<(), ConfigError> {
    if let Some(host) = host {
        if Host::parse(host).is_none() {
            let names: Vec<&str> = Host::all().iter().map(Host::name).collect();
            return Err(ConfigError::InvalidValue(format!(
                "invalid host '{}', must be one of: {}",
                host,
                names.join(", ")
            )));
        }
    }
    Ok(())
}
