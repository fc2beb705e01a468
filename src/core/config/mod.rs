//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! ghat has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GHAT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/ghat/config.toml`
//! 3. `~/.ghat/config.toml`
//!
//! # Repo Config Location
//!
//! `.github/ghat.toml` under the repository root.
//!
//! # Example
//!
//! ```no_run
//! use ghat::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("/path/to/repo")).unwrap();
//! println!("Default host: {}", config.default_host());
//! println!("Workflows: {}", config.workflows_dir().display());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::source::Host;

/// Directory generated workflows are written to unless configured otherwise.
pub const DEFAULT_WORKFLOWS_DIR: &str = ".github/workflows";

/// Repo config location, relative to the repository root.
pub const REPO_CONFIG_PATH: &str = ".github/ghat.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules: repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if present)
    pub repo: Option<RepoConfig>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(repo_root: &Path) -> Result<Self, ConfigError> {
        Self::load_from(Self::global_config_path().as_deref(), repo_root)
    }

    /// Load configuration with an explicit global config path.
    pub fn load_from(global_path: Option<&Path>, repo_root: &Path) -> Result<Self, ConfigError> {
        let global: GlobalConfig = match global_path {
            Some(path) => read_optional(path)?.unwrap_or_default(),
            None => GlobalConfig::default(),
        };
        let repo: Option<RepoConfig> = read_optional(&repo_root.join(REPO_CONFIG_PATH))?;

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config { global, repo })
    }

    /// First existing global config location, if any.
    pub fn global_config_path() -> Option<PathBuf> {
        // 1. Check $GHAT_CONFIG
        if let Ok(path) = std::env::var("GHAT_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/ghat/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("ghat/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.ghat/config.toml
        dirs::home_dir()
            .map(|home| home.join(".ghat/config.toml"))
            .filter(|path| path.exists())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Host used for source strings that name none.
    ///
    /// Defaults to GitHub if not configured.
    pub fn default_host(&self) -> Host {
        self.repo
            .as_ref()
            .and_then(|r| r.default_host.as_deref())
            .or(self.global.default_host.as_deref())
            .and_then(Host::parse)
            .unwrap_or_default()
    }

    /// Output directory for generated workflows, relative to the repo root.
    ///
    /// Defaults to `.github/workflows` if not configured.
    pub fn workflows_dir(&self) -> PathBuf {
        PathBuf::from(
            self.repo
                .as_ref()
                .and_then(|r| r.workflows_dir.as_deref())
                .unwrap_or(DEFAULT_WORKFLOWS_DIR),
        )
    }
}

/// Read and parse a TOML file, treating a missing file as `None`.
fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
