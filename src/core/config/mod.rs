//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The client has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Overrides stored in the working root
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$CVSCLIENT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/cvsclient/config.toml` (or the platform config dir)
//! 3. `~/.cvsclient/config.toml`
//!
//! # Project Config Location
//!
//! `<working root>/.cvsclient.toml`
//!
//! # Example
//!
//! ```no_run
//! use cvsclient::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/checkout"))).unwrap();
//! println!("Echo to console: {}", config.echo_to_console());
//! ```

pub mod schema;

pub use schema::{ClientConfig, ProgressConfig, Quietness};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::engine::options::{GlobalOption, PARTLY_QUIET, SILENT, VERBOSE};
use crate::engine::progress::ProgressTuning;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "CVSCLIENT_CONFIG";

/// File name of the project config in the working root.
pub const PROJECT_CONFIG_FILE: &str = ".cvsclient.toml";

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
/// Accessors apply precedence automatically: project overrides global.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ClientConfig,
    /// Project configuration (if a working root was given and has one)
    pub project: Option<ClientConfig>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `working_root` is provided, also loads the project config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or hold
    /// invalid values. Missing config files are not an error.
    pub fn load(working_root: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = match Self::global_config_path() {
            Some(path) => (Self::read_config(&path)?, Some(path)),
            None => (ClientConfig::default(), None),
        };

        let (project, project_path) = match working_root {
            Some(root) => {
                let path = root.join(PROJECT_CONFIG_FILE);
                if path.exists() {
                    (Some(Self::read_config(&path)?), Some(path))
                } else {
                    (None, None)
                }
            }
            None => (None, None),
        };

        Ok(Config {
            global,
            project,
            global_path,
            project_path,
        })
    }

    /// Load a single explicit file as the global config.
    pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
        Ok(Config {
            global: Self::read_config(path)?,
            project: None,
            global_path: Some(path.to_path_buf()),
            project_path: None,
        })
    }

    /// Find the first existing global config file.
    fn global_config_path() -> Option<PathBuf> {
        // 1. Check $CVSCLIENT_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check the platform config dir ($XDG_CONFIG_HOME on Linux)
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("cvsclient/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.cvsclient/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".cvsclient/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Read, parse, and validate a config file.
    fn read_config(path: &Path) -> Result<ClientConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ClientConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the loaded global config, if any.
    pub fn global_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path of the loaded project config, if any.
    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn pick<T>(&self, field: impl Fn(&ClientConfig) -> Option<T>) -> Option<T> {
        self.project
            .as_ref()
            .and_then(&field)
            .or_else(|| field(&self.global))
    }

    /// Whether sessions echo server messages to the console listener.
    ///
    /// Defaults to `true` if not configured.
    pub fn echo_to_console(&self) -> bool {
        self.pick(|c| c.echo_to_console).unwrap_or(true)
    }

    /// The configured quietness level.
    pub fn quietness(&self) -> Quietness {
        self.pick(|c| c.quietness).unwrap_or_default()
    }

    /// The quietness level as a global option.
    pub fn quietness_option(&self) -> GlobalOption {
        match self.quietness() {
            Quietness::Verbose => VERBOSE,
            Quietness::PartlyQuiet => PARTLY_QUIET,
            Quietness::Silent => SILENT,
        }
    }

    /// Response-phase progress tuning.
    pub fn progress_tuning(&self) -> ProgressTuning {
        let defaults = ProgressTuning::default();
        ProgressTuning {
            total_work: self
                .pick(|c| c.progress.as_ref().and_then(|p| p.response_work))
                .unwrap_or(defaults.total_work),
            initial_increment: self
                .pick(|c| c.progress.as_ref().and_then(|p| p.initial_increment))
                .unwrap_or(defaults.initial_increment),
        }
    }
}
