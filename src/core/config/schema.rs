//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the project file; every
//! field is optional so a project file only needs the keys it overrides.
//!
//! # Validation
//!
//! Config values are validated after parsing so a zero progress budget is
//! rejected at load time rather than producing a monitor that never moves.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Client configuration.
///
/// # Example
///
/// ```toml
/// echo_to_console = true
/// quietness = "partly-quiet"
///
/// [progress]
/// response_work = 300
/// initial_increment = 4
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Echo `M`/`E` lines to the console listener
    pub echo_to_console: Option<bool>,

    /// Default quietness global option
    pub quietness: Option<Quietness>,

    /// Response-phase progress tuning
    pub progress: Option<ProgressConfig>,
}

impl ClientConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(progress) = &self.progress {
            progress.validate()?;
        }
        Ok(())
    }
}

/// Quietness levels, mapped to the `-q`/`-Q` global options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Quietness {
    /// Normal verbosity; sends nothing.
    #[default]
    Verbose,
    /// Suppress informational messages (`-q`).
    PartlyQuiet,
    /// Silent but for serious problems (`-Q`).
    Silent,
}

/// Progress tuning for the response phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressConfig {
    /// Total work units of the response phase
    pub response_work: Option<u32>,

    /// Response lines per work unit at the start
    pub initial_increment: Option<u32>,
}

impl ProgressConfig {
    /// Validate progress settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(work) = self.response_work {
            if work < 2 {
                return Err(ConfigError::InvalidValue(format!(
                    "progress.response_work must be at least 2, got {}",
                    work
                )));
            }
        }
        if self.initial_increment == Some(0) {
            return Err(ConfigError::InvalidValue(
                "progress.initial_increment must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
