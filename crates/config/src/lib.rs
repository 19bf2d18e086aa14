#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pkgfront
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/pkgfront/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

use pkgfront_errors::{ConfigError, Error};
use pkgfront_types::{ColorChoice, DependencyMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Package manager invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Executable performing the actual package operations
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before the command name on every invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Progress surface behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Dismiss a finished run without waiting for the operator
    #[serde(default)]
    pub auto_dismiss: bool,
    /// Answer used for confirmations when no one can be asked
    #[serde(default = "default_confirm_default")]
    pub confirm_default: bool,
}

/// Install defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstallConfig {
    /// Dependency handling when the command line does not choose one
    pub dependencies: Option<DependencyMode>,
}

/// Log file placement
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            auto_dismiss: false,
            confirm_default: true,
        }
    }
}

// Default value functions for serde
fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_program() -> String {
    "pear".to_string()
}

fn default_confirm_default() -> bool {
    true
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("pkgfront").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // PKGFRONT_COLOR
        if let Ok(color) = std::env::var("PKGFRONT_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PKGFRONT_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // PKGFRONT_RUNNER
        if let Ok(program) = std::env::var("PKGFRONT_RUNNER") {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "PKGFRONT_RUNNER".to_string(),
                    value: program,
                }
                .into());
            }
            self.runner.program = program;
        }

        // PKGFRONT_AUTO_DISMISS
        if let Ok(auto_dismiss) = std::env::var("PKGFRONT_AUTO_DISMISS") {
            self.ui.auto_dismiss = match auto_dismiss.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PKGFRONT_AUTO_DISMISS".to_string(),
                        value: auto_dismiss,
                    }
                    .into())
                }
            };
        }

        // PKGFRONT_DEPS
        if let Ok(deps) = std::env::var("PKGFRONT_DEPS") {
            self.install.dependencies = Some(match deps.as_str() {
                "onlyreqdeps" => DependencyMode::OnlyReqDeps,
                "alldeps" => DependencyMode::AllDeps,
                "nodeps" => DependencyMode::NoDeps,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PKGFRONT_DEPS".to_string(),
                        value: deps,
                    }
                    .into())
                }
            });
        }

        Ok(())
    }

    /// Directory for debug log files (with default)
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.logging.dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(std::env::temp_dir)
                .join("pkgfront")
                .join("logs")
        })
    }
}
