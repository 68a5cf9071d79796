//! Configuration system for the `Taskboard` command runner.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use taskboard_proto::task::MAX_TASK_TITLE_LENGTH;

use crate::tasks::Workflow;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    store: StoreFileConfig,
    output: OutputFileConfig,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    workflow: Option<Workflow>,
    max_title_len: Option<usize>,
}

/// `[output]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct OutputFileConfig {
    pretty: Option<bool>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Task store configuration (used by `TaskStore`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Which status changes are accepted.
    pub workflow: Workflow,
    /// Maximum task title length in characters.
    pub max_title_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            workflow: Workflow::Free,
            max_title_len: MAX_TASK_TITLE_LENGTH,
        }
    }
}

/// Fully resolved runner configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Task store settings.
    pub store: StoreConfig,
    /// Emit indented JSON instead of one document per line.
    pub pretty: bool,
    /// Pinned current time; `None` means the system clock.
    pub now: Option<DateTime<Utc>>,
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and a missing
    /// file is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = StoreConfig::default();

        Self {
            store: StoreConfig {
                workflow: cli
                    .workflow
                    .or(file.store.workflow)
                    .unwrap_or(defaults.workflow),
                max_title_len: file
                    .store
                    .max_title_len
                    .unwrap_or(defaults.max_title_len),
            },
            pretty: cli.pretty || file.output.pretty.unwrap_or(false),
            now: cli.now,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Run task commands against an in-memory task board")]
pub struct CliArgs {
    /// JSON-lines command script (default: read stdin).
    pub script: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Status transition policy.
    #[arg(long, value_enum, env = "TASKBOARD_WORKFLOW")]
    pub workflow: Option<Workflow>,

    /// Pin the current time (RFC 3339), e.g. `2024-06-01T00:00:00Z`.
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,

    /// Emit indented JSON.
    #[arg(long)]
    pub pretty: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
