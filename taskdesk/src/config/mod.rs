//! Configuration system for the `TaskDesk` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskdesk/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use taskdesk_proto::query::{SortKey, SortOrder, TaskQuery};

use crate::session::DEFAULT_ADMIN_EMAILS;

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

    /// The timestamp format is not a valid chrono format string.
    #[error("invalid timestamp format {0:?}")]
    InvalidTimestampFormat(String),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    session: SessionFileConfig,
    tasks: TasksFileConfig,
    ui: UiFileConfig,
    demo: DemoFileConfig,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    admin_emails: Option<Vec<String>>,
}

/// `[tasks]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TasksFileConfig {
    default_sort_by: Option<SortKey>,
    default_sort_order: Option<SortOrder>,
    default_limit: Option<usize>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    notice_buffer: Option<usize>,
    timestamp_format: Option<String>,
    json_output: Option<bool>,
}

/// `[demo]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DemoFileConfig {
    federated_email: Option<String>,
    federated_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Session --
    /// Emails that project to the advisory admin role.
    pub admin_emails: Vec<String>,

    // -- Tasks --
    /// Query used by `list` and `refresh` when no parameters are given.
    pub default_query: TaskQuery,

    // -- UI --
    /// Capacity of the notice channel.
    pub notice_buffer: usize,
    /// Timestamp display format string (chrono).
    pub timestamp_format: String,
    /// Print operation results as JSON.
    pub json_output: bool,

    // -- Demo backend --
    /// Account the in-process federated sign-in returns, if any.
    pub federated_email: Option<String>,
    /// Display name of the federated account.
    pub federated_name: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            admin_emails: DEFAULT_ADMIN_EMAILS.iter().map(ToString::to_string).collect(),
            default_query: TaskQuery::default(),
            notice_buffer: 64,
            timestamp_format: "%Y-%m-%d %H:%M".to_string(),
            json_output: false,
            federated_email: Some("google.user@gmail.com".to_string()),
            federated_name: Some("Google User".to_string()),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/taskdesk/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed,
    /// or if the resolved timestamp format is invalid.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. Separated from `load()` so it can be
    /// tested without CLI parsing.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let admin_emails = if cli.admin_email.is_empty() {
            file.session
                .admin_emails
                .clone()
                .unwrap_or(defaults.admin_emails)
        } else {
            cli.admin_email.clone()
        };

        let default_query = TaskQuery {
            status: None,
            limit: cli.limit.or(file.tasks.default_limit),
            sort_by: Some(
                cli.sort_by
                    .or(file.tasks.default_sort_by)
                    .unwrap_or_else(|| defaults.default_query.sort_key()),
            ),
            sort_order: Some(
                cli.sort_order
                    .or(file.tasks.default_sort_order)
                    .unwrap_or_else(|| defaults.default_query.order()),
            ),
        };

        let timestamp_format = cli
            .timestamp_format
            .clone()
            .or_else(|| file.ui.timestamp_format.clone())
            .unwrap_or(defaults.timestamp_format);
        validate_timestamp_format(&timestamp_format)?;

        Ok(Self {
            admin_emails,
            default_query,
            notice_buffer: file.ui.notice_buffer.unwrap_or(defaults.notice_buffer),
            timestamp_format,
            json_output: cli.json || file.ui.json_output.unwrap_or(defaults.json_output),
            federated_email: file
                .demo
                .federated_email
                .clone()
                .or(defaults.federated_email),
            federated_name: file.demo.federated_name.clone().or(defaults.federated_name),
        })
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task list client with an in-process demo backend")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/taskdesk/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Email granted the advisory admin role (repeatable, replaces the list).
    #[arg(long = "admin-email", env = "TASKDESK_ADMIN_EMAILS", value_delimiter = ',')]
    pub admin_email: Vec<String>,

    /// Default list ordering key (createdAt, updatedAt, title).
    #[arg(long)]
    pub sort_by: Option<SortKey>,

    /// Default list ordering direction (asc, desc).
    #[arg(long)]
    pub sort_order: Option<SortOrder>,

    /// Default cap on listed tasks.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Timestamp display format (chrono format string).
    #[arg(long)]
    pub timestamp_format: Option<String>,

    /// Print operation results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKDESK_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskdesk.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Rejects format strings chrono cannot render; formatting with one would
/// fail at display time.
fn validate_timestamp_format(format: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidTimestampFormat(format.to_string()));
    }
    Ok(())
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskdesk").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
