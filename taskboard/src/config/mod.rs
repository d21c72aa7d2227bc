//! Configuration system for the Taskboard client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::board::filter::ViewMode;

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

    /// The API URL is not a valid absolute URL.
    #[error("invalid API URL {url:?}: {source}")]
    InvalidUrl {
        /// The rejected value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// Unknown board view name.
    #[error("{0}")]
    InvalidView(String),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    ui: UiFileConfig,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    api_url: Option<String>,
    token: Option<String>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    view: Option<String>,
    poll_timeout_ms: Option<u64>,
    notification_ttl_secs: Option<u64>,
    channel_capacity: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Default server address.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Fully resolved client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    // -- Server --
    /// Base URL of the task server.
    pub api_url: Url,
    /// Bearer token issued by the auth provider.
    pub token: Option<String>,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub request_timeout: Duration,

    // -- UI --
    /// Initial board view.
    pub view: ViewMode,
    /// Poll timeout for the TUI event loop; also the autoscroll tick.
    pub poll_timeout: Duration,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
    /// Capacity of the request/result channels.
    pub channel_capacity: usize,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("view", &self.view)
            .field("poll_timeout", &self.poll_timeout)
            .field("notification_ttl", &self.notification_ttl)
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default whole-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default TUI poll timeout.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Default notification lifetime.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, or if the URL or view values are invalid.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, file)
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: ConfigFile) -> Result<Self, ConfigError> {
        let raw_url = cli
            .api_url
            .clone()
            .or(file.server.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url =
            Url::parse(&raw_url).map_err(|source| ConfigError::InvalidUrl { url: raw_url, source })?;
        let view = match cli.view.as_deref().or(file.ui.view.as_deref()) {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidView)?,
            None => ViewMode::default(),
        };

        Ok(Self {
            api_url,
            token: cli
                .token
                .clone()
                .or(file.server.token)
                .filter(|t| !t.is_empty()),
            connect_timeout: file
                .server
                .connect_timeout_secs
                .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs),
            request_timeout: file
                .server
                .request_timeout_secs
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
            view,
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(DEFAULT_POLL_TIMEOUT, Duration::from_millis),
            notification_ttl: file
                .ui
                .notification_ttl_secs
                .map_or(DEFAULT_NOTIFICATION_TTL, Duration::from_secs),
            channel_capacity: file
                .ui
                .channel_capacity
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY)
                .max(1),
        })
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal Kanban board for Taskboard")]
pub struct CliArgs {
    /// Base URL of the task server.
    #[arg(long, env = "TASKBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token from the auth provider.
    #[arg(long, env = "TASKBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Initial board view (status or priority).
    #[arg(long)]
    pub view: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
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
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
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
