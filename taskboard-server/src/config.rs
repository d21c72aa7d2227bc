//! Configuration system for the Taskboard server.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard-server/config.toml`)
//! 4. Compiled defaults
//!
//! The JWT secret has no default: a server without one refuses to start.

use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading server configuration.
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

    /// No JWT secret on the command line, in the environment or in the file.
    #[error("no JWT secret configured (use --jwt-secret or TASKBOARD_JWT_SECRET)")]
    MissingJwtSecret,
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerConfigFile {
    server: ServerSection,
    auth: AuthSection,
}

/// `[server]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerSection {
    bind_addr: Option<String>,
    data_file: Option<PathBuf>,
    cors_origins: Option<Vec<String>>,
}

/// `[auth]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct AuthSection {
    jwt_secret: Option<String>,
    jwt_audience: Option<String>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the task server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Taskboard REST server")]
pub struct ServerCliArgs {
    /// Address to bind the server to.
    #[arg(short, long, env = "TASKBOARD_BIND")]
    pub bind: Option<String>,

    /// Path to config file (default: `~/.config/taskboard-server/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Shared HS256 secret used to verify bearer tokens.
    #[arg(long, env = "TASKBOARD_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Expected `aud` claim; unchecked when absent.
    #[arg(long, env = "TASKBOARD_JWT_AUDIENCE")]
    pub jwt_audience: Option<String>,

    /// JSON snapshot file; tasks are kept in memory only when absent.
    #[arg(long, env = "TASKBOARD_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Browser origin allowed by CORS (repeatable).
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind the server to (e.g., `0.0.0.0:8080`).
    pub bind_addr: String,
    /// Shared token secret.
    pub jwt_secret: String,
    /// Expected token audience.
    pub jwt_audience: Option<String>,
    /// Snapshot file for durable storage.
    pub data_file: Option<PathBuf>,
    /// CORS allow-list.
    pub cors_origins: Vec<String>,
    /// Log level filter string.
    pub log_level: String,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_audience", &self.jwt_audience)
            .field("data_file", &self.data_file)
            .field("cors_origins", &self.cors_origins)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

impl ServerConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and a missing
    /// file is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read or
    /// parsed, or if no JWT secret is configured anywhere.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, file)
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &ServerCliArgs, file: ServerConfigFile) -> Result<Self, ConfigError> {
        let jwt_secret = cli
            .jwt_secret
            .clone()
            .or(file.auth.jwt_secret)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let cors_origins = if cli.cors_origins.is_empty() {
            file.server.cors_origins.unwrap_or_default()
        } else {
            cli.cors_origins.clone()
        };

        Ok(Self {
            bind_addr: cli
                .bind
                .clone()
                .or(file.server.bind_addr)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            jwt_audience: cli.jwt_audience.clone().or(file.auth.jwt_audience),
            data_file: cli.data_file.clone().or(file.server.data_file),
            cors_origins,
            log_level: cli.log_level.clone(),
        })
    }
}

/// Load and parse the server's TOML config file.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ServerConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ServerConfigFile::default());
        };
        config_dir.join("taskboard-server").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_secret() -> ServerCliArgs {
        ServerCliArgs {
            jwt_secret: Some("cli-secret".to_string()),
            log_level: "info".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_when_only_secret_is_given() {
        let config = ServerConfig::resolve(&cli_with_secret(), ServerConfigFile::default()).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.jwt_secret, "cli-secret");
        assert!(config.data_file.is_none());
        assert!(config.jwt_audience.is_none());
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = ServerConfig::resolve(&ServerCliArgs::default(), ServerConfigFile::default());
        assert!(matches!(result, Err(ConfigError::MissingJwtSecret)));
    }

    #[test]
    fn empty_secret_is_treated_as_missing() {
        let cli = ServerCliArgs {
            jwt_secret: Some(String::new()),
            ..Default::default()
        };
        let result = ServerConfig::resolve(&cli, ServerConfigFile::default());
        assert!(matches!(result, Err(ConfigError::MissingJwtSecret)));
    }

    #[test]
    fn toml_parsing_full() {
        let toml_str = r#"
[server]
bind_addr = "127.0.0.1:9090"
data_file = "/var/lib/taskboard/tasks.json"
cors_origins = ["http://localhost:3000"]

[auth]
jwt_secret = "file-secret"
jwt_audience = "authenticated"
"#;
        let file: ServerConfigFile = toml::from_str(toml_str).unwrap();
        let config = ServerConfig::resolve(&ServerCliArgs::default(), file).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9090");
        assert_eq!(config.jwt_secret, "file-secret");
        assert_eq!(config.jwt_audience.as_deref(), Some("authenticated"));
        assert_eq!(
            config.data_file,
            Some(PathBuf::from("/var/lib/taskboard/tasks.json"))
        );
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn cli_overrides_file() {
        let toml_str = r#"
[server]
bind_addr = "127.0.0.1:9090"
cors_origins = ["http://file.example"]

[auth]
jwt_secret = "file-secret"
"#;
        let file: ServerConfigFile = toml::from_str(toml_str).unwrap();
        let cli = ServerCliArgs {
            bind: Some("0.0.0.0:3000".to_string()),
            cors_origins: vec!["http://cli.example".to_string()],
            ..cli_with_secret()
        };
        let config = ServerConfig::resolve(&cli, file).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.jwt_secret, "cli-secret");
        assert_eq!(config.cors_origins, vec!["http://cli.example"]);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = ServerConfig::resolve(&cli_with_secret(), ServerConfigFile::default()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("cli-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn explicit_missing_config_file_returns_error() {
        let result = load_config_file(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
