//! Application settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use busgo_core::SeatLayout;

use crate::ConfigError;

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data directory / persistence configuration
    #[serde(default)]
    pub data: DataConfig,

    /// External text-generation service configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Seat layout policy
    #[serde(default)]
    pub seat_layout: SeatLayout,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS origin checks
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum concurrent sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Session inactivity timeout (seconds)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_true() -> bool {
    true
}
fn default_max_sessions() -> usize {
    100
}
fn default_session_timeout() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            max_sessions: default_max_sessions(),
            session_timeout_secs: default_session_timeout(),
        }
    }
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the flat JSON documents
    #[serde(default = "default_data_dir")]
    pub dir: String,

    /// Persist reservations to disk; when false the store is memory-only
    #[serde(default = "default_true")]
    pub persist: bool,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            persist: true,
        }
    }
}

/// External text-generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Static API key; also read from `BUSGO_LLM__API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Load settings from an optional TOML file plus `BUSGO_` environment
/// overrides (e.g. `BUSGO_SERVER__PORT=9090`)
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(config::File::from(path));
    } else if Path::new("busgo.toml").exists() {
        builder = builder.add_source(config::File::with_name("busgo"));
    }

    let settings: Settings = builder
        .add_source(config::Environment::with_prefix("BUSGO").separator("__"))
        .build()?
        .try_deserialize()?;

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.seat_layout.seat_count == 0 {
        return Err(ConfigError::InvalidValue {
            field: "seat_layout.seat_count".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if settings.server.max_sessions == 0 {
        return Err(ConfigError::InvalidValue {
            field: "server.max_sessions".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
