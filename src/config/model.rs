use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// How long a notification stays in the footer
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_seconds: u64,
    /// Periodic container list refresh; unset means refresh on demand only
    #[serde(default)]
    pub auto_refresh_seconds: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            notification_ttl_seconds: default_notification_ttl(),
            auto_refresh_seconds: None,
        }
    }
}

/// Console server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Address operators reach the console at, when it differs from `url`
    #[serde(default)]
    pub console_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            api_path: default_api_path(),
            timeout_seconds: default_timeout(),
            console_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Node opened when `--node` is not given
    #[serde(default)]
    pub default_node: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

// Default value functions
fn default_notification_ttl() -> u64 {
    5
}

fn default_server_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_api_path() -> String {
    "/api/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
