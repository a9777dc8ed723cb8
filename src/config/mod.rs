use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use tracing::{debug, info};

use crate::console::ConsoleOrigin;
use crate::core::ConfigError;

pub mod model;

pub use model::*;

const CONFIG_FILE: &str = "config.toml";
const LOCAL_CONFIG_FILE: &str = "portside.toml";

/// Longest accepted notification lifetime (one day)
pub const MAX_NOTIFICATION_TTL_SECONDS: u64 = 86_400;

/// Per-user config file location, if the platform has one
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "portside", "portside")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        debug!("Configuration loaded and validated successfully");

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load(&local_config);
        }

        info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Configuration saved successfully");
        Ok(())
    }

    /// Write a new configuration file; an existing one is kept unless `overwrite`
    pub fn create<P: AsRef<Path>>(&self, path: P, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            anyhow::bail!(
                "Configuration file already exists: {} (use --force to replace it)",
                path.display()
            );
        }
        self.save(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let server = parse_http_url(&self.server.url)
            .with_context(|| format!("Invalid server.url: {}", self.server.url))?;
        if server.cannot_be_a_base() {
            anyhow::bail!(ConfigError::Validation("server.url must be a base URL".to_string()));
        }

        if !self.server.api_path.starts_with('/') {
            anyhow::bail!(ConfigError::Validation(
                "server.api_path must start with '/'".to_string()
            ));
        }

        if self.server.timeout_seconds == 0 {
            anyhow::bail!(ConfigError::Validation(
                "server.timeout_seconds must be at least 1".to_string()
            ));
        }

        if let Some(console_url) = &self.server.console_url {
            parse_http_url(console_url)
                .with_context(|| format!("Invalid server.console_url: {}", console_url))?;
        }

        let ttl = self.general.notification_ttl_seconds;
        if !(1..=MAX_NOTIFICATION_TTL_SECONDS).contains(&ttl) {
            anyhow::bail!(ConfigError::Validation(format!(
                "general.notification_ttl_seconds must be between 1 and {}",
                MAX_NOTIFICATION_TTL_SECONDS
            )));
        }

        if let Some(seconds) = self.general.auto_refresh_seconds {
            if seconds < 2 {
                anyhow::bail!(ConfigError::Validation(
                    "general.auto_refresh_seconds must be at least 2".to_string()
                ));
            }
        }

        Ok(())
    }

    /// Server URL joined with the API path, e.g. `http://localhost:9090/api/v1`
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.server.url.trim_end_matches('/'),
            self.server.api_path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_seconds)
    }

    /// Address the console is reached at: `console_url` when set, else the server URL
    fn console_address(&self) -> &str {
        self.server
            .console_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.server.url)
    }

    /// Origin used for wildcard-bound ports
    pub fn console_origin(&self) -> Result<ConsoleOrigin> {
        let address = self.console_address();
        ConsoleOrigin::parse(address)
            .with_context(|| format!("Cannot derive console origin from {}", address))
    }

    /// Console origin with its port, suggested as the server URL setting
    pub fn suggested_server_url(&self) -> Option<String> {
        Url::parse(self.console_address())
            .ok()
            .map(|url| url.origin().ascii_serialization())
    }

    /// Node to open: explicit override first, then `console.default_node`
    pub fn node_id(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.console.default_node.clone())
            .filter(|node| !node.trim().is_empty())
            .ok_or_else(|| ConfigError::NoNode.into())
    }
}

fn parse_http_url(value: &str) -> Result<Url> {
    let url = Url::parse(value)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        anyhow::bail!(ConfigError::Validation(format!(
            "{} is not an http(s) URL",
            value
        )));
    }
    Ok(url)
}
