//! Service configuration
//!
//! Values come from a TOML file and are then overridden by environment
//! variables:
//! - `SERVER_HOST`, `SERVER_PORT`
//! - `SERVER_SHUTDOWN_TIMEOUT_SECONDS`, `SERVER_REQUEST_TIMEOUT_SECONDS`
//! - `LOG_FORMAT` (`text` or `json`)

use crate::error::{Result, VendingError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Time in-flight requests get to finish after a shutdown signal
    pub shutdown_timeout_seconds: u64,
    /// Upper bound on handling a single request
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 10,
            request_timeout_seconds: 5,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Reads `path`, then applies the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| VendingError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overrides fields with whatever `lookup` returns for their variable.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_env(&lookup, "SERVER_PORT")? {
            self.server.port = port;
        }
        if let Some(secs) = parse_env(&lookup, "SERVER_SHUTDOWN_TIMEOUT_SECONDS")? {
            self.server.shutdown_timeout_seconds = secs;
        }
        if let Some(secs) = parse_env(&lookup, "SERVER_REQUEST_TIMEOUT_SECONDS")? {
            self.server.request_timeout_seconds = secs;
        }
        if let Some(format) = parse_env(&lookup, "LOG_FORMAT")? {
            self.log.format = format;
        }
        Ok(())
    }
}

fn parse_env<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(VendingError::ConfigEnv { key, value }),
    }
}
