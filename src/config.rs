use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid listen address {0}")]
    InvalidAddress(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP / WebSocket port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Milliseconds between two price ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Directory served for the client UI
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Fixed RNG seed for a reproducible simulation
    #[serde(default)]
    pub price_seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tick_interval_ms: default_tick_interval_ms(),
            static_dir: default_static_dir(),
            price_seed: None,
        }
    }
}

impl FeedConfig {
    /// Read `HOST`, `PORT`, `TICK_INTERVAL_MS`, `STATIC_DIR` and `PRICE_SEED`
    /// from the environment, falling back to defaults for unset keys
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`FeedConfig::from_env`] with an injectable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.port = port;
        }
        if let Some(interval) = parse_var::<u64, _>(&lookup, "TICK_INTERVAL_MS")? {
            if interval == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "TICK_INTERVAL_MS",
                    value: interval.to_string(),
                });
            }
            config.tick_interval_ms = interval;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = dir;
        }
        config.price_seed = parse_var(&lookup, "PRICE_SEED")?;

        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

// Default value functions for serde
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_static_dir() -> String {
    "public".to_string()
}
