//! Server configuration.
//!
//! Values come from `TASKDECK_*` environment variables (a `.env` file is
//! loaded first by the binary). Command-line flags override them.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const ENV_HOST: &str = "TASKDECK_HOST";
pub const ENV_PORT: &str = "TASKDECK_PORT";
pub const ENV_DATA_DIR: &str = "TASKDECK_DATA_DIR";
pub const ENV_STORE: &str = "TASKDECK_STORE";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Which persistence backend serves the `tasks` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StoreKind {
    #[default]
    File,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ConfigError::invalid(
                ENV_STORE,
                format!("expected `file` or `memory`, got `{other}`"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` means the default `~/.taskdeck`.
    pub data_dir: Option<PathBuf>,
    pub store: StoreKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: None,
            store: StoreKind::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get(ENV_HOST) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = get(ENV_PORT) {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_PORT, format!("{e}")))?;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(store) = get(ENV_STORE) {
            config.store = store.parse()?;
        }

        Ok(config)
    }

    /// Resolves the host, which may be an IP literal (`::1` or `[::1]`) or a
    /// name such as `localhost`.
    pub fn bind_addresses(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let addresses: Vec<SocketAddr> = (host, self.port)
            .to_socket_addrs()
            .map_err(|e| ConfigError::invalid(ENV_HOST, format!("cannot resolve `{host}`: {e}")))?
            .collect();
        if addresses.is_empty() {
            return Err(ConfigError::invalid(
                ENV_HOST,
                format!("`{host}` resolved to no addresses"),
            ));
        }
        Ok(addresses)
    }
}
