//! Server configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SKYJO_BIND_ADDR must be a socket address like 0.0.0.0:8080, got '{0}'")]
    InvalidBindAddr(String),

    #[error("SKYJO_SHUFFLE_SEED must be an unsigned integer, got '{0}'")]
    InvalidShuffleSeed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Fixed seed for every room's shuffles; rooms use OS entropy when unset
    pub shuffle_seed: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("SKYJO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        let shuffle_seed = match lookup("SKYJO_SHUFFLE_SEED") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidShuffleSeed(raw.clone()))?,
            ),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            shuffle_seed,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            shuffle_seed: None,
        }
    }
}
