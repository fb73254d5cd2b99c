//! Runtime configuration read from the environment.
//!
//! `.env` is loaded by the binary before [`ServerConfig::from_env`] runs.
//! Recognised variables:
//!   DATABASE_URL                  - SQLite URL (default: sqlite://dao_details.sqlite)
//!   DATABASE_POOL_SIZE            - max pooled connections (default: 5)
//!   DATABASE_CONNECT_TIMEOUT_SECS - pool acquire timeout (default: 30)
//!   HOST / PORT                   - listen address (default: 0.0.0.0:3002)
//!   STATIC_DIR                    - built client to serve (optional)
//!   REQUIRE_OWNER_SIGNATURE       - reject unsigned detail saves (default: false)
//!   OWNERSHIP_MESSAGE             - challenge wallets sign

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::database::DatabaseConfig;
use crate::signature::OwnershipPolicy;

pub const DEFAULT_PORT: u16 = 3002;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub static_dir: Option<PathBuf>,
    pub ownership: OwnershipPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            database: DatabaseConfig::default(),
            static_dir: None,
            ownership: OwnershipPolicy::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("DATABASE_URL") {
            config.database.database_url = url;
        }
        if let Some(size) = parse_var::<u32>(&get, "DATABASE_POOL_SIZE")? {
            config.database.max_connections = size.max(1);
        }
        if let Some(secs) = parse_var::<u64>(&get, "DATABASE_CONNECT_TIMEOUT_SECS")? {
            config.database.connection_timeout = Duration::from_secs(secs);
        }
        if config.database.is_in_memory() {
            let in_memory = DatabaseConfig::in_memory();
            config.database.max_connections = in_memory.max_connections;
            config.database.idle_timeout = in_memory.idle_timeout;
            config.database.max_lifetime = in_memory.max_lifetime;
        }

        let host = parse_var::<IpAddr>(&get, "HOST")?.unwrap_or(config.bind_addr.ip());
        let port = parse_var::<u16>(&get, "PORT")?.unwrap_or(DEFAULT_PORT);
        config.bind_addr = SocketAddr::new(host, port);

        config.static_dir = get("STATIC_DIR").map(PathBuf::from);

        if let Some(required) = parse_bool(&get, "REQUIRE_OWNER_SIGNATURE")? {
            config.ownership.require_signature = required;
        }
        if let Some(message) = get("OWNERSHIP_MESSAGE") {
            config.ownership.message = message;
        }

        Ok(config)
    }
}

fn parse_var<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

fn parse_bool(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<bool>, ConfigError> {
    get(var)
        .map(|value| match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value,
                reason: "expected true or false".to_string(),
            }),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.database.database_url, "sqlite://dao_details.sqlite");
        assert!(config.static_dir.is_none());
        assert!(!config.ownership.require_signature);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("DATABASE_URL", "sqlite:///tmp/dao.sqlite"),
            ("DATABASE_POOL_SIZE", "3"),
            ("STATIC_DIR", "client/build"),
            ("REQUIRE_OWNER_SIGNATURE", "true"),
            ("OWNERSHIP_MESSAGE", "sign me"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.database.database_url, "sqlite:///tmp/dao.sqlite");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.static_dir, Some(PathBuf::from("client/build")));
        assert!(config.ownership.require_signature);
        assert_eq!(config.ownership.message, "sign me");
    }

    #[test]
    fn in_memory_url_pins_one_connection() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_POOL_SIZE", "8"),
        ])
        .unwrap();
        assert_eq!(config.database.max_connections, 1);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("STATIC_DIR", "")]).unwrap();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("HOST", "not-an-ip")]).is_err());
        assert!(config_from(&[("REQUIRE_OWNER_SIGNATURE", "maybe")]).is_err());
    }
}
