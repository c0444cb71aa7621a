//! Service configuration, read from the environment (`.env` is loaded first
//! by the binaries).
//!
//! | variable | default |
//! |---|---|
//! | `CATALOG_BIND_ADDR` | `0.0.0.0:5555` |
//! | `CATALOG_STORAGE` | `postgres` (or `memory`) |
//! | `DATABASE_URL` | required for `postgres` |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |

use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5555";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {name} '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub storage: Storage,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_or(&lookup, "CATALOG_BIND_ADDR", DEFAULT_BIND_ADDR)?;

        let backend = lookup("CATALOG_STORAGE").unwrap_or_else(|| "postgres".to_string());
        let storage = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => Storage::Memory,
            "postgres" => Storage::Postgres {
                database_url: lookup("DATABASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    &DEFAULT_MAX_CONNECTIONS.to_string(),
                )?,
            },
            _ => {
                return Err(ConfigError::Invalid {
                    name: "CATALOG_STORAGE",
                    value: backend,
                })
            }
        };

        Ok(Self { bind_addr, storage })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn postgres_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/catalog")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:5555".parse().unwrap());
        assert_eq!(
            config.storage,
            Storage::Postgres {
                database_url: "postgres://localhost/catalog".into(),
                max_connections: 5,
            }
        );
    }

    #[test]
    fn memory_storage_needs_no_database() {
        let config = config(&[
            ("CATALOG_STORAGE", "Memory"),
            ("CATALOG_BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(config.storage, Storage::Memory);
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn missing_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = config(&[("CATALOG_STORAGE", "sqlite")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid CATALOG_STORAGE 'sqlite'");

        let err = config(&[("CATALOG_STORAGE", "memory"), ("CATALOG_BIND_ADDR", "nowhere")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CATALOG_BIND_ADDR", .. }));

        let err = config(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DATABASE_MAX_CONNECTIONS", .. }));
    }
}
