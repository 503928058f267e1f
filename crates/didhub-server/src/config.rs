//! Server configuration, read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `DIDHUB_ADDR` | `127.0.0.1:3000` |
//! | `DIDHUB_STORE` | `sqlite` if `DATABASE_URL` is set, otherwise `memory` |
//! | `DATABASE_URL` | `sqlite://didhub.db` |
//! | `DIDHUB_LOG_RETENTION` | `1000` (memory store only) |
//! | `DIDHUB_AGENT_TIMEOUT_SECS` | `30` |
//! | `DIDHUB_COMMUNITY_DWN` | `https://dwn.gcda.xyz` |

use std::{net::SocketAddr, time::Duration};

use didhub_core::{Registry, store::StoreError};
use didhub_memory::{DEFAULT_LOG_CAPACITY, MemoryStore};
use didhub_sqlite::SqliteStore;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://didhub.db";
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_COMMUNITY_DWN: &str = "https://dwn.gcda.xyz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub store: StoreConfig,
    pub agent_timeout: Duration,
    pub community_dwn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory { log_capacity: usize },
    Sqlite { url: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {name} {value:?}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigError {
    fn new(name: &'static str, value: &str, reason: impl ToString) -> Self {
        Self {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr: SocketAddr = match lookup("DIDHUB_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::new("DIDHUB_ADDR", &value, e))?,
            None => DEFAULT_ADDR
                .parse()
                .map_err(|e| ConfigError::new("DIDHUB_ADDR", DEFAULT_ADDR, e))?,
        };

        let database_url = lookup("DATABASE_URL");

        let store = match lookup("DIDHUB_STORE").as_deref() {
            Some("sqlite") => StoreConfig::Sqlite {
                url: database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            Some("memory") => StoreConfig::Memory {
                log_capacity: log_capacity(&lookup)?,
            },
            Some(other) => {
                return Err(ConfigError::new(
                    "DIDHUB_STORE",
                    other,
                    "expected memory or sqlite",
                ));
            }
            None => match database_url {
                Some(url) => StoreConfig::Sqlite { url },
                None => StoreConfig::Memory {
                    log_capacity: log_capacity(&lookup)?,
                },
            },
        };

        let agent_timeout = match lookup("DIDHUB_AGENT_TIMEOUT_SECS") {
            Some(value) => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|e| ConfigError::new("DIDHUB_AGENT_TIMEOUT_SECS", &value, e))?;

                if secs == 0 {
                    return Err(ConfigError::new(
                        "DIDHUB_AGENT_TIMEOUT_SECS",
                        &value,
                        "must be positive",
                    ));
                }

                Duration::from_secs(secs)
            }
            None => DEFAULT_AGENT_TIMEOUT,
        };

        let community_dwn = match lookup("DIDHUB_COMMUNITY_DWN") {
            Some(value) => {
                Url::parse(&value).map_err(|e| ConfigError::new("DIDHUB_COMMUNITY_DWN", &value, e))?;
                value
            }
            None => DEFAULT_COMMUNITY_DWN.to_string(),
        };

        Ok(Self {
            addr,
            store,
            agent_timeout,
            community_dwn,
        })
    }
}

fn log_capacity(lookup: &impl Fn(&str) -> Option<String>) -> Result<usize, ConfigError> {
    let Some(value) = lookup("DIDHUB_LOG_RETENTION") else {
        return Ok(DEFAULT_LOG_CAPACITY);
    };

    let capacity = value
        .parse::<usize>()
        .map_err(|e| ConfigError::new("DIDHUB_LOG_RETENTION", &value, e))?;

    if capacity == 0 {
        return Err(ConfigError::new(
            "DIDHUB_LOG_RETENTION",
            &value,
            "must be positive",
        ));
    }

    Ok(capacity)
}

impl StoreConfig {
    /// Opens the configured backend.
    pub async fn connect(&self) -> Result<Registry, StoreError> {
        match self {
            StoreConfig::Memory { log_capacity } => {
                Ok(Registry::from(MemoryStore::with_log_capacity(*log_capacity)))
            }
            StoreConfig::Sqlite { url } => Ok(Registry::from(SqliteStore::connect(url).await?)),
        }
    }
}
