use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::info;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown backend {other}, expected postgres or memory")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub table_name: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_timeout: Duration,
    pub backend: StoreBackend,
    /// Present whenever `backend` is [`StoreBackend::Postgres`].
    pub postgres: Option<PostgresConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend: StoreBackend = try_load(&lookup, "STORE_BACKEND", "postgres")?;
        let timeout_ms: u64 = try_load(&lookup, "STORE_TIMEOUT_MS", "2000")?;

        let postgres = match backend {
            StoreBackend::Memory => None,
            StoreBackend::Postgres => Some(PostgresConfig {
                database_url: required(&lookup, "DATABASE_URL")?,
                table_name: required(&lookup, "TABLE_NAME")?,
                max_connections: try_load(&lookup, "DB_MAX_CONNECTIONS", "20")?,
            }),
        };

        Ok(Self {
            port: try_load(&lookup, "PORT", "8080")?,
            store_timeout: Duration::from_millis(timeout_ms),
            backend,
            postgres,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = load(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert!(config.postgres.is_none());
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_timeout, Duration::from_secs(2));
    }

    #[test]
    fn postgres_requires_url_and_table() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://localhost/feelings")]),
            Err(ConfigError::Missing("TABLE_NAME"))
        ));

        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/feelings"),
            ("TABLE_NAME", "feelings"),
            ("PORT", "9000"),
            ("STORE_TIMEOUT_MS", "250"),
        ])
        .unwrap();
        let pg = config.postgres.unwrap();
        assert_eq!(pg.table_name, "feelings");
        assert_eq!(pg.max_connections, 20);
        assert_eq!(config.port, 9000);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("STORE_BACKEND", "memory"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            load(&[("STORE_BACKEND", "redis")]),
            Err(ConfigError::Invalid { key: "STORE_BACKEND", .. })
        ));
    }
}
