use anyhow::{bail, Context};
use serde::Deserialize;

/// Where user records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match lookup("APP_STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => bail!("unknown APP_STORAGE value {other:?} (expected postgres or memory)"),
        };

        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: lookup("DATABASE_URL").context("DATABASE_URL must be set for postgres storage")?,
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            }),
            StorageBackend::Memory => None,
        };

        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("invalid APP_PORT {v:?}"))?,
            None => 8080,
        };

        Ok(Self {
            storage,
            database,
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_postgres_and_requires_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/users")]))
            .expect("config");
        assert_eq!(cfg.storage, StorageBackend::Postgres);
        let db = cfg.database.as_ref().expect("database config");
        assert_eq!(db.url, "postgres://db/users");
        assert_eq!(db.max_connections, 10);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn memory_storage_needs_no_database() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("APP_STORAGE", "memory"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "3000"),
        ]))
        .expect("config");
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert!(cfg.database.is_none());
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn rejects_unknown_storage_and_bad_port() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_STORAGE", "sqlite")])).unwrap_err();
        assert!(err.to_string().contains("sqlite"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("APP_STORAGE", "memory"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
