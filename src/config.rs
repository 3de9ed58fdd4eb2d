use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Which store implementation backs the application state.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Connection settings for the Postgres store. Shared by the server and the
/// seeder, which needs nothing else.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = get("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .context("DATABASE_URL must be set")?;
        Ok(Self {
            url,
            max_connections: get("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(10),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    /// Present only for the Postgres backend.
    pub database: Option<DatabaseConfig>,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match get("STORE_BACKEND").as_deref() {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => anyhow::bail!("unknown STORE_BACKEND {other:?}"),
        };

        let database = match store_backend {
            StoreBackend::Postgres => Some(DatabaseConfig::from_lookup(&get)?),
            StoreBackend::Memory => None,
        };

        // Tokens signed with an empty key would verify against any other empty key.
        let secret = get("JWT_SECRET")
            .filter(|v| !v.trim().is_empty())
            .context("JWT_SECRET must be set")?;

        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "giftlink".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "giftlink-users".into()),
            ttl_minutes: get("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60),
        };

        Ok(Self {
            store_backend,
            database,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: get("APP_PORT")
                .map(|v| v.parse::<u16>())
                .transpose()
                .context("APP_PORT must be a port number")?
                .unwrap_or(3060),
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x/y")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_secret_is_rejected() {
        let res = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("JWT_SECRET", "   "),
        ]));
        assert!(res.is_err());
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn memory_backend_needs_only_secret() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s"),
        ]))
        .expect("config");
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert!(cfg.database.is_none());
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("JWT_SECRET", "s"),
            ("JWT_TTL_MINUTES", "not-a-number"),
        ]))
        .expect("config");
        assert_eq!(cfg.port, 3060);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.database.map(|db| db.max_connections), Some(10));
        assert_eq!(cfg.jwt.issuer, "giftlink");
        assert_eq!(cfg.jwt.audience, "giftlink-users");
        assert_eq!(cfg.jwt.ttl_minutes, 60);
    }

    #[test]
    fn bad_port_is_an_error() {
        let res = AppConfig::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s"),
            ("APP_PORT", "eighty"),
        ]));
        assert!(res.is_err());
    }

    #[test]
    fn database_config_loads_without_secret() {
        let db = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("DATABASE_MAX_CONNECTIONS", "2"),
        ]))
        .expect("database config");
        assert_eq!(db.url, "postgres://x/y");
        assert_eq!(db.max_connections, 2);
    }

    #[test]
    fn database_config_requires_url() {
        let err = DatabaseConfig::from_lookup(lookup(&[("DATABASE_URL", " ")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let res = AppConfig::from_lookup(lookup(&[("STORE_BACKEND", "mongo"), ("JWT_SECRET", "s")]));
        assert!(res.is_err());
    }
}
