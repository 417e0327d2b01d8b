use std::env;
use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub store: StoreKind,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub csrf_enforce: bool,
    pub cors_allowed_origin: HeaderValue,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://todos.db".to_string());

        let store = match lookup("TODO_STORE").as_deref() {
            None | Some("sqlite") => StoreKind::Sqlite,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(invalid("TODO_STORE", other)),
        };

        Ok(Self {
            database_url,
            store,
            max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            host: parse(&lookup, "HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse(&lookup, "PORT", 8080)?,
            csrf_enforce: parse(&lookup, "CSRF_ENFORCE", true)?,
            cors_allowed_origin: parse(
                &lookup,
                "CORS_ALLOWED_ORIGIN",
                HeaderValue::from_static("http://localhost:3000"),
            )?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| invalid(name, &value)),
        None => Ok(default),
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite://todos.db");
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.addr(), SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert!(config.csrf_enforce);
        assert_eq!(config.cors_allowed_origin, "http://localhost:3000");
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("TODO_STORE", "memory"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("CSRF_ENFORCE", "false"),
            ("CORS_ALLOWED_ORIGIN", "https://todo.example.com"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.addr(), SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert!(!config.csrf_enforce);
        assert_eq!(config.cors_allowed_origin, "https://todo.example.com");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("TODO_STORE", "postgres")]),
            Err(ConfigError::Invalid { name: "TODO_STORE", .. })
        ));
        assert!(matches!(
            config_from(&[("CSRF_ENFORCE", "sometimes")]),
            Err(ConfigError::Invalid { name: "CSRF_ENFORCE", .. })
        ));
    }
}
