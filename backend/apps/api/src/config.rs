//! Server configuration from the environment

use anyhow::{Context, bail};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Where products and carts are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON files under a data directory
    File { data_dir: PathBuf },
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub storage: StorageBackend,
    pub public_dir: PathBuf,
    /// Allowed CORS origins; empty disables the CORS layer
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = match var("PORT") {
            Some(v) => v.parse().with_context(|| format!("PORT is not a port: {}", v))?,
            None => 8080,
        };
        let ip: IpAddr = match var("BIND_ADDR") {
            Some(v) => v
                .parse()
                .with_context(|| format!("BIND_ADDR is not an IP address: {}", v))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let backend = var("STORAGE_BACKEND").unwrap_or_else(|| "file".to_string());
        let storage = match backend.to_ascii_lowercase().as_str() {
            "file" => StorageBackend::File {
                data_dir: var("DATA_DIR").unwrap_or_else(|| "./data".to_string()).into(),
            },
            "postgres" => StorageBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .context("DATABASE_URL must be set when STORAGE_BACKEND=postgres")?,
                max_connections: match var("DATABASE_MAX_CONNECTIONS") {
                    Some(v) => v
                        .parse()
                        .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {}", v))?,
                    None => 5,
                },
            },
            other => bail!("Unknown STORAGE_BACKEND: {} (expected file or postgres)", other),
        };

        let cors_origins = var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            storage,
            public_dir: var("PUBLIC_DIR").unwrap_or_else(|| "./public".to_string()).into(),
            cors_origins,
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(
            config.storage,
            StorageBackend::File {
                data_dir: "./data".into()
            }
        );
        assert_eq!(config.public_dir, PathBuf::from("./public"));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_postgres_requires_url() {
        let err = ServerConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "postgres")]));
        assert!(err.is_err());

        let config = ServerConfig::from_lookup(lookup(&[
            ("STORAGE_BACKEND", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Postgres {
                database_url: "postgres://localhost/shop".into(),
                max_connections: 12,
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("BIND_ADDR", "127.0.0.1"),
            ("DATA_DIR", "/var/shop"),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
        ]))
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(
            config.storage,
            StorageBackend::File {
                data_dir: "/var/shop".into()
            }
        );
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "mongo")])).is_err());
    }
}
