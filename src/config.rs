use crate::connection::{StoreConfig, StoreLocation};
use crate::sync::UpsertStrategy;
use anyhow::{Context, Result, anyhow};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub primary: StoreLocation,
    /// Replica that follows every committed primary write, when set.
    pub secondary: Option<StoreLocation>,
    pub mirror: StoreLocation,
    pub db_max_connections: u32,
    pub upsert_strategy: UpsertStrategy,
    pub auto_mirror: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("APP_HOST", "0.0.0.0");

        let port = var("APP_PORT", "8080")
            .parse::<u16>()
            .context("APP_PORT must be a valid u16")?;

        let primary = location(&var("PRIMARY_STORE_URL", "memory://"), "PRIMARY_STORE_URL")?;

        let secondary = match lookup("SECONDARY_STORE_URL") {
            Some(raw) if !raw.trim().is_empty() => {
                Some(location(&raw, "SECONDARY_STORE_URL")?)
            }
            _ => None,
        };

        let mirror = location(&var("MIRROR_STORE_URL", "memory://"), "MIRROR_STORE_URL")?;

        let db_max_connections = var("DB_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid u32")?;

        let upsert_strategy = var("UPSERT_STRATEGY", "read-then-write")
            .parse::<UpsertStrategy>()
            .map_err(|err| anyhow!(err))
            .context("UPSERT_STRATEGY must be one of: read-then-write, native")?;

        let auto_mirror = parse_flag(&var("AUTO_MIRROR", "false"))
            .context("AUTO_MIRROR must be true or false")?;

        Ok(Self {
            host,
            port,
            primary,
            secondary,
            mirror,
            db_max_connections,
            upsert_strategy,
            auto_mirror,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn primary_store(&self) -> StoreConfig {
        self.store(self.primary.clone())
    }

    pub fn secondary_store(&self) -> Option<StoreConfig> {
        self.secondary.clone().map(|location| self.store(location))
    }

    pub fn mirror_store(&self) -> StoreConfig {
        self.store(self.mirror.clone())
    }

    fn store(&self, location: StoreLocation) -> StoreConfig {
        StoreConfig::new(location).max_connections(self.db_max_connections)
    }
}

fn location(raw: &str, key: &str) -> Result<StoreLocation> {
    StoreLocation::from_url(raw).map_err(|err| anyhow!("{key}: {err}"))
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("unrecognized flag value '{other}'")),
    }
}
