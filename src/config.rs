use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use tracing::info;

use crate::error::AppError;
use crate::models::Activity;
use crate::services::seed_service;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::load_with(|key| env::var(key).ok())
    }

    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite://high_school.db?mode=rwc")?,
            db_max_connections: try_load(&lookup, "DB_MAX_CONNECTIONS", "5")?,
            host: try_load(&lookup, "HOST", "127.0.0.1")?,
            port: try_load(&lookup, "PORT", "8000")?,
            static_dir: try_load(&lookup, "STATIC_DIR", "static")?,
            seed_file: lookup("SEED_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| AppError::Config {
                key: "HOST".to_string(),
                reason: e.to_string(),
            })
    }

    /// The activities to seed an empty store with.
    pub fn load_seed(&self) -> Result<Vec<Activity>, AppError> {
        match &self.seed_file {
            Some(path) => seed_service::load_seed_file(path),
            None => Ok(seed_service::default_seed()),
        }
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e: T::Err| AppError::Config {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
