use crate::clock::SystemClock;
use crate::engine::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use reqwest::Url;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// chrono accepts offsets strictly inside +/-24h.
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub window_days: usize,
    pub min_activity_secs: u64,
    pub utc_offset_minutes: Option<i32>,
}

/// Where streak documents are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite { database_path: String },
    Http { base_url: Url, retry_budget: Duration },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let store = match env_map
            .get("STORE_BACKEND")
            .map(|s| s.as_str())
            .unwrap_or("sqlite")
        {
            "sqlite" => StoreBackend::Sqlite {
                database_path: required(&env_map, "DATABASE_PATH")?,
            },
            "http" => {
                let raw = required(&env_map, "STORE_URL")?;
                let base_url = Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidValue("STORE_URL".to_string(), e.to_string())
                })?;
                if base_url.cannot_be_a_base() {
                    return Err(ConfigError::InvalidValue(
                        "STORE_URL".to_string(),
                        "must be an absolute http(s) URL".to_string(),
                    ));
                }
                let retry_secs = env_map
                    .get("STORE_RETRY_SECS")
                    .map(|s| s.as_str())
                    .unwrap_or("30")
                    .parse::<u64>()
                    .map_err(|_| {
                        ConfigError::InvalidValue(
                            "STORE_RETRY_SECS".to_string(),
                            "must be a non-negative integer".to_string(),
                        )
                    })?;
                StoreBackend::Http {
                    base_url,
                    retry_budget: Duration::from_secs(retry_secs),
                }
            }
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND".to_string(),
                    format!("must be sqlite or http, got {}", other),
                ))
            }
        };

        let window_days = match env_map.get("STREAK_WINDOW_DAYS") {
            None => DEFAULT_WINDOW_DAYS,
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_WINDOW_DAYS).contains(n))
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "STREAK_WINDOW_DAYS".to_string(),
                        format!("must be between 1 and {}", MAX_WINDOW_DAYS),
                    )
                })?,
        };

        let min_activity_secs = env_map
            .get("MIN_ACTIVITY_SECS")
            .map(|s| s.as_str())
            .unwrap_or("120")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "MIN_ACTIVITY_SECS".to_string(),
                    "must be a non-negative integer".to_string(),
                )
            })?;

        let utc_offset_minutes = match env_map.get("STREAK_UTC_OFFSET_MINUTES") {
            None => None,
            Some(raw) => Some(
                raw.parse::<i32>()
                    .ok()
                    .filter(|m| (-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(m))
                    .ok_or_else(|| {
                        ConfigError::InvalidValue(
                            "STREAK_UTC_OFFSET_MINUTES".to_string(),
                            "must be minutes east of UTC, within +/-1439".to_string(),
                        )
                    })?,
            ),
        };

        Ok(Config {
            port,
            store,
            window_days,
            min_activity_secs,
            utc_offset_minutes,
        })
    }

    /// Wall clock resolving the configured local day.
    pub fn clock(&self) -> SystemClock {
        match self.utc_offset_minutes {
            Some(minutes) => SystemClock::with_offset_minutes(minutes),
            None => SystemClock::local(),
        }
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}
