use log::LevelFilter;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use super::{dexscreener::DEXSCREENER_URL, storage::DEFAULT_DB_PATH};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("ENV var LOG_LEVEL should be one of off, error, warn, info, debug, trace: {0}")]
    InvalidLogLevel(String),
}

/// Runtime settings of the terminal binary, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: String,
    pub api_url: String,
    pub log_level: LevelFilter,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let api_url = lookup("DEXSCREENER_URL").unwrap_or_else(|| DEXSCREENER_URL.to_string());
        let log_level = match lookup("LOG_LEVEL") {
            Some(level) => {
                LevelFilter::from_str(&level).map_err(|_| SettingsError::InvalidLogLevel(level))?
            }
            None => LevelFilter::Info,
        };

        Ok(Settings {
            db_path,
            api_url,
            log_level,
        })
    }
}
