use std::path::PathBuf;

use interfaces_github_trending::index::{ParseTimeframeError, Timeframe};
use thiserror::Error;

use crate::history::store::DEFAULT_HISTORY_FILE;

pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHANNEL_ID: &str = "TELEGRAM_CHANNEL_ID";
pub const TRENDING_SINCE: &str = "TRENDING_SINCE";
pub const TRENDING_HISTORY_FILE: &str = "TRENDING_HISTORY_FILE";
pub const TRENDING_LOG_LEVEL: &str = "TRENDING_LOG_LEVEL";
pub const TRENDING_LOG_FILE: &str = "TRENDING_LOG_FILE";

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Dotenv: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },

    #[error("TRENDING_SINCE: {source}")]
    InvalidTimeframe {
        #[from]
        source: ParseTimeframeError,
    },
}

/// Process settings. Credentials stay optional here; whether they are
/// required depends on the sender chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub since: Option<Timeframe>,
    pub history_file: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let since = get(TRENDING_SINCE)
            .map(|value| value.parse::<Timeframe>())
            .transpose()?;

        Ok(Self {
            telegram_token: get(TELEGRAM_BOT_TOKEN),
            telegram_chat_id: get(TELEGRAM_CHANNEL_ID),
            since,
            history_file: get(TRENDING_HISTORY_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE)),
            log_level: get(TRENDING_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: get(TRENDING_LOG_FILE).map(PathBuf::from),
        })
    }
}

/// Loads `.env` into the process environment if one exists. Returns the path
/// that was read.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(source) => Err(ConfigError::Dotenv { source }),
    }
}
