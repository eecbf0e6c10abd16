use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use murmur_types::models::UserId;

const DEFAULT_DATABASE_PATH: &str = "murmur.db";
const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub struct BotConfig {
    pub token: String,
    pub channel: String,
    pub owner: UserId,
    pub database_path: PathBuf,
    pub api_url: String,
    pub poll_timeout_secs: u64,
    pub request_timeout: Duration,
    pub creator_url: Option<String>,
    pub developer_url: Option<String>,
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("channel", &self.channel)
            .field("owner", &self.owner)
            .field("database_path", &self.database_path)
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let token = required("BOT_TOKEN")?;

        let channel = required("PUBLIC_CHANNEL")?;
        if !channel.starts_with('@') || channel.len() < 2 {
            return Err(ConfigError::Invalid {
                name: "PUBLIC_CHANNEL",
                reason: format!("expected a handle like @channel, got {:?}", channel),
            });
        }

        let owner: UserId = required("OWNER_ID")?
            .parse()
            .map_err(|e| ConfigError::Invalid { name: "OWNER_ID", reason: format!("{}", e) })?;

        let parse_secs = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match get(key) {
                None => Ok(default),
                Some(v) => match v.parse::<u64>() {
                    Ok(0) => Err(ConfigError::Invalid { name: key, reason: "must be positive".into() }),
                    Ok(secs) => Ok(secs),
                    Err(e) => Err(ConfigError::Invalid { name: key, reason: e.to_string() }),
                },
            }
        };

        Ok(Self {
            token,
            channel,
            owner,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.into()).into(),
            api_url: get("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            poll_timeout_secs: parse_secs("POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?,
            request_timeout: Duration::from_secs(parse_secs(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            creator_url: get("CREATOR_URL"),
            developer_url: get("DEVELOPER_URL"),
        })
    }
}
