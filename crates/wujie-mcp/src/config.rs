use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const WUJIE_API_KEY: &str = "WUJIE_API_KEY";
pub const WUJIE_BASE_URL: &str = "WUJIE_BASE_URL";
pub const WUJIE_DEFAULT_MODEL: &str = "WUJIE_DEFAULT_MODEL";
pub const WUJIE_POLL_INTERVAL_MS: &str = "WUJIE_POLL_INTERVAL_MS";
pub const WUJIE_TIMEOUT_MULTIPLIER: &str = "WUJIE_TIMEOUT_MULTIPLIER";
pub const WUJIE_MAX_POLL_SECS: &str = "WUJIE_MAX_POLL_SECS";
pub const WUJIE_HTTP_TIMEOUT_SECS: &str = "WUJIE_HTTP_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://pref-gate.wujieai.com";
pub const DEFAULT_MODEL: i64 = 1018;
pub const DEFAULT_NUM: u32 = 1;
pub const DEFAULT_DIMENSION: u32 = 512;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_TIMEOUT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_MAX_POLL_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

pub const CREATE_TASK_PATH: &str = "/wj-open/v2/ai/create";
pub const QUERY_TASK_PATH: &str = "/wj-open/v2/ai/info";
pub const MODEL_INFOS_PATH: &str = "/wj-open/v2/ai/model_base_infos";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("WUJIE_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Knobs for one reconciliation loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout_multiplier: f64,
    /// Hard cap on total polling time, independent of the service estimate.
    pub max_poll_time: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout_multiplier: DEFAULT_TIMEOUT_MULTIPLIER,
            max_poll_time: Duration::from_secs(DEFAULT_MAX_POLL_SECS),
        }
    }
}

/// Immutable runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct WujieConfig {
    pub base_url: Url,
    pub api_key: String,
    pub default_model: i64,
    pub http_timeout: Duration,
    pub poll: PollSettings,
}

impl WujieConfig {
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            default_model: DEFAULT_MODEL,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            poll: PollSettings::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Loads `.env` (if any) and then reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(WUJIE_API_KEY)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let raw_base = std::env::var(WUJIE_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let base_url = Url::parse(&raw_base).map_err(|_| ConfigError::InvalidValue {
            key: WUJIE_BASE_URL,
            value: raw_base.clone(),
        })?;

        let poll = PollSettings {
            interval: Duration::from_millis(env_or(
                WUJIE_POLL_INTERVAL_MS,
                DEFAULT_POLL_INTERVAL_MS,
            )?),
            timeout_multiplier: env_or(WUJIE_TIMEOUT_MULTIPLIER, DEFAULT_TIMEOUT_MULTIPLIER)?,
            max_poll_time: Duration::from_secs(env_or(WUJIE_MAX_POLL_SECS, DEFAULT_MAX_POLL_SECS)?),
        };
        if poll.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: WUJIE_POLL_INTERVAL_MS,
                value: "0".to_string(),
            });
        }
        if !(poll.timeout_multiplier.is_finite() && poll.timeout_multiplier > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: WUJIE_TIMEOUT_MULTIPLIER,
                value: poll.timeout_multiplier.to_string(),
            });
        }

        Ok(Self {
            base_url,
            api_key,
            default_model: env_or(WUJIE_DEFAULT_MODEL, DEFAULT_MODEL)?,
            http_timeout: Duration::from_secs(env_or(
                WUJIE_HTTP_TIMEOUT_SECS,
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            poll,
        })
    }

    /// The credential with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        }
        _ => Ok(default),
    }
}
