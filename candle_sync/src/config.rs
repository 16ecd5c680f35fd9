//! Service configuration: defaults, an optional TOML file, then environment overrides.
//!
//! Every field has a default, so the file may set any subset of them. Unknown
//! keys in the file are rejected. Environment variables win over the file; a
//! variable that is set but cannot be parsed is an error rather than a silent
//! fallback. The upstream API key is only ever read from the environment.
//!
//! ```toml
//! port = 8080
//! timeframe = "15m"
//! lookback_days = 3
//! batch_size = 20
//! ```

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use market_data_ingestor::{
    models::timeframe::TimeFrame, providers::hyperliquid::BASE_URL,
    requests::historical::RetryPolicy,
};
use secrecy::SecretString;
use serde::Deserialize;
use shared_utils::env::{EnvParseError, env_or, get_env_opt};
use thiserror::Error;

use crate::refresh::CandleSettings;

pub const API_KEY_ENV: &str = "UPSTREAM_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Env(#[from] EnvParseError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub port: u16,
    pub bind: IpAddr,
    /// Candle width requested from the upstream.
    pub timeframe: TimeFrame,
    /// How far back each fetch window reaches.
    pub lookback_days: u32,
    pub refresh_interval_min: u64,
    pub symbol_refresh_interval_min: u64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub upstream_url: String,
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            timeframe: TimeFrame::default(),
            lookback_days: 7,
            refresh_interval_min: 5,
            symbol_refresh_interval_min: 60,
            batch_size: 10,
            batch_delay_ms: 200,
            max_attempts: 3,
            retry_base_delay_ms: 1000,
            upstream_url: BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl SyncConfig {
    /// Loads the effective configuration: file (if given), then environment, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document on top of the defaults. No env, no validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.port = env_or("PORT", self.port)?;
        self.bind = env_or("BIND", self.bind)?;
        self.timeframe = env_or("CANDLE_INTERVAL", self.timeframe)?;
        self.lookback_days = env_or("CANDLE_DAYS", self.lookback_days)?;
        self.refresh_interval_min = env_or("REFRESH_INTERVAL_MIN", self.refresh_interval_min)?;
        self.symbol_refresh_interval_min =
            env_or("SYMBOL_REFRESH_INTERVAL_MIN", self.symbol_refresh_interval_min)?;
        self.batch_size = env_or("BATCH_SIZE", self.batch_size)?;
        self.batch_delay_ms = env_or("BATCH_DELAY_MS", self.batch_delay_ms)?;
        self.max_attempts = env_or("FETCH_MAX_ATTEMPTS", self.max_attempts)?;
        self.retry_base_delay_ms = env_or("RETRY_BASE_DELAY_MS", self.retry_base_delay_ms)?;
        if let Some(url) = get_env_opt("UPSTREAM_URL") {
            self.upstream_url = url;
        }

        if let Some(key) = get_env_opt(API_KEY_ENV) {
            self.api_key = Some(SecretString::from(key));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid =
            |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg.to_string())) };

        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1");
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be at least 1");
        }
        if self.refresh_interval_min == 0 || self.symbol_refresh_interval_min == 0 {
            return invalid("refresh intervals must be at least one minute");
        }
        if self.lookback_days == 0 {
            return invalid("lookback_days must be at least 1");
        }
        if self.upstream_url.trim().is_empty() {
            return invalid("upstream_url must not be empty");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn candle_period(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_min * 60)
    }

    pub fn symbol_period(&self) -> Duration {
        Duration::from_secs(self.symbol_refresh_interval_min * 60)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    pub fn candle_settings(&self) -> CandleSettings {
        CandleSettings {
            timeframe: self.timeframe,
            lookback: chrono::Duration::days(i64::from(self.lookback_days)),
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            retry: self.retry_policy(),
        }
    }
}
