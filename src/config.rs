use anyhow::{Context, Result};
use std::time::Duration;

use crate::constants::{FAILED_QUERY_CAPACITY, NWS_API_BASE, REQUEST_TIMEOUT_SECS, USER_AGENT};

/// Runtime settings for the weather service
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub failed_query_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: NWS_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            failed_query_capacity: FAILED_QUERY_CAPACITY,
        }
    }
}

impl Config {
    /// Builds the configuration from `WEATHER_*` environment variables,
    /// falling back to the defaults for anything unset
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base) = lookup("WEATHER_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(agent) = lookup("WEATHER_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = lookup("WEATHER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("WEATHER_TIMEOUT_SECS must be whole seconds, got {secs:?}"))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = lookup("WEATHER_FAILED_QUERY_CAPACITY") {
            config.failed_query_capacity = capacity.trim().parse().with_context(|| {
                format!("WEATHER_FAILED_QUERY_CAPACITY must be a count, got {capacity:?}")
            })?;
        }

        Ok(config)
    }
}
