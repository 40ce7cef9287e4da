use std::time::Duration;
use thiserror::Error;

use crate::utils::api_ratelimit::DEFAULT_MAX_REQUESTS_PER_SECOND;

const DEFAULT_CACHE_TTL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// Wallet API root, e.g. `https://wallet.example.com/api/v1`
    pub api_base_url: String,
    /// 64 hex chars; a random key is generated when absent
    pub encryption_key: Option<String>,
    pub cache_ttl: Duration,
    pub api_rate_limit: usize,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let discord_token = required("DISCORD_TOKEN")?;
        let api_base_url = required("WALLET_API_URL")?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "WALLET_API_URL",
                value: api_base_url,
            });
        }

        let encryption_key = lookup("TOKEN_ENCRYPTION_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let cache_ttl_secs = parse_number(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let api_rate_limit = parse_number(
            &lookup,
            "WALLET_API_RATE_LIMIT",
            DEFAULT_MAX_REQUESTS_PER_SECOND as u64,
        )?;
        if api_rate_limit == 0 {
            return Err(ConfigError::Invalid {
                name: "WALLET_API_RATE_LIMIT",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            discord_token,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            encryption_key,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            api_rate_limit: api_rate_limit as usize,
        })
    }
}

fn parse_number<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
