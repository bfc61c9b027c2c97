use gateway_core::config as core_config;
use gateway_core::config::get_env;
use gateway_core::error::AppError;
use serde::Deserialize;
use std::env;

/// Successful generations a session gets before the cooldown arms.
const DEFAULT_THRESHOLD: u32 = 5;
/// Cooldown window after the threshold is reached (15 minutes).
const DEFAULT_COOLDOWN_SECS: u64 = 900;
/// Timeout for calls to the generation and search endpoints.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub upstream: UpstreamConfig,
    pub rate_limit: RateLimitConfig,
    /// Whether regeneration requests consult the session gate and count
    /// toward the threshold.
    pub gate_regeneration: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub generation_url: String,
    pub search_url: String,
    /// Static key sent as the Authorization header value when set.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub threshold: u32,
    pub cooldown_secs: u64,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        Ok(GatewayConfig {
            common,
            upstream: UpstreamConfig {
                generation_url: get_env(
                    "GENERATION_API_URL",
                    Some("http://localhost:5000/generate"),
                    is_prod,
                )?,
                search_url: get_env(
                    "SEARCH_API_URL",
                    Some("http://localhost:5000/search"),
                    is_prod,
                )?,
                api_key: env::var("API_KEY").ok(),
                timeout_secs: get_env(
                    "UPSTREAM_TIMEOUT_SECS",
                    Some(&DEFAULT_TIMEOUT_SECS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            rate_limit: RateLimitConfig {
                threshold: get_env(
                    "RATE_LIMIT_THRESHOLD",
                    Some(&DEFAULT_THRESHOLD.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_THRESHOLD),
                cooldown_secs: get_env(
                    "RATE_LIMIT_COOLDOWN_SECS",
                    Some(&DEFAULT_COOLDOWN_SECS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_COOLDOWN_SECS),
            },
            gate_regeneration: get_env("GATE_REGENERATION", Some("false"), is_prod)?
                .parse()
                .unwrap_or(false),
        })
    }
}
