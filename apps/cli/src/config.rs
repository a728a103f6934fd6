use std::str::FromStr;
use std::time::Duration;

use markets_sdk::{CircuitBreakerConfig, RetryConfig};

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RETRY_MAX: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;
const DEFAULT_BREAKER_THRESHOLD: u32 = 5;
const DEFAULT_BREAKER_RESET_MS: u64 = 30_000;
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;

pub struct Config {
    pub request_timeout: Duration,
    pub retry: RetryConfig,
    pub breaker: CircuitBreakerConfig,
    pub rate_limit_rps: u32,
    pub coingecko_base_url: Option<String>,
    pub yahoo_base_url: Option<String>,
}

impl Config {
    /// Read `MARKETS_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout_ms = parse_or(
            &lookup,
            "MARKETS_REQUEST_TIMEOUT_MS",
            DEFAULT_REQUEST_TIMEOUT_MS,
            1,
        );
        let retry_max = parse_or(&lookup, "MARKETS_RETRY_MAX", DEFAULT_RETRY_MAX, 0);
        let retry_base_ms = parse_or(
            &lookup,
            "MARKETS_RETRY_BASE_DELAY_MS",
            DEFAULT_RETRY_BASE_DELAY_MS,
            0,
        );
        let breaker_threshold = parse_or(
            &lookup,
            "MARKETS_BREAKER_THRESHOLD",
            DEFAULT_BREAKER_THRESHOLD,
            1,
        );
        let breaker_reset_ms = parse_or(
            &lookup,
            "MARKETS_BREAKER_RESET_MS",
            DEFAULT_BREAKER_RESET_MS,
            0,
        );
        let rate_limit_rps = parse_or(
            &lookup,
            "MARKETS_RATE_LIMIT_RPS",
            DEFAULT_RATE_LIMIT_RPS,
            1,
        );

        let base_url = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            request_timeout: Duration::from_millis(timeout_ms),
            retry: RetryConfig {
                max_retries: retry_max,
                base_delay: Duration::from_millis(retry_base_ms),
            },
            breaker: CircuitBreakerConfig {
                failure_threshold: breaker_threshold,
                reset_timeout: Duration::from_millis(breaker_reset_ms),
            },
            rate_limit_rps,
            coingecko_base_url: base_url("MARKETS_COINGECKO_BASE_URL"),
            yahoo_base_url: base_url("MARKETS_YAHOO_BASE_URL"),
        }
    }
}

/// Parse `key`, falling back to `default` when it is unset, malformed or below `min`.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T, min: T) -> T
where
    T: FromStr + Copy + PartialOrd + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value >= min => value,
        _ => {
            tracing::warn!("Invalid {}={:?}, using default {}", key, raw, default);
            default
        }
    }
}
