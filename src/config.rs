//! Runtime configuration, read once from the environment and passed down.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::PipelineError;

pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_VS_CURRENCY: &str = "usd";
pub const DEFAULT_PRICE_CHANGE_WINDOWS: &str = "1h,24h,7d";
pub const DEFAULT_TARGET_ROWS: usize = 250;
pub const DEFAULT_MAX_PER_PAGE: usize = 250;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub vs_currency: String,
    pub price_change_windows: String,
}

/// Pagination knobs for one fetch phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub target_rows: usize,
    pub max_per_page: usize,
    pub request_delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            target_rows: DEFAULT_TARGET_ROWS,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub database_url: String,
    pub coingecko: CoinGeckoConfig,
    pub fetch: FetchSettings,
}

impl PipelineConfig {
    /// Read configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| PipelineError::Config {
                key: "DATABASE_URL",
                message: "must be set".to_string(),
            })?;

        let coingecko = CoinGeckoConfig {
            base_url: lookup("COINGECKO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COINGECKO_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: lookup("COINGECKO_API_KEY").filter(|key| !key.trim().is_empty()),
            vs_currency: lookup("VS_CURRENCY").unwrap_or_else(|| DEFAULT_VS_CURRENCY.to_string()),
            price_change_windows: lookup("PRICE_CHANGE_WINDOWS")
                .unwrap_or_else(|| DEFAULT_PRICE_CHANGE_WINDOWS.to_string()),
        };

        let target_rows = parse_or(&lookup, "TARGET_ROWS", DEFAULT_TARGET_ROWS)?;
        let max_per_page = parse_or(&lookup, "MAX_PER_PAGE", DEFAULT_MAX_PER_PAGE)?;
        let delay_ms = parse_or(&lookup, "REQUEST_DELAY_MS", DEFAULT_REQUEST_DELAY_MS)?;

        if target_rows == 0 {
            return Err(PipelineError::Config {
                key: "TARGET_ROWS",
                message: "must be greater than zero".to_string(),
            });
        }
        if max_per_page == 0 {
            return Err(PipelineError::Config {
                key: "MAX_PER_PAGE",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            database_url,
            coingecko,
            fetch: FetchSettings {
                target_rows,
                max_per_page,
                request_delay: Duration::from_millis(delay_ms),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, PipelineError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| PipelineError::Config {
            key,
            message: format!("'{}' is not valid: {}", raw, e),
        }),
    }
}
