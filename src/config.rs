use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com/search.json";
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Process configuration, read once at startup and handed to each client.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub upstream_timeout: Option<Duration>,
    pub search: SearchConfig,
    pub model: ModelConfig,
    pub widgets: WidgetConfig,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub url: String,
    pub hl: String,
    pub gl: String,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default)]
pub struct WidgetConfig {
    pub openweather_api_key: Option<String>,
    pub openweather_url: String,
    pub alpha_vantage_api_key: Option<String>,
    pub alpha_vantage_url: String,
}

impl Config {
    /// Reads the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let upstream_timeout = get("UPSTREAM_TIMEOUT_SECS")
            .map(|v| parse_value::<u64>("UPSTREAM_TIMEOUT_SECS", v))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Config {
            bind_addr: get_or_default(&get, "BIND_ADDR", DEFAULT_BIND_ADDR),
            upstream_timeout,
            search: SearchConfig {
                api_key: get_required(&get, "SERPAPI_KEY")?,
                url: get_or_default(&get, "SERPAPI_URL", DEFAULT_SERPAPI_URL),
                hl: get_or_default(&get, "SEARCH_LOCALE_HL", "en"),
                gl: get_or_default(&get, "SEARCH_LOCALE_GL", "us"),
            },
            model: ModelConfig {
                api_key: get_required(&get, "ANTHROPIC_API_KEY")?,
                url: get_or_default(&get, "ANTHROPIC_URL", DEFAULT_ANTHROPIC_URL),
                model: get_or_default(&get, "ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
                max_tokens: parse_value(
                    "ANTHROPIC_MAX_TOKENS",
                    get_or_default(&get, "ANTHROPIC_MAX_TOKENS", "2000"),
                )?,
                temperature: parse_value(
                    "ANTHROPIC_TEMPERATURE",
                    get_or_default(&get, "ANTHROPIC_TEMPERATURE", "0.7"),
                )?,
            },
            widgets: WidgetConfig {
                openweather_api_key: get("OPENWEATHER_API_KEY"),
                openweather_url: get_or_default(&get, "OPENWEATHER_URL", DEFAULT_OPENWEATHER_URL),
                alpha_vantage_api_key: get("ALPHA_VANTAGE_API_KEY"),
                alpha_vantage_url: get_or_default(
                    &get,
                    "ALPHA_VANTAGE_URL",
                    DEFAULT_ALPHA_VANTAGE_URL,
                ),
            },
        })
    }

    /// Shared reqwest client for every upstream, honouring the optional deadline.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

fn get_required(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    get(key).ok_or(ConfigError::Missing(key))
}

fn get_or_default(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get(key).unwrap_or_else(|| default.to_string())
}

fn parse_value<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
