use anyhow::{Result, bail};
use std::env;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_THEME: &str = "default";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration sourced from environment variables. `OPENAI_API_KEY`
/// is the only mandatory variable; everything else has a documented fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub debug: bool,
    pub log_level: String,
    pub theme: String,
    /// Parsed and carried for forward compatibility. The client makes exactly
    /// one attempt per prompt and does not consult this value.
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let api_key = get_var("OPENAI_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let Some(api_key) = api_key else {
            bail!("OPENAI_API_KEY environment variable is required");
        };

        Ok(Self {
            api_key,
            base_url: get_var("OPENAI_BASE_URL")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get_var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            debug: parse_bool(get_var("DEBUG").as_deref(), false),
            log_level: get_var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            theme: get_var("THEME").unwrap_or_else(|| DEFAULT_THEME.to_string()),
            max_retries: parse_u32(get_var("MAX_RETRIES").as_deref(), DEFAULT_MAX_RETRIES),
            timeout_secs: parse_timeout_secs(get_var("TIMEOUT").as_deref()),
        })
    }
}

fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

fn parse_u32(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
