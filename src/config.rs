use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SITE_URL: &str = "http://localhost";
pub const DEFAULT_APP_NAME: &str = "prompt2svg";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PORT: u16 = 8080;

/// Process configuration, read once at startup and handed to the upstream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub site_url: String,
    pub app_name: String,
    pub timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_key: non_empty("OPENROUTER_API_KEY"),
            api_base: non_empty("OPENROUTER_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            site_url: non_empty("OPENROUTER_SITE_URL").unwrap_or(defaults.site_url),
            app_name: non_empty("OPENROUTER_APP_NAME").unwrap_or(defaults.app_name),
            timeout: non_empty("OPENROUTER_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            port: non_empty("PORT").and_then(|v| v.parse().ok()).unwrap_or(defaults.port),
        }
    }
}
