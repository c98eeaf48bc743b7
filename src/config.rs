use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Duration;

pub const SERVER_URL_ENV_VAR: &str = "RECIPE_SUGGEST_SERVER_URL";
pub const TIMEOUT_ENV_VAR: &str = "RECIPE_SUGGEST_TIMEOUT_SECS";

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestConfig {
    /// Base URL of the suggestion service
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl SuggestConfig {
    /// Reads the process environment. `main` loads `.env` once at startup, before
    /// logging is initialised, so `RUST_LOG` set there applies too.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            server_url: lookup(SERVER_URL_ENV_VAR).unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            request_timeout_secs: match lookup(TIMEOUT_ENV_VAR) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV_VAR, raw))?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, server_url: Option<String>, timeout_secs: Option<u64>) -> Result<Self> {
        if let Some(url) = server_url {
            self.server_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.request_timeout_secs = secs;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.server_url)
            .with_context(|| format!("Server URL '{}' is not a valid URL", self.server_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Server URL must use http or https, got '{}'", url.scheme());
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be greater than 0");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
