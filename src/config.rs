//! Process configuration
//!
//! Read once in `main` and injected everywhere else; nothing below `main`
//! looks at the environment.

use crate::llm::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_REFERER, DEFAULT_TIMEOUT};
use std::fmt;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;

/// Path appended to `OPENROUTER_BASE_URL`
const COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Clone)]
pub struct SkillConfig {
    /// Completion API key; absence is answered with a spoken apology
    pub api_key: Option<String>,
    /// Full chat-completions URL
    pub endpoint: String,
    pub model: String,
    pub referer: String,
    pub timeout: Duration,
    pub port: u16,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            port: DEFAULT_PORT,
        }
    }
}

impl SkillConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty()),
            endpoint: lookup("OPENROUTER_BASE_URL")
                .filter(|base| !base.trim().is_empty())
                .map_or(defaults.endpoint, |base| completions_url(&base)),
            model: lookup("SKILL_MODEL").unwrap_or(defaults.model),
            referer: lookup("SKILL_HTTP_REFERER").unwrap_or(defaults.referer),
            timeout: lookup("SKILL_TIMEOUT_MS")
                .and_then(|ms| ms.parse().ok())
                .map_or(defaults.timeout, Duration::from_millis),
            port: lookup("SKILL_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

/// Chat-completions URL under an API base such as `https://openrouter.ai/api/v1`
fn completions_url(base: &str) -> String {
    format!("{}{COMPLETIONS_PATH}", base.trim().trim_end_matches('/'))
}

impl fmt::Debug for SkillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("referer", &self.referer)
            .field("timeout", &self.timeout)
            .field("port", &self.port)
            .finish()
    }
}
