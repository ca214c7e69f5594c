use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::docs::DEFAULT_PAGE_CEILING;

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "nousresearch/deephermes-3-mistral-24b-preview:free";

/// Limits applied when turning a document and a conversation into a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextPolicy {
    /// Pages read from a document before extraction stops.
    pub page_ceiling: usize,
    /// Characters of extracted text forwarded to the model.
    pub preview_chars: usize,
    /// Prior turns forwarded with each request.
    pub history_window: usize,
    /// Documents above this page count get an advisory when a request fails.
    pub oversized_page_threshold: usize,
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self {
            page_ceiling: DEFAULT_PAGE_CEILING,
            preview_chars: 500,
            history_window: 4,
            oversized_page_threshold: 10,
        }
    }
}

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub referer: String,
    pub title: String,
    pub policy: ContextPolicy,
}

impl ChatConfig {
    /// Read settings from the environment (and `.env`, if the caller loaded it).
    pub fn from_env() -> Result<Self> {
        let endpoint =
            dotenv::var("AICHAT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = dotenv::var("AICHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = dotenv::var("AICHAT_API_KEY")
            .or_else(|_| dotenv::var("OPENROUTER_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
        let timeout = Duration::from_secs(env_number("AICHAT_TIMEOUT_SECS", 60)?);
        let referer =
            dotenv::var("AICHAT_REFERER").unwrap_or_else(|_| "http://localhost".to_string());
        let title = dotenv::var("AICHAT_TITLE").unwrap_or_else(|_| "AIChat".to_string());

        let defaults = ContextPolicy::default();
        let policy = ContextPolicy {
            page_ceiling: env_number("AICHAT_PAGE_CEILING", defaults.page_ceiling)?,
            history_window: env_number("AICHAT_HISTORY_WINDOW", defaults.history_window)?,
            ..defaults
        };

        if policy.page_ceiling == 0 {
            anyhow::bail!("AICHAT_PAGE_CEILING must be > 0");
        }

        Ok(Self {
            endpoint,
            model,
            api_key,
            timeout,
            referer,
            title,
            policy,
        })
    }
}

fn env_number<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenv::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}
