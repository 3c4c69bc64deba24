use std::env;

pub const DEFAULT_MODEL: &str = "llama-3.2-90b-text-preview";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// `None` when no API key is set; every other setting has a default.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup("WAYFARER_LLM_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())?;

        Some(Self {
            api_key,
            model: lookup("WAYFARER_LLM_MODEL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("WAYFARER_LLM_BASE_URL")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: max_tokens_from_lookup(&lookup),
        })
    }
}

/// Token limit from `WAYFARER_MAX_TOKENS`, read whether or not an API key is set.
pub fn max_tokens_from_env() -> u32 {
    max_tokens_from_lookup(|key| env::var(key).ok())
}

pub fn max_tokens_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> u32 {
    max_tokens_from(lookup("WAYFARER_MAX_TOKENS"))
}

fn max_tokens_from(value: Option<String>) -> u32 {
    value
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_TOKENS)
}
