//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Nothing
//! in this crate reads process-wide environment variables while handling a request; binaries
//! read the environment and hand the raw values to the `*_from_env_value(s)` helpers below.

use crate::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL, DEFAULT_TEMPERATURE, DEFAULT_VISIT_DATA_DIR, RECORDS_DIR_NAME,
};
use crate::{NoteError, NoteResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    visit_data_dir: PathBuf,
    ai: AiConfig,
}

impl CoreConfig {
    pub fn new(visit_data_dir: PathBuf, ai: AiConfig) -> Self {
        Self { visit_data_dir, ai }
    }

    pub fn visit_data_dir(&self) -> &Path {
        &self.visit_data_dir
    }

    pub fn records_dir(&self) -> PathBuf {
        self.visit_data_dir.join(RECORDS_DIR_NAME)
    }

    pub fn ai(&self) -> &AiConfig {
        &self.ai
    }
}

/// Settings for the language-model client.
///
/// The API key is optional so the service can start (and parse, and serve stored records)
/// without one; generation then fails with [`crate::ai::AiError::NotConfigured`].
#[derive(Clone)]
pub struct AiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: u32,
    max_attempts: u32,
}

impl AiConfig {
    /// Create a new `AiConfig` with the default generation limits.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::InvalidInput` if:
    /// - `model` is empty,
    /// - `base_url` is not an absolute http(s) URL,
    /// - `base_url` embeds credentials.
    pub fn new(api_key: Option<String>, model: String, base_url: &str) -> NoteResult<Self> {
        if model.trim().is_empty() {
            return Err(NoteError::InvalidInput("model name cannot be empty".into()));
        }

        let cleaned = base_url.trim().trim_end_matches('/');
        let parsed = reqwest::Url::parse(cleaned).map_err(|e| {
            NoteError::InvalidInput(format!("invalid AI base URL '{cleaned}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NoteError::InvalidInput(format!(
                "AI base URL must use http or https, got: {}",
                parsed.scheme()
            )));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(NoteError::InvalidInput(
                "AI base URL must not contain credentials".into(),
            ));
        }

        Ok(Self {
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            model: model.trim().to_string(),
            base_url: cleaned.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Overrides the number of attempts per generation call (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Build an [`AiConfig`] from optional raw environment values.
///
/// Empty or whitespace-only values fall back to the defaults.
pub fn ai_config_from_env_values(
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
) -> NoteResult<AiConfig> {
    let model = non_blank(model).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
    let base_url = non_blank(base_url).unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
    AiConfig::new(api_key, model, &base_url)
}

/// Resolve the visit data directory, defaulting to [`DEFAULT_VISIT_DATA_DIR`].
pub fn visit_data_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_VISIT_DATA_DIR))
}

/// Parse a comma-separated CORS origin list.
///
/// Returns `None` when nothing usable is configured, meaning "allow any origin".
pub fn allowed_origins_from_env_value(value: Option<String>) -> Option<Vec<String>> {
    let origins: Vec<String> = value?
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();
    if origins.is_empty() {
        None
    } else {
        Some(origins)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let cfg = ai_config_from_env_values(None, None, None).unwrap();
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.model(), DEFAULT_OPENAI_MODEL);
        assert_eq!(cfg.base_url(), DEFAULT_OPENAI_BASE_URL);
        assert_eq!(cfg.max_output_tokens(), 3000);
        assert_eq!(cfg.max_attempts(), 3);
    }

    #[test]
    fn test_ai_config_blank_key_is_unset_and_trailing_slash_trimmed() {
        let cfg = ai_config_from_env_values(
            Some("   ".into()),
            Some(" gpt-4.1 ".into()),
            Some("http://localhost:4000/".into()),
        )
        .unwrap();
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.model(), "gpt-4.1");
        assert_eq!(cfg.base_url(), "http://localhost:4000");
    }

    #[test]
    fn test_ai_config_rejects_bad_urls() {
        assert!(AiConfig::new(None, "m".into(), "ftp://example.com").is_err());
        assert!(AiConfig::new(None, "m".into(), "not a url").is_err());
        assert!(AiConfig::new(None, "m".into(), "https://user:pw@example.com").is_err());
    }

    #[test]
    fn test_ai_config_debug_redacts_key() {
        let cfg = AiConfig::new(Some("sk-secret".into()), "m".into(), "https://x.test").unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_visit_data_dir_default() {
        assert_eq!(
            visit_data_dir_from_env_value(Some("".into())),
            PathBuf::from(DEFAULT_VISIT_DATA_DIR)
        );
        assert_eq!(
            visit_data_dir_from_env_value(Some("/srv/visits".into())),
            PathBuf::from("/srv/visits")
        );
    }

    #[test]
    fn test_allowed_origins_parsing() {
        assert_eq!(allowed_origins_from_env_value(None), None);
        assert_eq!(allowed_origins_from_env_value(Some(" , ".into())), None);
        assert_eq!(
            allowed_origins_from_env_value(Some(
                "https://a.example, https://b.example,".into()
            )),
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }
}
