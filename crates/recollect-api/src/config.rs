//! Server configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use recollect_gemini::{
    DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT_SECS, GeminiConfig,
};
use recollect_interview::domain::profile::RespondentProfile;

use crate::error::AppError;

/// Language narratives are written in unless configured otherwise.
pub const DEFAULT_LANGUAGE: &str = "Korean";

/// Undelivered viewer messages kept per subscriber.
pub const DEFAULT_VIEWER_BUFFER: usize = 32;

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Generation backend settings.
    pub gemini: GeminiConfig,
    /// Per-viewer broadcast buffer.
    pub viewer_buffer: usize,
    /// Narrative language.
    pub language: String,
    /// Respondent of the session created at startup.
    pub initial_profile: RespondentProfile,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `3000`                   |
    /// | `GEMINI_API_KEY`          | required                 |
    /// | `GEMINI_BASE_URL`         | Google endpoint          |
    /// | `GEMINI_TEXT_MODEL`       | `gemini-2.5-flash`       |
    /// | `GEMINI_IMAGE_MODEL`      | `gemini-2.5-flash-image` |
    /// | `GENERATION_TIMEOUT_SECS` | `120`                    |
    /// | `VIEWER_BUFFER`           | `32`                     |
    /// | `NARRATIVE_LANGUAGE`      | `Korean`                 |
    /// | `RESPONDENT_NAME/GENDER/AGE` | unset                 |
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the API key is missing or a number
    /// does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_owned());

        let api_key = var("GEMINI_API_KEY").ok_or_else(|| {
            AppError::Config("GEMINI_API_KEY environment variable must be set".to_owned())
        })?;
        let timeout_secs: u64 = parse(&var, "GENERATION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port: parse(&var, "PORT", 3000)?,
            gemini: GeminiConfig {
                api_key,
                base_url: or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
                text_model: or("GEMINI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
                image_model: or("GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
                timeout: Duration::from_secs(timeout_secs),
            },
            viewer_buffer: parse(&var, "VIEWER_BUFFER", DEFAULT_VIEWER_BUFFER)?,
            language: or("NARRATIVE_LANGUAGE", DEFAULT_LANGUAGE),
            initial_profile: RespondentProfile {
                name: var("RESPONDENT_NAME"),
                gender: var("RESPONDENT_GENDER"),
                age: var("RESPONDENT_AGE"),
            },
        })
    }
}

fn parse<T, F>(var: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_api_key_is_set() {
        // Arrange
        let env = lookup(&[("GEMINI_API_KEY", "k")]);

        // Act
        let config = AppConfig::from_lookup(env).unwrap();

        // Assert
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.gemini.text_model, "gemini-2.5-flash");
        assert_eq!(config.gemini.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.gemini.timeout, Duration::from_secs(120));
        assert_eq!(config.viewer_buffer, 32);
        assert_eq!(config.language, "Korean");
        assert_eq!(config.initial_profile, RespondentProfile::default());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k"), ("PORT", "http")]));
        assert!(matches!(result, Err(AppError::Config(message)) if message.contains("PORT")));
    }

    #[test]
    fn test_overrides_are_read() {
        // Arrange
        let env = lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("PORT", "8080"),
            ("GENERATION_TIMEOUT_SECS", "30"),
            ("NARRATIVE_LANGUAGE", "English"),
            ("RESPONDENT_NAME", "Mina"),
        ]);

        // Act
        let config = AppConfig::from_lookup(env).unwrap();

        // Assert
        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini.timeout, Duration::from_secs(30));
        assert_eq!(config.language, "English");
        assert_eq!(config.initial_profile.name.as_deref(), Some("Mina"));
    }
}
