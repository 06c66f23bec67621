//! Runtime configuration read from the environment (optionally seeded from `.env`).
//!
//! Credentials only ever come from here; nothing secret is compiled into the binary.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("typing delay range is inverted: {min_ms}ms > {max_ms}ms")]
    TypingRange { min_ms: u64, max_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingSettings {
    pub typing_delay_min: Duration,
    pub typing_delay_max: Duration,
    pub quiz_question_delay: Duration,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            typing_delay_min: Duration::from_millis(800),
            typing_delay_max: Duration::from_millis(1600),
            quiz_question_delay: Duration::from_millis(1500),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct AssistantSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub timeout: Duration,
}

// Keeps the key out of logs.
impl fmt::Debug for AssistantSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantSettings")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub timing: TimingSettings,
    /// `None` when no API key is configured; assistant sessions then answer locally.
    pub assistant: Option<AssistantSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TimingSettings::default();
        let min_ms = parse_or(
            &lookup,
            "TYPING_DELAY_MIN_MS",
            defaults.typing_delay_min.as_millis() as u64,
        )?;
        let max_ms = parse_or(
            &lookup,
            "TYPING_DELAY_MAX_MS",
            defaults.typing_delay_max.as_millis() as u64,
        )?;
        if min_ms > max_ms {
            return Err(SettingsError::TypingRange { min_ms, max_ms });
        }
        let quiz_ms = parse_or(
            &lookup,
            "QUIZ_QUESTION_DELAY_MS",
            defaults.quiz_question_delay.as_millis() as u64,
        )?;

        let timing = TimingSettings {
            typing_delay_min: Duration::from_millis(min_ms),
            typing_delay_max: Duration::from_millis(max_ms),
            quiz_question_delay: Duration::from_millis(quiz_ms),
        };

        let assistant = match lookup("ASSISTANT_API_KEY").filter(|key| !key.trim().is_empty()) {
            Some(api_key) => Some(AssistantSettings {
                api_key,
                api_url: lookup("ASSISTANT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
                model: lookup("ASSISTANT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
                temperature: parse_or(&lookup, "ASSISTANT_TEMPERATURE", 0.7)?,
                max_tokens: parse_or(&lookup, "ASSISTANT_MAX_TOKENS", 300)?,
                max_retries: parse_or(&lookup, "ASSISTANT_MAX_RETRIES", 3)?,
                timeout: Duration::from_secs(parse_or(&lookup, "ASSISTANT_TIMEOUT_SECS", 15)?),
            }),
            None => None,
        };

        Ok(Self { timing, assistant })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| SettingsError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, SettingsError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let settings = settings(&[]).expect("defaults are valid");
        assert_eq!(settings.timing, TimingSettings::default());
        assert!(settings.assistant.is_none());
    }

    #[test]
    fn assistant_is_configured_by_api_key() {
        let settings = settings(&[
            ("ASSISTANT_API_KEY", "sk-test"),
            ("ASSISTANT_MAX_RETRIES", "5"),
            ("ASSISTANT_MODEL", "gpt-4o-mini"),
        ])
        .expect("valid settings");
        let assistant = settings.assistant.expect("assistant configured");
        assert_eq!(assistant.api_key, "sk-test");
        assert_eq!(assistant.max_retries, 5);
        assert_eq!(assistant.model, "gpt-4o-mini");
        assert_eq!(assistant.api_url, DEFAULT_API_URL);
        assert_eq!(assistant.timeout, Duration::from_secs(15));
    }

    #[test]
    fn blank_api_key_means_local_only() {
        let settings = settings(&[("ASSISTANT_API_KEY", "  ")]).expect("valid settings");
        assert!(settings.assistant.is_none());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let settings = settings(&[("ASSISTANT_API_KEY", "sk-secret")]).expect("valid settings");
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("sk-secret"));
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert_eq!(
            settings(&[("QUIZ_QUESTION_DELAY_MS", "soon")]),
            Err(SettingsError::Invalid {
                key: "QUIZ_QUESTION_DELAY_MS",
                value: "soon".to_string(),
            })
        );
    }

    #[test]
    fn rejects_inverted_typing_range() {
        assert_eq!(
            settings(&[("TYPING_DELAY_MIN_MS", "900"), ("TYPING_DELAY_MAX_MS", "100")]),
            Err(SettingsError::TypingRange {
                min_ms: 900,
                max_ms: 100
            })
        );
    }
}
