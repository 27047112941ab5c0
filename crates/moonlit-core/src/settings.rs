//! Client settings and validation.
//!
//! Pure domain types with no infrastructure dependencies. The CLI fills these
//! from flags, environment variables, and `.env`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Default backend address (the companion server's default bind).
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Sample rate assumed when the speech backend does not report one.
pub const DEFAULT_FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// Default voice requested from the speech backend.
pub const DEFAULT_VOICE_NAME: &str = "Silent";

/// Default per-request timeout, long enough for a cold local model.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for the conversation client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientSettings {
    /// Base URL of the backend, without a trailing path.
    pub backend_url: String,

    /// Path of the chat endpoint.
    pub chat_path: String,

    /// Path of the speech-synthesis endpoint.
    pub tts_path: String,

    /// Voice requested from the speech backend.
    pub voice_name: String,

    /// Retry policy applied to every backend call.
    pub retry: RetryPolicy,

    /// Sample rate used when the speech response omits one.
    pub fallback_sample_rate: u32,

    /// Per-attempt request timeout.
    pub request_timeout: Duration,

    /// Whether assistant replies are spoken automatically.
    pub auto_speak: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            chat_path: "/api/chat".to_string(),
            tts_path: "/api/tts".to_string(),
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            retry: RetryPolicy::default(),
            fallback_sample_rate: DEFAULT_FALLBACK_SAMPLE_RATE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auto_speak: true,
        }
    }
}

impl ClientSettings {
    /// Full URL of an endpoint path.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    #[must_use]
    pub fn chat_url(&self) -> String {
        self.endpoint_url(&self.chat_path)
    }

    #[must_use]
    pub fn tts_url(&self) -> String {
        self.endpoint_url(&self.tts_path)
    }

    /// Check invariants that serde defaults cannot enforce.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.backend_url.trim().is_empty() {
            return Err(SettingsError::EmptyBackendUrl);
        }
        if self.retry.max_attempts() == 0 {
            return Err(SettingsError::InvalidMaxAttempts(0));
        }
        if self.retry.base_delay_ms() == 0 {
            return Err(SettingsError::InvalidBaseDelay(0));
        }
        if self.fallback_sample_rate == 0 {
            return Err(SettingsError::InvalidSampleRate(0));
        }
        if self.request_timeout.is_zero() {
            return Err(SettingsError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Backend URL must not be empty")]
    EmptyBackendUrl,

    #[error("Retry attempts must be at least 1, got {0}")]
    InvalidMaxAttempts(u32),

    #[error("Retry base delay must be greater than 0 ms, got {0}")]
    InvalidBaseDelay(u64),

    #[error("Sample rate must be greater than 0 Hz, got {0}")]
    InvalidSampleRate(u32),

    #[error("Request timeout must be greater than zero")]
    InvalidTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = ClientSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.fallback_sample_rate, 44_100);
        assert_eq!(settings.voice_name, "Silent");
    }

    #[test]
    fn endpoint_urls_join_without_double_slashes() {
        let settings = ClientSettings {
            backend_url: "http://localhost:9000/".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(settings.chat_url(), "http://localhost:9000/api/chat");
        assert_eq!(settings.tts_url(), "http://localhost:9000/api/tts");
    }

    #[test]
    fn invalid_values_are_reported() {
        let empty_url = ClientSettings {
            backend_url: "  ".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(empty_url.validate(), Err(SettingsError::EmptyBackendUrl));

        let zero_rate = ClientSettings {
            fallback_sample_rate: 0,
            ..ClientSettings::default()
        };
        assert_eq!(
            zero_rate.validate(),
            Err(SettingsError::InvalidSampleRate(0))
        );

        let zero_timeout = ClientSettings {
            request_timeout: Duration::ZERO,
            ..ClientSettings::default()
        };
        assert_eq!(zero_timeout.validate(), Err(SettingsError::InvalidTimeout));
    }
}
