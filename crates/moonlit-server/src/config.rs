//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use moonlit_core::RetryPolicy;

use crate::error::ServerError;
use crate::persona;

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default Ollama model name.
pub const DEFAULT_OLLAMA_MODEL: &str = "ai-girlfriend";

/// Upstream timeout, long enough for a model to load cold.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Sample rate of the placeholder speech clip.
pub const DEFAULT_TTS_SAMPLE_RATE: u32 = 24_000;

/// Length of the placeholder speech clip.
pub const DEFAULT_TTS_CLIP: Duration = Duration::from_millis(100);

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Base URL of the Ollama API.
    pub ollama_url: String,
    /// Model name passed to Ollama.
    pub ollama_model: String,
    /// Timeout for one upstream request.
    pub upstream_timeout: Duration,
    /// Retry policy for upstream requests. A single attempt by default.
    pub upstream_retry: RetryPolicy,
    /// Directory holding the built frontend (`index.html`, `assets/`).
    pub static_dir: Option<PathBuf>,
    /// File overriding the built-in persona.
    pub persona_file: Option<PathBuf>,
    /// Sample rate of the placeholder speech.
    pub tts_sample_rate: u32,
    /// Length of the placeholder speech.
    pub tts_clip: Duration,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            upstream_retry: RetryPolicy::single_attempt(),
            static_dir: Some(PathBuf::from("dist")),
            persona_file: None,
            tts_sample_rate: DEFAULT_TTS_SAMPLE_RATE,
            tts_clip: DEFAULT_TTS_CLIP,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Set the static directory for SPA serving.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Serve the API only.
    #[must_use]
    pub fn without_static_dir(mut self) -> Self {
        self.static_dir = None;
        self
    }

    /// Set a persona file.
    #[must_use]
    pub fn with_persona_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.persona_file = Some(path.into());
        self
    }

    /// Parse `host:port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ServerError::Config(format!("invalid bind address '{raw}'")))
    }

    /// Full URL of the Ollama chat endpoint.
    pub fn ollama_chat_url(&self) -> String {
        format!("{}/api/chat", self.ollama_url.trim_end_matches('/'))
    }

    /// Read the persona, falling back to the built-in one.
    pub fn load_persona(&self) -> Result<String, ServerError> {
        match &self.persona_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ServerError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(persona::normalize(&raw))
            }
            None => Ok(persona::DEFAULT_PERSONA.to_string()),
        }
    }

    /// Check values that would make the server unusable.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.ollama_url.trim().is_empty() {
            return Err(ServerError::Config(
                "Ollama URL must not be empty".to_string(),
            ));
        }
        if self.ollama_model.trim().is_empty() {
            return Err(ServerError::Config(
                "Ollama model must not be empty".to_string(),
            ));
        }
        if self.tts_sample_rate == 0 {
            return Err(ServerError::Config(
                "speech sample rate must be greater than 0".to_string(),
            ));
        }
        self.socket_addr().map(|_| ())
    }
}
