//! Subcommands and their arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use moonlit_core::settings::DEFAULT_VOICE_NAME;
use moonlit_core::{
    ClientSettings, DEFAULT_BACKEND_URL, DEFAULT_BASE_DELAY_MS, DEFAULT_FALLBACK_SAMPLE_RATE,
    DEFAULT_MAX_ATTEMPTS, RetryPolicy, SettingsError,
};
use moonlit_server::config::{
    DEFAULT_HOST, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_PORT,
};
use moonlit_server::{CorsConfig, ServerConfig};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the backend in an interactive prompt
    Chat(ChatArgs),

    /// Run the companion backend (chat relay, speech, web UI)
    Serve(ServeArgs),
}

/// Arguments for `moonlit chat`.
#[derive(Debug, Clone, Args)]
pub struct ChatArgs {
    /// Base URL of the moonlit backend
    #[arg(long, env = "MOONLIT_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Voice requested from the speech backend
    #[arg(long, env = "MOONLIT_VOICE", default_value = DEFAULT_VOICE_NAME)]
    pub voice: String,

    /// Attempts per backend call, including the first
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub retry_attempts: u32,

    /// Base backoff delay in milliseconds
    #[arg(long, default_value_t = DEFAULT_BASE_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Sample rate assumed when the speech backend does not report one
    #[arg(long, default_value_t = DEFAULT_FALLBACK_SAMPLE_RATE)]
    pub fallback_sample_rate: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Do not open an audio device; playback is simulated
    #[arg(long)]
    pub no_audio: bool,

    /// Do not speak replies automatically
    #[arg(long)]
    pub no_auto_speak: bool,
}

impl ChatArgs {
    /// Build validated client settings.
    pub fn to_settings(&self) -> Result<ClientSettings, SettingsError> {
        let settings = ClientSettings {
            backend_url: self.backend_url.clone(),
            voice_name: self.voice.clone(),
            retry: RetryPolicy::new(self.retry_attempts, self.retry_delay_ms)?,
            fallback_sample_rate: self.fallback_sample_rate,
            request_timeout: Duration::from_secs(self.timeout_secs),
            auto_speak: !self.no_auto_speak,
            ..ClientSettings::default()
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Arguments for `moonlit serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL of the Ollama API
    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Model name passed to Ollama
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_OLLAMA_MODEL)]
    pub ollama_model: String,

    /// Upstream timeout in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Directory with the built frontend (index.html, assets/)
    #[arg(long, default_value = "dist")]
    pub static_dir: PathBuf,

    /// Serve only the API, no frontend
    #[arg(long)]
    pub api_only: bool,

    /// File with a persona prompt replacing the built-in one
    #[arg(long)]
    pub persona_file: Option<PathBuf>,

    /// Allowed CORS origin (repeatable); all origins when omitted
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl ServeArgs {
    pub fn to_config(&self) -> ServerConfig {
        let mut config = ServerConfig {
            host: self.host.clone(),
            port: self.port,
            ollama_url: self.ollama_url.clone(),
            ollama_model: self.ollama_model.clone(),
            upstream_timeout: Duration::from_secs(self.timeout_secs),
            cors: if self.cors_origins.is_empty() {
                CorsConfig::AllowAll
            } else {
                CorsConfig::AllowOrigins(self.cors_origins.clone())
            },
            ..ServerConfig::default()
        };

        config = if self.api_only {
            config.without_static_dir()
        } else {
            config.with_static_dir(&self.static_dir)
        };
        if let Some(path) = &self.persona_file {
            config = config.with_persona_file(path);
        }
        config
    }
}
