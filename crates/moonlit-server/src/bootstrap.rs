//! Server bootstrap - the composition root.
//!
//! This module is the only place where the server's concrete services are
//! instantiated.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::llm::OllamaClient;
use crate::routes::create_router;
use crate::speech::SilentSpeech;
use crate::state::{AppState, ServerContext};

/// Build the handler context from configuration.
pub fn build_context(config: &ServerConfig) -> Result<ServerContext, ServerError> {
    config.validate()?;

    let persona = config.load_persona()?;
    let llm = OllamaClient::from_config(config)?;
    let speech = SilentSpeech::new(config.tts_sample_rate, config.tts_clip);

    Ok(ServerContext {
        llm: Arc::new(llm),
        speech: Arc::new(speech),
        persona,
        static_dir: config.static_dir.clone(),
    })
}

/// Bind and serve until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let state: AppState = Arc::new(build_context(&config)?);
    let app = create_router(state, &config.cors);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        model = %config.ollama_model,
        ollama = %config.ollama_url,
        "moonlit server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_uses_configured_persona_and_static_dir() {
        let config = ServerConfig::default().without_static_dir();
        let ctx = build_context(&config).unwrap();
        assert!(ctx.static_dir.is_none());
        assert_eq!(ctx.persona, crate::persona::DEFAULT_PERSONA);
        assert_eq!(ctx.llm.model_name(), "ai-girlfriend");
    }

    #[test]
    fn invalid_config_is_rejected_before_binding() {
        let config = ServerConfig {
            tts_sample_rate: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(
            build_context(&config),
            Err(ServerError::Config(_))
        ));
    }
}
