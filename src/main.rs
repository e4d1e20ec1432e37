//! Voice skill host
//!
//! Answers voice-platform requests by routing them to ordered handlers,
//! asking a chat-completion service for spoken answers to questions.

mod api;
mod config;
mod envelope;
mod llm;
mod skill;
mod speech;

use api::{create_router, AppState};
use config::SkillConfig;
use llm::{OpenRouterClient, TracingObserver};
use skill::{Dispatcher, SkillContext};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voice_skill=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = SkillConfig::from_env();
    tracing::info!(config = ?config, "Loaded configuration");

    if config.api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set. Questions will be answered with a configuration apology.");
    }

    // Completion client and handler registry
    let client = OpenRouterClient::new(config.api_key.clone())?
        .with_endpoint(config.endpoint.clone())
        .with_referer(config.referer.clone())
        .with_timeout(config.timeout)
        .with_observer(Arc::new(TracingObserver));
    let dispatcher = Dispatcher::standard(SkillContext::new(Arc::new(client), config.model.clone()));

    let app = create_router(AppState::new(dispatcher)).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Voice skill listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
