//! Thinking Machine - a beginner's thinking partner
//!
//! An HTTP backend that walks a user from a rough idea, through a confirmed
//! plain-language plan, to a node/edge flow chart of that plan.

mod api;
mod llm;
mod prompts;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use llm::{LlmConfig, ModelRegistry, Provider};
use runtime::{Collaborator, InMemorySessionStore, LlmCollaborator, SessionStore, TurnExecutor};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Env files never override variables that are already set, and are
    // loaded first so they can carry RUST_LOG
    let env_files: Vec<_> = [".env.local", ".env"]
        .into_iter()
        .filter_map(|file| dotenvy::from_filename(file).ok())
        .collect();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thinking_machine=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    for path in &env_files {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            temperature = llm_config.temperature(),
            "LLM registry initialized"
        );
    } else {
        let keys: Vec<_> = Provider::ALL.iter().map(|p| p.api_key_env_var()).collect();
        tracing::warn!(
            "No LLM API keys configured. Set one of {} or LLM_GATEWAY.",
            keys.join(", ")
        );
    }

    // Create application state
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let collaborator: Arc<dyn Collaborator> = Arc::new(LlmCollaborator::new(
        llm_registry.clone(),
        llm_registry.default_model_id().to_string(),
        llm_config.temperature(),
    ));
    let state = AppState::new(TurnExecutor::new(store, collaborator));

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr = bind_addr(|name| std::env::var(name).ok())?;
    tracing::info!("Thinking Machine listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Listen address from `THINKING_MACHINE_HOST` and `THINKING_MACHINE_PORT`
/// (falling back to `PORT`).
fn bind_addr(lookup: impl Fn(&str) -> Option<String>) -> Result<SocketAddr, String> {
    let host = match lookup("THINKING_MACHINE_HOST") {
        Some(host) => host
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| format!("Invalid THINKING_MACHINE_HOST {host:?}: {e}"))?,
        None => IpAddr::V4(Ipv4Addr::LOCALHOST),
    };

    let port = match lookup("THINKING_MACHINE_PORT").or_else(|| lookup("PORT")) {
        Some(port) => port
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("Invalid port {port:?}: {e}"))?,
        None => DEFAULT_PORT,
    };

    Ok(SocketAddr::new(host, port))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
