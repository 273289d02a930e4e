mod chat;
mod config;
mod frame;
mod llm;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use chat::script::ChatScript;
use services::catalog::Catalog;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "loaded .env");
    }

    let config = config::AppConfig::from_env();
    let port = config.port;

    // Initialize LLM client (non-fatal: assistant disabled if config missing).
    let llm: Option<Arc<dyn llm::LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(provider = client.provider(), model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; assistant disabled");
            None
        }
    };

    tracing::info!(
        chat_tick = ?config.cadence.chat_tick,
        viewer_tick = ?config.cadence.viewer_tick,
        seeded = config.rng_seed.is_some(),
        "chat simulation configured"
    );
    let state = state::AppState::new(config, Catalog::demo(), ChatScript::demo(), llm);

    let app = routes::app(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%port, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, "streamchat listening");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
