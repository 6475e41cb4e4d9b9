pub mod handlers;
mod types;

pub use types::{ChatRequest, ErrorResponse, HealthResponse};

use crate::{
    Result,
    config::Config,
    history::SqliteMessageStore,
    llm::OpenAiCompletionClient,
    relay::Relay,
};
use axum::{
    Router,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handlers::create_message).get(handlers::list_messages),
        )
        .route("/api/chat/:id", get(handlers::get_message))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run(config: Config) -> Result<()> {
    let store = SqliteMessageStore::new(&config.server.database_path).await?;
    let completion = OpenAiCompletionClient::new(config.completion.clone())?;
    info!(
        "Completion client ready (model: {}, timeout: {}s)",
        config.completion.model, config.completion.timeout_secs
    );

    let relay = Relay::new(Arc::new(store), Arc::new(completion))
        .with_retries(config.completion.retries);
    let app = router(AppState {
        relay: Arc::new(relay),
    });

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
