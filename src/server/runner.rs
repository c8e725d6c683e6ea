//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use super::context::ChatContext;
use super::handler::{chat_handler, chat_stats, health_check};
use super::signal::shutdown_signal;

/// Run the chat relay server.
///
/// # Arguments
///
/// * `host` - The host address to bind to (e.g., "127.0.0.1")
/// * `port` - The port number to bind to (e.g., 8080)
/// * `history_capacity` - Ring buffer size for the message history
pub async fn run_server(
    host: String,
    port: u16,
    history_capacity: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    // Shared relay state; lives as long as the process.
    let context = Arc::new(ChatContext::new(history_capacity));

    let app = Router::new()
        .route("/chat", get(chat_handler))
        .route("/api/health", get(health_check))
        .route("/api/chat/stats", get(chat_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(context);

    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Chat relay listening on {}", listener.local_addr()?);
    tracing::info!("Connect to: ws://{}/chat?userId=<id>&userName=<name>", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    // Set up graceful shutdown signal handler
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
