//! HTTP endpoint serving the hub AI commands
//!
//! The server exposes `POST /_hub/ai/{command}` backed by an injected
//! [`AiBinding`](crate::ai::binding::AiBinding), plus a health route. The
//! [`serve`] entry point binds a listener and runs until Ctrl+C or SIGTERM.

pub mod auth;
pub mod body;
pub mod error;
pub mod routes;

pub use auth::AuthPolicy;
pub use error::ApiError;
pub use routes::{router, AiCommand, AppState};

use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Binds the listener and serves the endpoint until shutdown
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "AI endpoint listening on http://{}",
        listener.local_addr().context("Failed to read local address")?
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping AI endpoint");
}
