//! Local preview server for a built site.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub const DEFAULT_PORT: u16 = 8000;

/// Static file router over `root`; directories resolve to their `index.html`.
pub fn router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(TraceLayer::new_for_http())
}

/// Serve `root` on localhost until Ctrl-C. Read-only: nothing under `root` is modified.
pub fn serve(root: PathBuf, port: u16) -> Result<()> {
    if !root.join("index.html").is_file() {
        bail!("No built site at {} (run `hypertransparency build` first)", root.display());
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        println!("Serving {} at http://{}/", root.display(), addr);
        println!("Press Ctrl+C to stop");

        axum::serve(listener, router(&root))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
