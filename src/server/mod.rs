//! The HTTP merge service.
//!
//! Routes:
//!
//! - `POST /merge`: multipart upload, one `pdfs` part per file, in order
//! - `GET /health`: JSON status
//! - `/*`: static assets, when a static directory is configured

mod error;
mod handlers;

pub use error::{ApiError, MERGE_FAILED_MESSAGE, NO_FILES_MESSAGE};
pub use handlers::Health;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::io::PdfWriter;
use crate::merge::Merger;

/// Shared per-process state of the service.
#[derive(Debug, Clone)]
pub struct AppState {
    merger: Arc<Merger>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let merger = if config.compress {
            Merger::new()
        } else {
            Merger::with_writer(PdfWriter::without_compression())
        };
        Self {
            merger: Arc::new(merger),
        }
    }
}

/// Build the service router.
pub fn app(config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/merge", post(handlers::merge))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(AppState::new(config));

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    config.validate()?;
    let listener = TcpListener::bind(config.listen_addr).await?;
    serve_on(listener, &config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, config: &ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("pdfbind listening on http://{addr}");
    if let Some(dir) = &config.static_dir {
        info!("serving static files from {}", dir.display());
    }

    axum::serve(listener, app(config))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

/// Resolves once `signal` fires. If listening fails, never resolves.
async fn wait_for_signal(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            error!("cannot listen for Ctrl-C, graceful shutdown disabled: {err}");
            std::future::pending::<()>().await;
        }
    }
}
