//! HTTP front for uploads, separation runs, downloads and deletion.

mod error;
mod handlers;

pub use error::ApiError;

use crate::{
    config::ServerConfig,
    core::{jobs::JobLayout, separator::Separator},
    error::Result,
};
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub(crate) cfg: Arc<ServerConfig>,
    pub(crate) layout: JobLayout,
    pub(crate) separator: Separator,
}

impl AppState {
    pub fn new(cfg: ServerConfig) -> Self {
        let layout = cfg.job_layout();
        let separator = cfg.separator();
        Self {
            cfg: Arc::new(cfg),
            layout,
            separator,
        }
    }
}

/// Build the router and make sure the storage roots exist.
pub fn router(cfg: ServerConfig) -> Result<Router> {
    let body_limit = cfg.max_upload_bytes;
    let state = AppState::new(cfg);
    state.layout.ensure_dirs()?;

    Ok(Router::new()
        .route("/upload", post(handlers::upload))
        .route("/separate", post(handlers::separate))
        .route("/download/{job}", get(handlers::list_downloads))
        .route("/download/{job}/{song}", get(handlers::download_song))
        .route("/delete/{job}", delete(handlers::delete_job))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state))
}

pub async fn serve(cfg: ServerConfig) -> Result<()> {
    let addr: SocketAddr = cfg
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen_addr: {}", cfg.listen_addr))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    serve_on(listener, cfg).await
}

pub async fn serve_on(listener: TcpListener, cfg: ServerConfig) -> Result<()> {
    let app = router(cfg)?;
    tracing::info!(addr = %listener.local_addr()?, "stem-splitter-server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
