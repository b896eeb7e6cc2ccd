//! HTTP surface: the JSON listing endpoint plus the embedded front-end.

use crate::config::ServerConfig;
use crate::error::ScanError;
use crate::node::{ReportEntry, SortOrder};
use crate::scanner::{Scanner, WorkerPool};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

const INDEX_HTML: &str = include_str!("../static/index.html");
const APP_JS: &str = include_str!("../static/app.js");
const STYLE_CSS: &str = include_str!("../static/style.css");

#[derive(Clone)]
struct AppState {
    config: Arc<ServerConfig>,
    /// Shares one worker pool across all requests
    scanner: Scanner,
}

/// Query string of `GET /api/files`.
#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    pub path: Option<String>,
    pub sort: Option<String>,
}

/// Failures of `/api/files`, each rendered as a plain-text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Directory not found: {0}")]
    NotFound(String),

    #[error("Failed to scan directory: {0}")]
    Scan(#[from] ScanError),

    #[error("Scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Scan(err) if err.is_root_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

/// Build the application router for `config`, starting the worker pool
/// every request scans on.
pub fn router(config: ServerConfig) -> Result<Router, ScanError> {
    let pool = WorkerPool::new(config.scan.max_in_flight)?;
    let state = AppState {
        scanner: config.scan.scanner().with_pool(pool),
        config: Arc::new(config),
    };

    Ok(Router::new()
        .route("/", get(index))
        .route("/static/app.js", get(app_js))
        .route("/static/style.css", get(style_css))
        .route("/api/files", get(list_files))
        .with_state(state))
}

/// Bind `config.addr()` and serve until Ctrl-C or SIGTERM, letting
/// in-flight requests finish.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let app = router(config.clone()).map_err(std::io::Error::other)?;
    let listener = TcpListener::bind(config.addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        root = %config.root.display(),
        sort = config.default_sort.as_str(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutdown signal received, draining connections");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<FilesQuery>,
) -> Result<Response, ApiError> {
    let root = match query.path.as_deref() {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => state.config.root.clone(),
    };
    let order = query
        .sort
        .as_deref()
        .map(SortOrder::parse)
        .unwrap_or(state.config.default_sort);

    debug!(root = %root.display(), sort = order.as_str(), "scanning for request");

    let scanner = state.scanner.clone();
    let mut result = tokio::task::spawn_blocking(move || {
        if !root.exists() {
            return Err(ApiError::NotFound(root.display().to_string()));
        }
        scanner.scan(&root).map_err(ApiError::from)
    })
    .await??;
    result.sort(order);

    let report: Vec<ReportEntry> = result.into_report();
    let body = serde_json::to_vec(&report)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
