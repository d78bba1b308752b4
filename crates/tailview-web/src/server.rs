use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use tailview_logs::{FilterConfig, LogSelector, SelectError};
use tailview_types::DEFAULT_TAIL_LINES;

use crate::assets;

/// What the viewer serves, fixed at startup
#[derive(Clone, Debug)]
pub struct ViewerSettings {
    /// Log file to tail
    pub log_file: PathBuf,

    /// Level filter and highlight window
    pub filter: FilterConfig,

    /// Records returned per request
    pub tail_lines: usize,

    /// Only read this many bytes from the end of the file
    pub read_limit: Option<u64>,
}

impl ViewerSettings {
    pub fn new(log_file: impl Into<PathBuf>, filter: FilterConfig) -> Self {
        Self {
            log_file: log_file.into(),
            filter,
            tail_lines: DEFAULT_TAIL_LINES,
            read_limit: None,
        }
    }
}

/// Shared, immutable request state
#[derive(Clone)]
pub struct AppState {
    settings: Arc<ViewerSettings>,
}

impl AppState {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

/// Build the viewer routes
pub fn router(settings: ViewerSettings) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/logs", get(logs))
        .route("/static/:name", get(static_asset))
        .with_state(AppState::new(settings))
}

/// Serve the viewer on `listener` until Ctrl-C
pub async fn serve(listener: TcpListener, settings: ViewerSettings) -> io::Result<()> {
    axum::serve(listener, router(settings))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutting down");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn static_asset(Path(name): Path<String>) -> Response {
    match assets::lookup(&name) {
        Some((content_type, body)) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Re-read the log file and return the selected tail as JSON
async fn logs(State(state): State<AppState>) -> Response {
    let settings = Arc::clone(&state.settings);
    let result = tokio::task::spawn_blocking(move || {
        let mut selector = LogSelector::new(&settings.filter);
        if let Some(limit) = settings.read_limit {
            selector = selector.with_read_limit(limit);
        }
        selector.select(&settings.log_file, settings.tail_lines)
    })
    .await;

    match result {
        Ok(Ok(records)) => {
            debug!(records = records.len(), "Serving log records");
            Json(records).into_response()
        }
        Ok(Err(SelectError::FileAccess { path, source })) => {
            error!(path = %path.display(), error = %source, "Error reading log file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading log file").into_response()
        }
        Err(e) => {
            error!(error = %e, "Log selection task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading log file").into_response()
        }
    }
}
