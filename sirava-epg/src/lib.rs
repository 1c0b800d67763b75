//! sirava-epg library - rundown upload service and converter CLI
//!
//! Exposes the router and the CLI conversion for integration testing.

use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sirava_common::ScheduleStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod convert;
pub mod error;
pub mod logging;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Persisted program guide
    pub store: Arc<dyn ScheduleStore>,
    /// Serializes load → merge → store across concurrent uploads
    pub write_lock: Arc<Mutex<()>>,
    /// Directory for static files
    pub static_dir: PathBuf,
    /// Service start, for uptime reporting
    pub started_at: DateTime<Utc>,
    /// Most recent successful upload
    pub last_upload: Arc<RwLock<Option<LastUpload>>>,
}

/// Summary of the last rundown merged into the stored guide
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastUpload {
    /// Schedule date of the converted day
    pub date: String,
    /// Entries added for that day
    pub entries: usize,
    pub at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn ScheduleStore>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            static_dir: static_dir.into(),
            started_at: Utc::now(),
            last_upload: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
///
/// Unmatched paths fall through to static files from `static_dir`.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(api::serve_index))
        .route(
            "/upload",
            post(api::upload_rundown).layer(api::upload_body_limit()),
        )
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
