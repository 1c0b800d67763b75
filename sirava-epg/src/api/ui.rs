//! UI serving routes
//!
//! Serves the rundown upload form. An `index.html` in the static directory
//! replaces the built-in page.

use axum::{extract::State, response::Html};
use tracing::warn;

use crate::AppState;

const INDEX_HTML: &str = include_str!("../ui/index.html");

/// GET /
pub async fn serve_index(State(state): State<AppState>) -> Html<String> {
    let custom = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&custom).await {
        Ok(page) => Html(page),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Html(INDEX_HTML.to_string()),
        Err(e) => {
            warn!("Cannot read {}: {}, serving built-in form", custom.display(), e);
            Html(INDEX_HTML.to_string())
        }
    }
}
