use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

pub fn resolve_static_root() -> PathBuf {
    std::env::var("STATIC_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("static"))
}

/// Fallback route: any path the API does not claim is served from the
/// document root. Traversal components and missing files answer 404.
pub async fn serve(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(path) = sanitize(&state.static_root, uri.path().trim_start_matches('/')) else {
        return not_found();
    };
    match fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(&path))], bytes).into_response(),
        Err(_) => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

fn sanitize(root: &Path, rel: &str) -> Option<PathBuf> {
    if rel.is_empty() {
        return None;
    }
    let rel = Path::new(rel);
    if rel
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(rel))
}

/// Fixed extension table; anything unknown is served as plain text.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        _ => "text/plain",
    }
}
