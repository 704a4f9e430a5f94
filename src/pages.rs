use crate::AppState;
use axum::{extract::State, response::Response};

/// Handlers for the fixed page routes; each one serves a file from the
/// views directory unchanged.
pub async fn index_page(State(app_state): State<AppState>) -> Response {
    app_state.views.serve("index.html").await
}

pub async fn gallery_page(State(app_state): State<AppState>) -> Response {
    app_state.views.serve("gallery.html").await
}

pub async fn favorites_page(State(app_state): State<AppState>) -> Response {
    app_state.views.serve("bookmarks.html").await
}

pub async fn github_page(State(app_state): State<AppState>) -> Response {
    app_state.views.serve("github.html").await
}

pub async fn parallax_page(State(app_state): State<AppState>) -> Response {
    app_state.views.serve("parallax.html").await
}
