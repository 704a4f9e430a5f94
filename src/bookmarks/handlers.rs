use super::{
    error::BookmarkError,
    types::{AddBookmarkRequest, Bookmark, BookmarkQuery, DeleteBookmarkResponse},
};
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};

pub async fn list_bookmarks_handler(
    State(app_state): State<AppState>,
    Query(query): Query<BookmarkQuery>,
) -> Json<Vec<Bookmark>> {
    Json(app_state.bookmarks.list(&query).await)
}

pub async fn add_bookmark_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<AddBookmarkRequest>,
) -> Result<Json<Bookmark>, BookmarkError> {
    let bookmark = app_state.bookmarks.add(payload).await?;
    Ok(Json(bookmark))
}

pub async fn delete_bookmark_handler(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteBookmarkResponse>, BookmarkError> {
    app_state.bookmarks.delete(id).await?;
    Ok(Json(DeleteBookmarkResponse {
        message: "Bookmark deleted".to_string(),
    }))
}

pub async fn categories_handler(State(app_state): State<AppState>) -> Json<Vec<String>> {
    Json(app_state.bookmarks.categories().to_vec())
}
