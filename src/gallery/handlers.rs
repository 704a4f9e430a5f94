use super::intake::read_upload_form;
use super::{
    CreateGalleryRequest, CreateGalleryResponse, DeleteImageRequest, Gallery, GalleryError,
    RenameRequest, SuccessResponse, UploadResult,
};
use crate::AppState;
use axum::{
    Json,
    extract::{Multipart, State},
};
use tracing::debug;

pub async fn list_galleries_handler(State(app_state): State<AppState>) -> Json<Vec<Gallery>> {
    Json(app_state.galleries.list_galleries().await)
}

pub async fn create_gallery_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateGalleryRequest>,
) -> Result<Json<CreateGalleryResponse>, GalleryError> {
    let gallery = app_state.galleries.create_gallery(&payload.name).await?;

    Ok(Json(CreateGalleryResponse {
        success: true,
        name: gallery.name,
    }))
}

pub async fn upload_handler(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResult>, GalleryError> {
    let form = read_upload_form(
        multipart,
        &app_state.config.upload,
        &app_state.config.storage.staging_directory,
    )
    .await?;

    debug!(
        "Upload for gallery '{}': {} files, {} bytes of links",
        form.gallery,
        form.files.len(),
        form.urls.len()
    );

    let result = app_state
        .galleries
        .upload(&form.gallery, form.files, &form.urls)
        .await?;

    Ok(Json(result))
}

pub async fn rename_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<SuccessResponse>, GalleryError> {
    let new_name = payload.new_name.trim();
    if new_name.is_empty() {
        return Err(GalleryError::InvalidRequest(
            "new name must not be empty".to_string(),
        ));
    }

    app_state
        .galleries
        .rename(&payload.gallery, &payload.old_path, new_name)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn delete_image_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<DeleteImageRequest>,
) -> Result<Json<SuccessResponse>, GalleryError> {
    app_state
        .galleries
        .delete_image(&payload.gallery, &payload.path)
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}
