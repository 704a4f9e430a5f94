use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("A gallery named '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid gallery name: '{0}'")]
    InvalidName(String),

    #[error("Gallery not found: {0}")]
    GalleryNotFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to read image metadata from {path:?}: {source}")]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read SVG size from {path:?}: {source}")]
    SvgRead {
        path: PathBuf,
        #[source]
        source: usvg::Error,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Too many files in one upload (limit is {0})")]
    TooManyFiles(usize),

    #[error("'{name}' exceeds the upload limit of {limit} bytes")]
    FileTooLarge { name: String, limit: u64 },

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            GalleryError::DuplicateName(_) | GalleryError::InvalidName(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            GalleryError::GalleryNotFound(_) | GalleryError::ImageNotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
            GalleryError::UnsupportedFileType(_) | GalleryError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
            GalleryError::TooManyFiles(_) | GalleryError::FileTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
            GalleryError::Multipart(e) => (
                e.status(),
                Json(json!({ "success": false, "error": e.body_text() })),
            )
                .into_response(),
            GalleryError::IoError(_)
            | GalleryError::SerdeError(_)
            | GalleryError::InvalidUrl { .. }
            | GalleryError::MetadataRead { .. }
            | GalleryError::SvgRead { .. } => {
                tracing::error!("Gallery request failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
