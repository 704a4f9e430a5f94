use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub name: String,
    pub folder_path: String,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

/// One displayable image. `path` identifies the record inside its gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl ImageRecord {
    pub fn external(url: &str, placeholder_size: u32) -> Self {
        Self {
            path: url.to_string(),
            name: String::new(),
            is_external: true,
            width: placeholder_size,
            height: placeholder_size,
        }
    }

    pub fn local(path: String, dimensions: (u32, u32)) -> Self {
        Self {
            path,
            name: String::new(),
            is_external: false,
            width: dimensions.0,
            height: dimensions.1,
        }
    }
}

/// A multipart file part already written to the staging folder.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub original_name: String,
    pub staged_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGalleryRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateGalleryResponse {
    pub success: bool,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub gallery: String,
    pub old_path: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    pub gallery: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
