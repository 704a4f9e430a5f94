use super::{Gallery, GalleryError};
use crate::{StorageConfig, UploadConfig, storage};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::info;

/// Owns every gallery and the JSON document they are persisted to.
///
/// All writers go through the `galleries` write lock and hold it until the
/// document has been replaced, so mutations are applied one at a time and the
/// in-memory state only changes once the new document is on disk.
pub struct GalleryStore {
    pub(crate) storage: StorageConfig,
    pub(crate) upload: UploadConfig,
    pub(crate) galleries: RwLock<Vec<Gallery>>,
}

impl GalleryStore {
    pub async fn load(storage: StorageConfig, upload: UploadConfig) -> Result<Self, GalleryError> {
        let bytes = storage::read_or_seed(&storage.galleries_file, b"[]").await?;
        let galleries: Vec<Gallery> = serde_json::from_slice(&bytes)?;

        info!(
            "Loaded {} galleries from {:?}",
            galleries.len(),
            storage.galleries_file
        );

        Ok(Self {
            storage,
            upload,
            galleries: RwLock::new(galleries),
        })
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub async fn list_galleries(&self) -> Vec<Gallery> {
        self.galleries.read().await.clone()
    }

    pub async fn get_gallery(&self, name: &str) -> Option<Gallery> {
        let galleries = self.galleries.read().await;
        find_gallery_index(&galleries, name)
            .ok()
            .map(|index| galleries[index].clone())
    }

    pub async fn create_gallery(&self, name: &str) -> Result<Gallery, GalleryError> {
        validate_gallery_name(name)?;

        let mut galleries = self.galleries.write().await;
        if galleries.iter().any(|g| g.name == name) {
            return Err(GalleryError::DuplicateName(name.to_string()));
        }

        let folder = self.gallery_folder(name);
        tokio::fs::create_dir_all(&folder).await?;

        let gallery = Gallery {
            name: name.to_string(),
            folder_path: folder.to_string_lossy().to_string(),
            images: Vec::new(),
        };

        let mut next = galleries.clone();
        next.push(gallery.clone());
        self.persist(&next).await?;
        *galleries = next;

        info!("Created gallery '{}' at {:?}", name, folder);
        Ok(gallery)
    }

    pub fn gallery_folder(&self, name: &str) -> PathBuf {
        self.storage.uploads_directory.join(name)
    }

    /// Public URL of a file stored in a gallery folder.
    pub(crate) fn local_image_url(&self, gallery: &str, file_name: &str) -> String {
        format!(
            "/{}/{}/{}",
            self.storage.uploads_url_prefix.trim_matches('/'),
            gallery,
            file_name
        )
    }

    /// Serializes the whole collection and replaces the backing document.
    pub(crate) async fn persist(&self, galleries: &[Gallery]) -> Result<(), GalleryError> {
        let json = serde_json::to_vec_pretty(galleries)?;
        storage::write_atomically(&self.storage.galleries_file, &json).await?;
        Ok(())
    }
}

/// Linear scan; the first exact match wins.
pub(crate) fn find_gallery_index(galleries: &[Gallery], name: &str) -> Result<usize, GalleryError> {
    galleries
        .iter()
        .position(|g| g.name == name)
        .ok_or_else(|| GalleryError::GalleryNotFound(name.to_string()))
}

/// Gallery names double as folder names under the uploads root.
pub fn validate_gallery_name(name: &str) -> Result<(), GalleryError> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);

    if invalid {
        Err(GalleryError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
