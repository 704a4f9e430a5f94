use super::store::find_gallery_index;
use super::{GalleryError, GalleryStore};
use tracing::info;

impl GalleryStore {
    /// Sets the display name of the record stored at `old_path`.
    pub async fn rename(
        &self,
        gallery_name: &str,
        old_path: &str,
        new_name: &str,
    ) -> Result<(), GalleryError> {
        let mut galleries = self.galleries.write().await;
        let index = find_gallery_index(&galleries, gallery_name)?;

        let mut next = galleries.clone();
        let image = next[index]
            .images
            .iter_mut()
            .find(|image| image.path == old_path)
            .ok_or_else(|| GalleryError::ImageNotFound(old_path.to_string()))?;
        image.name = new_name.to_string();

        self.persist(&next).await?;
        *galleries = next;

        info!(
            "Renamed '{}' in gallery '{}' to '{}'",
            old_path, gallery_name, new_name
        );
        Ok(())
    }

    /// Drops the first record stored at `path`. The file itself stays on disk.
    pub async fn delete_image(&self, gallery_name: &str, path: &str) -> Result<(), GalleryError> {
        let mut galleries = self.galleries.write().await;
        let index = find_gallery_index(&galleries, gallery_name)?;

        let position = galleries[index]
            .images
            .iter()
            .position(|image| image.path == path)
            .ok_or_else(|| GalleryError::ImageNotFound(path.to_string()))?;

        let mut next = galleries.clone();
        next[index].images.remove(position);

        self.persist(&next).await?;
        *galleries = next;

        info!("Removed '{}' from gallery '{}'", path, gallery_name);
        Ok(())
    }
}
