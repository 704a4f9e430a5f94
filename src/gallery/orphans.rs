use super::{GalleryError, GalleryStore};
use std::collections::HashSet;
use std::path::PathBuf;
use walkdir::WalkDir;

impl GalleryStore {
    /// Files inside gallery folders that no image record points at, relative
    /// to the uploads root. Hidden entries are skipped. Nothing is deleted.
    pub async fn find_orphans(&self) -> Result<Vec<PathBuf>, GalleryError> {
        let prefix = format!(
            "/{}/",
            self.storage.uploads_url_prefix.trim_matches('/')
        );

        let referenced: HashSet<PathBuf> = self
            .galleries
            .read()
            .await
            .iter()
            .flat_map(|gallery| gallery.images.iter())
            .filter(|image| !image.is_external)
            .filter_map(|image| image.path.strip_prefix(&prefix).map(PathBuf::from))
            .collect();

        let root = self.storage.uploads_directory.clone();
        let orphans = tokio::task::spawn_blocking(move || {
            let mut orphans = Vec::new();
            let walker = WalkDir::new(&root)
                .min_depth(1)
                .into_iter()
                .filter_entry(|entry| !entry.file_name().to_string_lossy().starts_with('.'));

            for entry in walker {
                let entry = entry.map_err(std::io::Error::from)?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Ok(relative) = entry.path().strip_prefix(&root)
                    && !referenced.contains(relative)
                {
                    orphans.push(relative.to_path_buf());
                }
            }

            orphans.sort();
            Ok::<_, std::io::Error>(orphans)
        })
        .await
        .map_err(std::io::Error::other)??;

        Ok(orphans)
    }
}
