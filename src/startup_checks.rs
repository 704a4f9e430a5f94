use crate::Config;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create directory {0:?}: {1}")]
    DirectoryCreationFailed(PathBuf, std::io::Error),

    #[error("Failed to clear staging directory: {0}")]
    StagingCleanupFailed(std::io::Error),

    #[error("Public files directory does not exist: {0:?}")]
    PublicDirectoryMissing(PathBuf),

    #[error("Views directory does not exist: {0:?}")]
    ViewsDirectoryMissing(PathBuf),
}

impl StartupCheckError {
    /// Storage problems stop the server; missing presentation files do not.
    pub fn is_critical(&self) -> bool {
        matches!(self, StartupCheckError::DirectoryCreationFailed(..))
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let storage = &config.storage;
    let mut required_dirs = vec![
        storage.uploads_directory.clone(),
        storage.staging_directory.clone(),
    ];
    for file in [
        &storage.galleries_file,
        &storage.bookmarks_file,
        &storage.categories_file,
    ] {
        if let Some(parent) = file.parent()
            && !parent.as_os_str().is_empty()
        {
            required_dirs.push(parent.to_path_buf());
        }
    }

    for dir in required_dirs {
        if dir.exists() {
            info!("Directory exists: {:?}", dir);
            continue;
        }
        info!("Directory does not exist, creating: {:?}", dir);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            error!("Failed to create directory {:?}: {}", dir, e);
            errors.push(StartupCheckError::DirectoryCreationFailed(dir, e));
        }
    }

    // Parts left behind by an interrupted upload are never picked up again
    match clear_staging(&storage.staging_directory).await {
        Ok(0) => {}
        Ok(removed) => info!("Removed {} stale staged uploads", removed),
        Err(e) => {
            warn!("Failed to clear staging directory: {}", e);
            errors.push(StartupCheckError::StagingCleanupFailed(e));
        }
    }

    let public_dir = &config.static_files.public_directory;
    if !public_dir.exists() {
        warn!("Public files directory does not exist: {:?}", public_dir);
        errors.push(StartupCheckError::PublicDirectoryMissing(public_dir.clone()));
    } else {
        info!("Public files directory exists: {:?}", public_dir);
    }

    let views_dir = &config.static_files.views_directory;
    if !views_dir.exists() {
        warn!("Views directory does not exist: {:?}", views_dir);
        warn!("Page routes will answer 404");
        errors.push(StartupCheckError::ViewsDirectoryMissing(views_dir.clone()));
    } else {
        info!("Views directory exists: {:?}", views_dir);
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

async fn clear_staging(dir: &Path) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp_dir: &TempDir) -> Config {
        let root = temp_dir.path();
        let mut config = Config::default();
        config.storage.galleries_file = root.join("galleries.json");
        config.storage.bookmarks_file = root.join("data/bookmarks.json");
        config.storage.categories_file = root.join("data/categories.json");
        config.storage.uploads_directory = root.join("public/uploads");
        config.storage.staging_directory = root.join("staging");
        config.static_files.public_directory = root.join("public");
        config.static_files.views_directory = root.join("views");
        config
    }

    #[tokio::test]
    async fn test_creates_storage_directories_and_clears_staging() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);
        std::fs::create_dir_all(temp_dir.path().join("views")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("staging")).unwrap();
        std::fs::write(temp_dir.path().join("staging/old.part"), b"x").unwrap();

        perform_startup_checks(&config).await.unwrap();

        assert!(temp_dir.path().join("public/uploads").is_dir());
        assert!(temp_dir.path().join("data").is_dir());
        assert!(!temp_dir.path().join("staging/old.part").exists());
    }

    #[tokio::test]
    async fn test_missing_views_is_not_critical() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let errors = perform_startup_checks(&config).await.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StartupCheckError::ViewsDirectoryMissing(_)));
        assert!(!errors.iter().any(|e| e.is_critical()));
    }
}
