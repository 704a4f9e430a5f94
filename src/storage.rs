use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Replaces the file at `dest` with `contents` without ever exposing a
/// half-written document: the bytes go to a sibling temp file which is then
/// renamed over the destination.
pub async fn write_atomically(dest: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path_for(dest);
    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&tmp, dest).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }

    debug!("Wrote {} bytes to {:?}", contents.len(), dest);
    Ok(())
}

/// Reads `path`, first creating it with `seed` when it does not exist yet.
pub async fn read_or_seed(path: &Path, seed: &[u8]) -> io::Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating {:?}", path);
            write_atomically(path, seed).await?;
            Ok(seed.to_vec())
        }
        Err(e) => Err(e),
    }
}

fn temp_path_for(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    dest.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomically_replaces_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");

        write_atomically(&path, b"[1]").await.unwrap();
        write_atomically(&path, b"[1, 2]").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"[1, 2]");
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_read_or_seed_creates_missing_parent_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("list.json");

        let bytes = read_or_seed(&path, b"[]").await.unwrap();
        assert_eq!(bytes, b"[]");
        assert!(path.exists());

        std::fs::write(&path, b"[\"kept\"]").unwrap();
        let bytes = read_or_seed(&path, b"[]").await.unwrap();
        assert_eq!(bytes, b"[\"kept\"]");
    }
}
