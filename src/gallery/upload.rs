use super::store::find_gallery_index;
use super::{GalleryError, GalleryStore, ImageRecord, StagedFile, UploadResult};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tracing::{debug, error, info, warn};

impl GalleryStore {
    /// Ingests one upload batch into `gallery_name`.
    ///
    /// External links come first in the batch, then files in the order they
    /// were received; the whole batch is placed at the head of the gallery.
    /// Bad links and unreadable images are skipped, an unknown gallery aborts
    /// before anything is moved or written.
    pub async fn upload(
        &self,
        gallery_name: &str,
        files: Vec<StagedFile>,
        url_text: &str,
    ) -> Result<UploadResult, GalleryError> {
        let known = find_gallery_index(&self.galleries.read().await, gallery_name).is_ok();
        if !known {
            discard_staged(&files).await;
            return Err(GalleryError::GalleryNotFound(gallery_name.to_string()));
        }

        let mut batch = parse_external_urls(url_text, self.upload.external_placeholder_size);

        let folder = self.gallery_folder(gallery_name);
        if let Err(e) = tokio::fs::create_dir_all(&folder).await {
            discard_staged(&files).await;
            return Err(e.into());
        }

        let mut pending = files.into_iter();
        while let Some(file) = pending.next() {
            let (target, stored_name) = match store_staged_file(&folder, &file).await {
                Ok(placed) => placed,
                Err(e) => {
                    let mut rest = vec![file];
                    rest.extend(pending);
                    discard_staged(&rest).await;
                    return Err(e.into());
                }
            };

            match read_dimensions(&target).await {
                Ok(dimensions) => {
                    debug!(
                        "Stored {:?} as {:?} ({}x{})",
                        file.original_name, target, dimensions.0, dimensions.1
                    );
                    batch.push(ImageRecord::local(
                        self.local_image_url(gallery_name, &stored_name),
                        dimensions,
                    ));
                }
                Err(e) => error!("Skipping upload: {}", e),
            }
        }

        let mut galleries = self.galleries.write().await;
        let index = find_gallery_index(&galleries, gallery_name)?;

        let mut next = galleries.clone();
        next[index].images.splice(0..0, batch.iter().cloned());
        self.persist(&next).await?;
        *galleries = next;

        info!(
            "Added {} images to gallery '{}'",
            batch.len(),
            gallery_name
        );

        Ok(UploadResult {
            success: true,
            images: batch,
        })
    }
}

/// One record per non-empty line that parses as an absolute URL.
pub(crate) fn parse_external_urls(url_text: &str, placeholder_size: u32) -> Vec<ImageRecord> {
    url_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match url::Url::parse(line) {
            Ok(_) => Some(ImageRecord::external(line, placeholder_size)),
            Err(source) => {
                let err = GalleryError::InvalidUrl {
                    url: line.to_string(),
                    source,
                };
                warn!("Skipping link: {}", err);
                None
            }
        })
        .collect()
}

/// Splits like a browser would: the extension keeps its dot, and a leading
/// dot alone does not start an extension.
pub(crate) fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(index) => file_name.split_at(index),
    }
}

/// `photo.jpg`, `photo-1.jpg`, `photo-2.jpg`, ...
pub(crate) fn candidate_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    let (stem, ext) = split_extension(file_name);
    format!("{}-{}{}", stem, attempt, ext)
}

/// Claims the first free candidate name in `folder` by creating it
/// exclusively, so two concurrent uploads can never pick the same name.
pub(crate) async fn reserve_file_name(folder: &Path, file_name: &str) -> io::Result<(PathBuf, String)> {
    let mut attempt = 0;
    loop {
        let candidate = candidate_name(file_name, attempt);
        let path = folder.join(&candidate);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => return Ok((path, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

async fn store_staged_file(folder: &Path, file: &StagedFile) -> io::Result<(PathBuf, String)> {
    let (target, stored_name) = reserve_file_name(folder, &file.original_name).await?;

    if tokio::fs::rename(&file.staged_path, &target).await.is_err() {
        // Staging may live on another filesystem
        if let Err(e) = tokio::fs::copy(&file.staged_path, &target).await {
            let _ = tokio::fs::remove_file(&target).await;
            let _ = tokio::fs::remove_file(&file.staged_path).await;
            return Err(e);
        }
        tokio::fs::remove_file(&file.staged_path).await?;
    }

    Ok((target, stored_name))
}

async fn read_dimensions(path: &Path) -> Result<(u32, u32), GalleryError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || probe_dimensions(&owned))
        .await
        .map_err(io::Error::other)?
}

/// Pixel size of a stored upload. Raster formats are recognised by their
/// content, not their name; SVG documents report their intrinsic size.
fn probe_dimensions(path: &Path) -> Result<(u32, u32), GalleryError> {
    if looks_like_svg(path)? {
        return svg_dimensions(path);
    }

    let metadata_error = |source| GalleryError::MetadataRead {
        path: path.to_path_buf(),
        source,
    };

    image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| metadata_error(image::ImageError::IoError(e)))?
        .into_dimensions()
        .map_err(metadata_error)
}

fn looks_like_svg(path: &Path) -> io::Result<bool> {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if by_extension {
        return Ok(true);
    }

    let mut head = [0u8; 512];
    let read = std::fs::File::open(path)?.read(&mut head)?;
    let text = String::from_utf8_lossy(&head[..read]);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    Ok(text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg")))
}

fn svg_dimensions(path: &Path) -> Result<(u32, u32), GalleryError> {
    let data = std::fs::read(path)?;
    let tree = usvg::Tree::from_data(&data, &usvg::Options::default()).map_err(|source| {
        GalleryError::SvgRead {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let size = tree.size();
    Ok((size.width().round() as u32, size.height().round() as u32))
}

pub(crate) async fn discard_staged(files: &[StagedFile]) {
    for file in files {
        if let Err(e) = tokio::fs::remove_file(&file.staged_path).await
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!("Failed to remove staged file {:?}: {}", file.staged_path, e);
        }
    }
}

/// Last path component of a client-supplied file name, or `None` when
/// nothing usable is left.
pub(crate) fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
