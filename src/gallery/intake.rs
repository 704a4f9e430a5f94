use super::upload::{discard_staged, sanitize_file_name};
use super::{GalleryError, StagedFile};
use crate::UploadConfig;
use axum::extract::multipart::{Field, Multipart};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const FILE_FIELD: &str = "images";
const FALLBACK_FILE_NAME: &str = "image";

#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub gallery: String,
    pub urls: String,
    pub files: Vec<StagedFile>,
}

/// Drains an `/upload` body, streaming file parts into `staging_dir`.
///
/// Any rejection fails the whole form and removes what was staged so far.
pub(crate) async fn read_upload_form(
    mut multipart: Multipart,
    limits: &UploadConfig,
    staging_dir: &Path,
) -> Result<UploadForm, GalleryError> {
    let mut form = UploadForm::default();

    if let Err(e) = collect_fields(&mut multipart, limits, staging_dir, &mut form).await {
        discard_staged(&form.files).await;
        return Err(e);
    }

    Ok(form)
}

async fn collect_fields(
    multipart: &mut Multipart,
    limits: &UploadConfig,
    staging_dir: &Path,
    form: &mut UploadForm,
) -> Result<(), GalleryError> {
    tokio::fs::create_dir_all(staging_dir).await?;

    while let Some(mut field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        if let Some(raw_name) = field.file_name().map(str::to_string) {
            if field_name != FILE_FIELD {
                return Err(GalleryError::InvalidRequest(format!(
                    "unexpected file field '{}'",
                    field_name
                )));
            }
            if form.files.len() >= limits.max_files {
                return Err(GalleryError::TooManyFiles(limits.max_files));
            }

            let original_name =
                sanitize_file_name(&raw_name).unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
            if !limits.accepts(&original_name, field.content_type()) {
                return Err(GalleryError::UnsupportedFileType(original_name));
            }

            let staged = stage_file(&mut field, original_name, limits.max_file_size, staging_dir).await?;
            form.files.push(staged);
            continue;
        }

        match field_name.as_str() {
            "gallery" => form.gallery = read_text(&mut field, limits.max_field_size).await?,
            "urls" => form.urls = read_text(&mut field, limits.max_field_size).await?,
            other => debug!("Ignoring upload field '{}'", other),
        }
    }

    Ok(())
}

async fn stage_file(
    field: &mut Field<'_>,
    original_name: String,
    max_size: u64,
    staging_dir: &Path,
) -> Result<StagedFile, GalleryError> {
    let staged_path = staging_dir.join(format!("{}.part", uuid::Uuid::new_v4()));

    let written = async {
        let mut file = tokio::fs::File::create(&staged_path).await?;
        let mut size: u64 = 0;

        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            if size > max_size {
                return Err(GalleryError::FileTooLarge {
                    name: original_name.clone(),
                    limit: max_size,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok::<u64, GalleryError>(size)
    }
    .await;

    match written {
        Ok(size) => {
            debug!(
                "Staged {:?} ({} bytes) at {:?}",
                original_name, size, staged_path
            );
            Ok(StagedFile {
                original_name,
                staged_path,
            })
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&staged_path).await;
            Err(e)
        }
    }
}

async fn read_text(field: &mut Field<'_>, max_size: u64) -> Result<String, GalleryError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if (buffer.len() + chunk.len()) as u64 > max_size {
            return Err(GalleryError::InvalidRequest(format!(
                "field '{}' exceeds {} bytes",
                field.name().unwrap_or_default(),
                max_size
            )));
        }
        buffer.extend_from_slice(&chunk);
    }

    String::from_utf8(buffer)
        .map_err(|_| GalleryError::InvalidRequest("text field is not valid UTF-8".to_string()))
}
