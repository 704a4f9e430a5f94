use super::{
    error::BookmarkError,
    types::{AddBookmarkRequest, Bookmark, BookmarkQuery, BookmarkSort, DEFAULT_CATEGORIES},
};
use crate::{StorageConfig, storage};
use chrono::{SecondsFormat, Utc};
use std::{cmp::Ordering, path::PathBuf};
use tokio::sync::RwLock;
use tracing::info;

pub struct BookmarkStore {
    bookmarks_file: PathBuf,
    bookmarks: RwLock<Vec<Bookmark>>,
    categories: Vec<String>,
}

impl BookmarkStore {
    pub async fn load(config: &StorageConfig) -> Result<Self, BookmarkError> {
        let bytes = storage::read_or_seed(&config.bookmarks_file, b"[]").await?;
        let bookmarks: Vec<Bookmark> = serde_json::from_slice(&bytes)?;

        let seed = serde_json::to_vec_pretty(&DEFAULT_CATEGORIES)?;
        let bytes = storage::read_or_seed(&config.categories_file, &seed).await?;
        let categories: Vec<String> = serde_json::from_slice(&bytes)?;

        info!(
            "Loaded {} bookmarks and {} categories",
            bookmarks.len(),
            categories.len()
        );

        Ok(Self {
            bookmarks_file: config.bookmarks_file.clone(),
            bookmarks: RwLock::new(bookmarks),
            categories,
        })
    }

    /// Stored order unless a sort is requested; `q` matches title, url or
    /// category, ignoring case.
    pub async fn list(&self, query: &BookmarkQuery) -> Vec<Bookmark> {
        let needle = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut bookmarks: Vec<Bookmark> = self
            .bookmarks
            .read()
            .await
            .iter()
            .filter(|b| match &needle {
                Some(needle) => {
                    b.title.to_lowercase().contains(needle)
                        || b.url.to_lowercase().contains(needle)
                        || b.category.to_lowercase().contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();

        if let Some(sort) = query.sort {
            bookmarks.sort_by(|a, b| match sort {
                BookmarkSort::NameAsc => compare_text(&a.title, &b.title),
                BookmarkSort::NameDesc => compare_text(&b.title, &a.title),
                BookmarkSort::CategoryAsc => compare_text(&a.category, &b.category),
                BookmarkSort::CategoryDesc => compare_text(&b.category, &a.category),
            });
        }

        bookmarks
    }

    pub async fn add(&self, request: AddBookmarkRequest) -> Result<Bookmark, BookmarkError> {
        let title = request.title.trim();
        let url = request.url.trim();
        if title.is_empty() {
            return Err(BookmarkError::InvalidInput("title is required".to_string()));
        }
        if url.is_empty() {
            return Err(BookmarkError::InvalidInput("url is required".to_string()));
        }

        let mut bookmarks = self.bookmarks.write().await;
        let now = Utc::now();

        // Millisecond timestamps, bumped when two bookmarks land in the same millisecond
        let last_id = bookmarks.iter().map(|b| b.id).max().unwrap_or(0);
        let id = now.timestamp_millis().max(last_id + 1);

        let bookmark = Bookmark {
            id,
            title: title.to_string(),
            url: url.to_string(),
            category: request.category.trim().to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut next = bookmarks.clone();
        next.push(bookmark.clone());
        self.persist(&next).await?;
        *bookmarks = next;

        info!("Added bookmark {} ({})", bookmark.id, bookmark.url);
        Ok(bookmark)
    }

    /// Removes every bookmark with `id`; unknown ids are not an error.
    pub async fn delete(&self, id: i64) -> Result<(), BookmarkError> {
        let mut bookmarks = self.bookmarks.write().await;

        let next: Vec<Bookmark> = bookmarks.iter().filter(|b| b.id != id).cloned().collect();
        self.persist(&next).await?;

        if next.len() != bookmarks.len() {
            info!("Deleted bookmark {}", id);
        }
        *bookmarks = next;
        Ok(())
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    async fn persist(&self, bookmarks: &[Bookmark]) -> Result<(), BookmarkError> {
        let json = serde_json::to_vec_pretty(bookmarks)?;
        storage::write_atomically(&self.bookmarks_file, &json).await?;
        Ok(())
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
