use super::*;
use crate::StorageConfig;
use tempfile::TempDir;

async fn setup_store() -> (TempDir, StorageConfig, BookmarkStore) {
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig {
        galleries_file: temp_dir.path().join("galleries.json"),
        bookmarks_file: temp_dir.path().join("data/bookmarks.json"),
        categories_file: temp_dir.path().join("data/categories.json"),
        uploads_directory: temp_dir.path().join("uploads"),
        staging_directory: temp_dir.path().join("staging"),
        uploads_url_prefix: "/uploads".to_string(),
    };
    let store = BookmarkStore::load(&config).await.unwrap();
    (temp_dir, config, store)
}

fn request(title: &str, url: &str, category: &str) -> AddBookmarkRequest {
    AddBookmarkRequest {
        title: title.to_string(),
        url: url.to_string(),
        category: category.to_string(),
    }
}

#[tokio::test]
async fn test_load_seeds_documents() {
    let (_temp_dir, config, store) = setup_store().await;

    assert!(config.bookmarks_file.exists());
    assert!(config.categories_file.exists());
    assert_eq!(store.categories().len(), 8);
    assert!(store.list(&BookmarkQuery::default()).await.is_empty());
}

#[tokio::test]
async fn test_add_assigns_increasing_ids_and_persists() {
    let (_temp_dir, config, store) = setup_store().await;

    let first = store
        .add(request("Rust", "https://www.rust-lang.org", "Technology"))
        .await
        .unwrap();
    let second = store
        .add(request("Docs", "https://docs.rs", "Technology"))
        .await
        .unwrap();

    assert!(second.id > first.id);
    assert!(first.created_at.ends_with('Z'));

    let saved: Vec<Bookmark> =
        serde_json::from_slice(&std::fs::read(&config.bookmarks_file).unwrap()).unwrap();
    assert_eq!(saved, vec![first, second]);
}

#[tokio::test]
async fn test_add_rejects_blank_title_or_url() {
    let (_temp_dir, _config, store) = setup_store().await;

    assert!(matches!(
        store.add(request("  ", "https://a.example", "")).await,
        Err(BookmarkError::InvalidInput(_))
    ));
    assert!(matches!(
        store.add(request("A", "", "")).await,
        Err(BookmarkError::InvalidInput(_))
    ));
    assert!(store.list(&BookmarkQuery::default()).await.is_empty());
}

#[tokio::test]
async fn test_list_sorts_and_searches() {
    let (_temp_dir, _config, store) = setup_store().await;
    store.add(request("beta", "https://b.example", "News")).await.unwrap();
    store.add(request("Alpha", "https://a.example", "Work")).await.unwrap();
    store.add(request("gamma", "https://news.example", "Games")).await.unwrap();

    let titles = |list: Vec<Bookmark>| list.into_iter().map(|b| b.title).collect::<Vec<_>>();

    let stored = store.list(&BookmarkQuery::default()).await;
    assert_eq!(titles(stored), vec!["beta", "Alpha", "gamma"]);

    let by_name = store
        .list(&BookmarkQuery {
            q: None,
            sort: Some(BookmarkSort::NameAsc),
        })
        .await;
    assert_eq!(titles(by_name), vec!["Alpha", "beta", "gamma"]);

    let by_category = store
        .list(&BookmarkQuery {
            q: None,
            sort: Some(BookmarkSort::CategoryDesc),
        })
        .await;
    assert_eq!(titles(by_category), vec!["Alpha", "beta", "gamma"]);

    let searched = store
        .list(&BookmarkQuery {
            q: Some(" NEWS ".to_string()),
            sort: Some(BookmarkSort::NameDesc),
        })
        .await;
    assert_eq!(titles(searched), vec!["gamma", "beta"]);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (_temp_dir, config, store) = setup_store().await;
    let bookmark = store
        .add(request("Rust", "https://www.rust-lang.org", ""))
        .await
        .unwrap();

    store.delete(bookmark.id).await.unwrap();
    store.delete(bookmark.id).await.unwrap();

    assert!(store.list(&BookmarkQuery::default()).await.is_empty());
    let saved: Vec<Bookmark> =
        serde_json::from_slice(&std::fs::read(&config.bookmarks_file).unwrap()).unwrap();
    assert!(saved.is_empty());
}
