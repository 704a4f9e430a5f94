use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct AddBookmarkRequest {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookmarkSort {
    NameAsc,
    NameDesc,
    CategoryAsc,
    CategoryDesc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkQuery {
    pub q: Option<String>,
    pub sort: Option<BookmarkSort>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBookmarkResponse {
    pub message: String,
}

/// Seeded on first start; the bundled pages compare against these strings.
pub(crate) const DEFAULT_CATEGORIES: [&str; 8] = [
    "Работа",
    "Образование",
    "Игры",
    "Новости",
    "Развлечения",
    "Социальные сети",
    "Спорт",
    "Технологии",
];
