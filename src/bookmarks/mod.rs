pub mod store;
pub mod error;
pub mod handlers;
pub mod types;

pub use store::BookmarkStore;
pub use error::BookmarkError;
pub use handlers::{
    add_bookmark_handler, categories_handler, delete_bookmark_handler, list_bookmarks_handler,
};
pub use types::{AddBookmarkRequest, Bookmark, BookmarkQuery, BookmarkSort};

pub type SharedBookmarkStore = std::sync::Arc<BookmarkStore>;

#[cfg(test)]
mod tests;
