// Gallery module - Main entry point
mod error;
mod handlers;
mod intake;
mod mutators;
mod orphans;
mod store;
mod types;
mod upload;

// Re-export public items
pub use error::GalleryError;
pub use handlers::{
    create_gallery_handler, delete_image_handler, list_galleries_handler, rename_handler,
    upload_handler,
};
pub use store::{GalleryStore, validate_gallery_name};
pub use types::*;

use std::sync::Arc;

pub type SharedGalleryStore = Arc<GalleryStore>;
