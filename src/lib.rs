use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod bookmarks;
pub mod gallery;
pub mod pages;
pub mod startup_checks;
pub mod static_files;
pub mod storage;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub static_files: StaticConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON document holding every gallery and its image records.
    pub galleries_file: PathBuf,
    pub bookmarks_file: PathBuf,
    pub categories_file: PathBuf,
    /// One sub-folder per gallery lives here.
    pub uploads_directory: PathBuf,
    /// Multipart file parts are written here before being moved into a gallery.
    pub staging_directory: PathBuf,
    /// Public URL prefix under which `uploads_directory` is served.
    pub uploads_url_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            galleries_file: PathBuf::from("galleries.json"),
            bookmarks_file: PathBuf::from("data/bookmarks.json"),
            categories_file: PathBuf::from("data/categories.json"),
            uploads_directory: PathBuf::from("public/uploads"),
            staging_directory: PathBuf::from("data/staging"),
            uploads_url_prefix: "/uploads".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    pub public_directory: PathBuf,
    pub views_directory: PathBuf,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            public_directory: PathBuf::from("public"),
            views_directory: PathBuf::from("views"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_size: u64,
    pub max_field_size: u64,
    /// Lowercase extensions accepted without an `application/octet-stream` content type.
    pub allowed_extensions: Vec<String>,
    /// Width and height recorded for external links, whose pixels are never fetched.
    pub external_placeholder_size: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: 3000,
            max_file_size: 500 * 1024 * 1024,
            max_field_size: 500 * 1024 * 1024,
            allowed_extensions: [
                "jpeg", "jpg", "png", "gif", "webp", "svg", "bmp", "tiff", "avif", "heif",
            ]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
            external_placeholder_size: 300,
        }
    }
}

impl UploadConfig {
    /// Transport-level filter: known image extensions pass, and so does anything
    /// declared as a generic binary stream.
    pub fn accepts(&self, file_name: &str, content_type: Option<&str>) -> bool {
        if content_type
            .map(|ct| ct.eq_ignore_ascii_case("application/octet-stream"))
            .unwrap_or(false)
        {
            return true;
        }

        match file_name.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            app: AppConfig {
                name: "Mediashelf".to_string(),
                log_level: "info".to_string(),
            },
            storage: StorageConfig::default(),
            static_files: StaticConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::Uri,
    response::IntoResponse,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub galleries: gallery::SharedGalleryStore,
    pub bookmarks: bookmarks::SharedBookmarkStore,
    pub public_files: static_files::StaticFileHandler,
    pub views: static_files::StaticFileHandler,
    pub config: Config,
}

async fn public_file_handler(State(app_state): State<AppState>, uri: Uri) -> impl IntoResponse {
    app_state.public_files.serve(uri.path()).await
}

pub async fn create_app(config: Config) -> Result<Router, Box<dyn std::error::Error + Send + Sync>> {
    let galleries = Arc::new(
        gallery::GalleryStore::load(config.storage.clone(), config.upload.clone()).await?,
    );
    let bookmarks = Arc::new(bookmarks::BookmarkStore::load(&config.storage).await?);

    let public_files =
        static_files::StaticFileHandler::new(config.static_files.public_directory.clone());
    let views = static_files::StaticFileHandler::new(config.static_files.views_directory.clone());

    let uploads_service = ServeDir::new(config.storage.uploads_directory.clone());
    let uploads_prefix = format!(
        "/{}",
        config.storage.uploads_url_prefix.trim_matches('/')
    );

    let app_state = AppState {
        galleries,
        bookmarks,
        public_files,
        views,
        config: config.clone(),
    };

    let router = Router::new()
        .route("/", get(pages::index_page))
        .route("/gallery", get(pages::gallery_page))
        .route("/favorites", get(pages::favorites_page))
        .route("/github", get(pages::github_page))
        .route("/parallax", get(pages::parallax_page))
        .route("/galleries", get(gallery::list_galleries_handler))
        .route("/create-gallery", post(gallery::create_gallery_handler))
        .route(
            "/upload",
            post(gallery::upload_handler).layer(DefaultBodyLimit::disable()),
        )
        .route("/rename", post(gallery::rename_handler))
        .route("/delete-image", post(gallery::delete_image_handler))
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks_handler).post(bookmarks::add_bookmark_handler),
        )
        .route("/bookmarks/{id}", delete(bookmarks::delete_bookmark_handler))
        .route("/categories", get(bookmarks::categories_handler))
        .nest_service(&uploads_prefix, uploads_service)
        .fallback(public_file_handler)
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &axum::http::Request<_>| {
                        let method = request.method();
                        let uri = request.uri();
                        let matched_path = request
                            .extensions()
                            .get::<axum::extract::MatchedPath>()
                            .map(|matched_path| matched_path.as_str());

                        tracing::info_span!(
                            "http_request",
                            method = %method,
                            uri = %uri,
                            matched_path,
                        )
                    })
                    .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                        let user_agent = request
                            .headers()
                            .get("user-agent")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            method = %request.method(),
                            path = %request.uri().path(),
                            query = ?request.uri().query(),
                            user_agent = %user_agent,
                            "request"
                        );
                    })
                    .on_response(
                        |response: &axum::http::Response<_>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            let size = response
                                .headers()
                                .get("content-length")
                                .and_then(|h| h.to_str().ok())
                                .unwrap_or("-");

                            tracing::info!(
                                target: "access_log",
                                status = %response.status(),
                                size = %size,
                                latency_ms = %latency.as_millis(),
                                "response"
                            );
                        },
                    ),
            ),
        )
        .with_state(app_state);

    Ok(router)
}
