/// Error types shared by the item sources, the catalog and the media loaders
///
/// The pure gallery core (filtering, slides, lightbox) never fails; errors only
/// come from I/O at the edges.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GalleryError>;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("video decode failed: {0}")]
    Video(String),

    #[error("invalid settings: {0}")]
    Config(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },

    #[error("could not determine the {0} directory")]
    NoDirectory(&'static str),

    #[error("window error: {0}")]
    Ui(#[from] iced::Error),
}

impl GalleryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GalleryError::Io {
            path: path.into(),
            source,
        }
    }
}
