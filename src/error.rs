use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapError>;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Input file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Cannot build a map view from an empty dataset")]
    EmptyDataset,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl MapError {
    /// Whether this error means the dataset could not be loaded at all.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            MapError::FileNotFound { .. } | MapError::Io(_) | MapError::Parse { .. }
        )
    }
}
