//! Error types for palaeo-core

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The language code is not one the catalog knows about
    #[error("Language '{0}' either not in scope or not supported by the NLP backend.")]
    UnknownLanguage(String),

    /// The language is known but the requested treebank is not available for it
    #[error("Invalid treebank '{treebank}' for language '{language}'.")]
    UnimplementedLanguage { language: String, treebank: String },

    /// The catalog tables disagree with each other
    #[error("Catalog inconsistency: {0}")]
    CatalogInconsistency(String),

    #[error("Missing required models at {}.", .0.display())]
    ModelMissing(PathBuf),

    #[error("Download error: {0}")]
    DownloadError(String),

    #[error("Pipeline error: {0}")]
    PipelineError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller can fix this by changing the requested language or treebank.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownLanguage(_) | Error::UnimplementedLanguage { .. } | Error::InvalidInput(_)
        )
    }
}
