use thiserror::Error;

use crate::model::ContentCategory;

/// Core error types for content access.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid content model: {0}")]
    InvalidModel(String),

    #[error("Content store error: {0}")]
    Store(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a new InvalidModel error
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel(message.into())
    }

    /// Create a new Store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

/// Errors raised by content repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// `all()` (or a lookup) was called before `load()`.
    #[error("{category} repository accessed before it was loaded")]
    NotLoaded { category: ContentCategory },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RepositoryError {
    /// Create a new NotLoaded error
    pub fn not_loaded(category: ContentCategory) -> Self {
        Self::NotLoaded { category }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
