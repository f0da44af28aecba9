use thiserror::Error;

use refsplit_core::RefsplitError;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Core(#[from] RefsplitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReferenceError>;
