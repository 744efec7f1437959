#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("ltx parse error: {0}")]
    LtxParse(String),

    #[error("game paths not resolved: {0}")]
    Paths(String),

    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("option not found: {0}")]
    OptionNotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
