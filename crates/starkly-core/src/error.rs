use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StarklyError {
    #[error("document could not be parsed as HTML: {0}")]
    UnparsableDocument(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
