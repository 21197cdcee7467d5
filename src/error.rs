use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid board key: {0:?}")]
    InvalidBoardKey(String),

    #[error("Invalid item ID: {0:?}")]
    InvalidItemId(String),

    #[error("Invalid store path: {0:?}")]
    InvalidPath(String),

    #[error("Permission denied writing to {0}")]
    PermissionDenied(String),

    #[error("Board sync engine is closed")]
    EngineClosed,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Other(String),
}
