use pitchcraft_editor::EditorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Catalog '{variant}' failed to load: {reason}")]
    CatalogLoad { variant: String, reason: String },

    #[error("Failed to persist draft '{key}': {reason}")]
    PersistenceWrite { key: String, reason: String },

    #[error("Invalid draft key '{0}'")]
    InvalidKey(String),

    #[error("Snippet edit sink closed")]
    SinkClosed,

    #[error("Failed to watch catalogs: {0}")]
    Watch(#[from] notify::Error),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
