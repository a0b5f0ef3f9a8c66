use crate::ai::AiError;

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid visit input: {0}")]
    Types(#[from] nursenote_types::TypesError),
    #[error("invalid record id: {0}")]
    RecordId(#[from] nursenote_uuid::UuidError),
    #[error("visit record not found: {0}")]
    RecordNotFound(String),

    #[error("AI generation failed: {0}")]
    Ai(#[from] AiError),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create record directory: {0}")]
    RecordDirCreation(std::io::Error),
    #[error(
        "save failed and cleanup also failed (path: {path}): save={save_error}; cleanup={cleanup_error}",
        path = path.display()
    )]
    CleanupAfterSaveFailed {
        path: std::path::PathBuf,
        #[source]
        save_error: Box<NoteError>,
        cleanup_error: std::io::Error,
    },
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
}

pub type NoteResult<T> = std::result::Result<T, NoteError>;
