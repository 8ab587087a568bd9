use photobooth_core::error::CoreError;

/// Error type for every [`AssetStore`](crate::AssetStore) operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The frame, photo, log entry or asset does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A domain rule rejected the input (bad name, bad key, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Filesystem failure in the local backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A metadata document could not be (de)serialized.
    #[error("Document serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Failure reported by a remote storage service.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Core(CoreError::NotFound { .. })
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
