//! Credential persistence.
//!
//! The store owns the single WHOOP credential; where the bytes live is up to
//! the injected [`CredentialBackend`].

pub mod file;
pub mod memory;
pub mod store;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::CredentialStore;

/// Raw storage for the serialized credential record.
pub trait CredentialBackend: Send + Sync {
    /// Read the stored record, `None` if nothing has been written.
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the stored record. Must not leave a partial record behind.
    fn write(&self, contents: &[u8]) -> Result<(), StoreError>;

    /// Remove the stored record. Removing a missing record is not an error.
    fn remove(&self) -> Result<(), StoreError>;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize credential: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Token lifetime out of range: {0}s")]
    InvalidLifetime(i64),
}

impl From<StoreError> for crate::error::AppError {
    fn from(err: StoreError) -> Self {
        crate::error::AppError::Storage(err.to_string())
    }
}
