//! In-memory backend for tests and ephemeral runs.

use super::{CredentialBackend, StoreError};
use std::sync::{Arc, Mutex, PoisonError};

/// Keeps the credential record in process memory.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with raw bytes (e.g. a corrupt record).
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }
}

impl CredentialBackend for MemoryBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, contents: &[u8]) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_vec());
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
