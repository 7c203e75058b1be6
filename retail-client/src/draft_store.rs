//! Durable storage for the pending draft order
//!
//! The draft must outlive the redirect to the payment gateway, so it is
//! written before the payment request goes out and removed by the return
//! handler. There is a single slot: saving a new draft replaces any older
//! one.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use shared::models::DraftOrder;
use thiserror::Error;

/// File name of the persisted draft inside the draft directory
pub const DRAFT_FILE_NAME: &str = "pending_order.json";

#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DraftResult<T> = Result<T, DraftStoreError>;

/// Single-slot store for the draft order awaiting payment
pub trait DraftStore: Send + Sync {
    /// Persist `draft`, replacing whatever was stored.
    fn save(&self, draft: &DraftOrder) -> DraftResult<()>;

    /// Read the stored draft without removing it.
    fn load(&self) -> DraftResult<Option<DraftOrder>>;

    /// Remove the stored draft. Clearing an empty slot is not an error.
    fn clear(&self) -> DraftResult<()>;

    /// Read and remove the stored draft.
    ///
    /// The slot is cleared even when the stored draft cannot be read.
    fn take(&self) -> DraftResult<Option<DraftOrder>> {
        let draft = self.load();
        self.clear()?;
        draft
    }
}

impl<T: DraftStore + ?Sized> DraftStore for Arc<T> {
    fn save(&self, draft: &DraftOrder) -> DraftResult<()> {
        (**self).save(draft)
    }

    fn load(&self) -> DraftResult<Option<DraftOrder>> {
        (**self).load()
    }

    fn clear(&self) -> DraftResult<()> {
        (**self).clear()
    }
}

/// Draft store backed by a JSON file: `{dir}/pending_order.json`
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    file_path: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            file_path: dir.join(DRAFT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl DraftStore for FileDraftStore {
    fn save(&self, draft: &DraftOrder) -> DraftResult<()> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(draft)?;
        std::fs::write(&self.file_path, content)?;
        tracing::debug!(tx_ref = %draft.tx_ref, "Draft order saved");
        Ok(())
    }

    fn load(&self) -> DraftResult<Option<DraftOrder>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.file_path)?;
        let draft: DraftOrder = serde_json::from_str(&content)?;
        Ok(Some(draft))
    }

    fn clear(&self) -> DraftResult<()> {
        if self.file_path.exists() {
            std::fs::remove_file(&self.file_path)?;
            tracing::debug!("Draft order cleared");
        }
        Ok(())
    }
}

/// In-memory draft store
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    slot: Mutex<Option<DraftOrder>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, draft: &DraftOrder) -> DraftResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(draft.clone());
        Ok(())
    }

    fn load(&self) -> DraftResult<Option<DraftOrder>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn clear(&self) -> DraftResult<()> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}
