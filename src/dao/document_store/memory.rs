use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use crate::dao::{
    document_store::DocumentStore,
    models::StoreDocument,
    storage::{StorageError, StorageResult},
};

#[derive(Debug)]
enum Slot {
    Empty,
    Document(StoreDocument),
    /// Raw bytes that fail to decode, used to exercise corrupt-state recovery.
    Garbage(String),
}

/// In-process document store, mostly useful for tests and throwaway runs.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    slot: Arc<Mutex<Slot>>,
}

impl MemoryDocumentStore {
    /// Store with nothing persisted yet.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Empty)),
        }
    }

    /// Start from an already persisted document.
    pub fn with_document(document: StoreDocument) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Document(document))),
        }
    }

    /// Start from content that cannot be parsed.
    pub fn with_garbage(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Garbage(raw.into()))),
        }
    }

    /// Last document written, if any.
    pub fn current(&self) -> Option<StoreDocument> {
        match &*self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) {
            Slot::Document(document) => Some(document.clone()),
            _ => None,
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<StoreDocument>>> {
        let slot = self.slot.clone();
        Box::pin(async move {
            let guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match &*guard {
                Slot::Empty => Ok(None),
                Slot::Document(document) => Ok(Some(document.clone())),
                Slot::Garbage(raw) => serde_json::from_str::<StoreDocument>(raw)
                    .map(Some)
                    .map_err(|source| StorageError::corrupt("in-memory document".into(), source)),
            }
        })
    }

    fn save(&self, document: StoreDocument) -> BoxFuture<'static, StorageResult<()>> {
        let slot = self.slot.clone();
        Box::pin(async move {
            let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = Slot::Document(document);
            Ok(())
        })
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
