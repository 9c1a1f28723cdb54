/// Document store kept in a single JSON file.
pub mod json_file;
mod memory;

use futures::future::BoxFuture;

use crate::dao::{models::StoreDocument, storage::StorageResult};

pub use self::memory::MemoryDocumentStore;

/// Abstraction over where a store role keeps its single persisted document.
///
/// Implementations must replace the document wholesale on `save`: a reader
/// never observes a partially written document.
pub trait DocumentStore: Send + Sync {
    /// Read the current document. `Ok(None)` means nothing was persisted yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<StoreDocument>>>;
    /// Overwrite the persisted document.
    fn save(&self, document: StoreDocument) -> BoxFuture<'static, StorageResult<()>>;
    /// Short human readable location used in logs.
    fn describe(&self) -> String;
}
