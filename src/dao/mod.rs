/// Persisted document backends.
pub mod document_store;
/// Persisted document model definitions.
pub mod models;
/// Client side of the remote aggregation store.
pub mod remote_store;
/// Storage error types shared by document backends.
pub mod storage;
