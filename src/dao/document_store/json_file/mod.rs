//! Document store persisting the whole store as one pretty-printed JSON file.

/// Location of the JSON document.
pub mod config;
/// Backend specific errors.
pub mod error;
/// The file-backed store itself.
pub mod store;

pub use config::JsonFileConfig;
pub use error::{JsonStoreError, JsonStoreResult};
pub use store::JsonFileStore;
