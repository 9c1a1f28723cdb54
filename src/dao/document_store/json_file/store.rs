use std::{io::ErrorKind, sync::Arc};

use futures::future::BoxFuture;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use crate::dao::{
    document_store::DocumentStore, models::StoreDocument, storage::StorageResult,
};

use super::{
    config::JsonFileConfig,
    error::{JsonStoreError, JsonStoreResult},
};

/// Document store backed by a single JSON file replaced atomically on save.
#[derive(Clone)]
pub struct JsonFileStore {
    config: Arc<JsonFileConfig>,
}

impl JsonFileStore {
    /// Build a store for the configured path. Nothing is touched on disk yet.
    pub fn new(config: JsonFileConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    async fn read(&self) -> JsonStoreResult<Option<StoreDocument>> {
        let path = &self.config.path;
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(JsonStoreError::Read {
                    path: path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| JsonStoreError::Parse {
                path: path.clone(),
                source,
            })
    }

    /// Write to a sibling temp file, sync it, then rename over the target so
    /// a crash leaves either the old or the new document in place.
    async fn write(&self, document: &StoreDocument) -> JsonStoreResult<()> {
        let path = &self.config.path;
        let temp_path = self.config.temp_path();
        let write_err = |source| JsonStoreError::Write {
            path: path.clone(),
            source,
        };

        let payload =
            serde_json::to_vec_pretty(document).map_err(|source| JsonStoreError::Encode {
                path: path.clone(),
                source,
            })?;

        if let Some(parent) = self.config.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut file = fs::File::create(&temp_path).await.map_err(write_err)?;
        file.write_all(&payload).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        if let Err(source) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(write_err(source));
        }

        debug!(path = %path.display(), bytes = payload.len(), "document replaced");
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<StoreDocument>>> {
        let store = self.clone();
        Box::pin(async move { store.read().await.map_err(Into::into) })
    }

    fn save(&self, document: StoreDocument) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write(&document).await.map_err(Into::into) })
    }

    fn describe(&self) -> String {
        self.config.path.display().to_string()
    }
}
