/// Allocation of sequence numbers.
pub mod numbering;
/// Lock-guarded record store.
pub mod record_store;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};

use crate::{
    config::AppConfig,
    dao::{document_store::DocumentStore, remote_store::RemoteStore},
    services::{artifact_gate::ArtifactGate, render::Renderer},
};

pub use self::record_store::RecordStore;

/// State handle shared by every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the role's record store plus its collaborators.
pub struct AppState {
    config: AppConfig,
    store: RecordStore,
    remote: Option<Arc<dyn RemoteStore>>,
    gate: Arc<ArtifactGate>,
    degraded: watch::Sender<bool>,
    transfer_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// `remote` is only used by the local role; the remote role passes `None`.
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn DocumentStore>,
        remote: Option<Arc<dyn RemoteStore>>,
        renderer: Arc<dyn Renderer>,
    ) -> SharedState {
        let store = RecordStore::new(backend, config.description.clone(), Some(config.origin()));
        let gate = Arc::new(ArtifactGate::new(
            config.skip_labels.iter().cloned(),
            config.output_dir.clone(),
            renderer,
        ));
        let (degraded_tx, _rx) = watch::channel(false);

        Arc::new(Self {
            config,
            store,
            remote,
            gate,
            degraded: degraded_tx,
            transfer_gate: Mutex::new(()),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The record store of this process role.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Client of the remote aggregation service, when one is configured.
    pub fn remote(&self) -> Option<Arc<dyn RemoteStore>> {
        self.remote.clone()
    }

    /// Generation gate of the remote role.
    pub fn gate(&self) -> Arc<ArtifactGate> {
        self.gate.clone()
    }

    /// Serialize outbound transfers so two triggers never ship the same records.
    pub async fn lock_transfers(&self) -> MutexGuard<'_, ()> {
        self.transfer_gate.lock().await
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}
