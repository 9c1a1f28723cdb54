//! The append-only record store of one process role.
//!
//! Every operation re-reads the persisted document, mutates it and writes it
//! back while holding `gate`, so the document on disk is the only state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{PlayerEntity, RecordSetEntity, StoreDocument, now_iso, now_stamp},
        storage::{StorageError, StorageResult},
    },
    state::numbering,
};

/// Fixed note attached to records created by the game-facing role.
pub const GENERATED_INFO: &str = "game generated player record";

/// Validated fields of a record that has not been numbered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerDraft {
    /// Label without any number prefix.
    pub label: String,
    /// Money at the end of the run.
    pub money: i64,
    /// Physical condition.
    pub body_state: i64,
    /// Red colour channel.
    pub r: u8,
    /// Green colour channel.
    pub g: u8,
    /// Blue colour channel.
    pub b: u8,
}

impl PlayerDraft {
    fn into_record(self, number: u64) -> PlayerEntity {
        PlayerEntity {
            name: numbering::record_name(number, &self.label),
            money: self.money,
            age: 18,
            body_state: self.body_state,
            mind_state: 100,
            iq: 120,
            ei: 120,
            r: self.r,
            g: self.g,
            b: self.b,
            additional_info: GENERATED_INFO.into(),
            number,
            timestamp: now_iso(),
        }
    }
}

/// Records removed from the front of the store by [`RecordStore::drain_first`].
#[derive(Debug, Clone)]
pub struct Drained {
    /// Drained records in order.
    pub records: Vec<PlayerEntity>,
    /// How many were asked for; larger than `records.len()` on a deficit.
    pub requested: usize,
    /// Document as persisted after the drain.
    pub document: StoreDocument,
}

/// Counts reported after an incremental merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Records merged.
    pub received: usize,
    /// Resident records afterwards.
    pub total: usize,
    /// Number assigned to the first merged record.
    pub base: u64,
}

/// Where a replacing or merging batch came from.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    /// Sender identity.
    pub source_server: Option<String>,
    /// Transfer mode name.
    pub transfer_type: Option<String>,
}

/// Append-only collection of player records plus summary metadata.
pub struct RecordStore {
    backend: Arc<dyn DocumentStore>,
    gate: Mutex<()>,
    description: Option<String>,
    origin: Option<String>,
}

impl RecordStore {
    /// Wrap a document backend. `description` and `origin` seed fresh documents.
    pub fn new(
        backend: Arc<dyn DocumentStore>,
        description: Option<String>,
        origin: Option<String>,
    ) -> Self {
        Self {
            backend,
            gate: Mutex::new(()),
            description,
            origin,
        }
    }

    /// Create a valid empty document when nothing (or garbage) is persisted.
    pub async fn initialize(&self) -> StorageResult<()> {
        let _guard = self.gate.lock().await;
        match self.backend.load().await {
            Ok(Some(document)) => {
                info!(
                    location = %self.backend.describe(),
                    resident = document.received_data.players.len(),
                    total = document.received_data.metadata.total_count,
                    "record store loaded"
                );
                Ok(())
            }
            Ok(None) => {
                info!(location = %self.backend.describe(), "creating empty record store");
                self.backend.save(self.empty_document()).await
            }
            Err(StorageError::Corrupt { message, .. }) => {
                warn!(
                    location = %self.backend.describe(),
                    error = %message,
                    "persisted document is corrupt; reinitializing empty store"
                );
                self.backend.save(self.empty_document()).await
            }
            Err(err) => Err(err),
        }
    }

    /// Allocate numbers for `drafts` and append them as one lock-held step.
    ///
    /// Numbers are `total_count..total_count + drafts.len()` in input order.
    pub async fn append_batch(&self, drafts: Vec<PlayerDraft>) -> StorageResult<Vec<PlayerEntity>> {
        let _guard = self.gate.lock().await;
        let mut document = self.read_locked().await?;

        let numbers = numbering::allocate_batch(&document.received_data.metadata, drafts.len());
        let records = drafts
            .into_iter()
            .zip(numbers)
            .map(|(draft, number)| draft.into_record(number))
            .collect::<Vec<_>>();

        for record in &records {
            append(&mut document, record.clone());
        }
        touch(&mut document);

        self.backend.save(document).await?;
        Ok(records)
    }

    /// Allocate a number for a single draft and append it.
    pub async fn append_one(&self, draft: PlayerDraft) -> StorageResult<PlayerEntity> {
        let mut records = self.append_batch(vec![draft]).await?;
        records.pop().ok_or_else(|| {
            StorageError::unavailable(
                "append produced no record".into(),
                std::io::Error::other("empty append batch"),
            )
        })
    }

    /// Consistent copy of the resident records, metadata and provenance.
    pub async fn snapshot(&self) -> StorageResult<StoreDocument> {
        let _guard = self.gate.lock().await;
        self.read_locked().await
    }

    /// Substitute resident records and metadata wholesale, verbatim.
    pub async fn replace_all(
        &self,
        data: RecordSetEntity,
        provenance: Provenance,
    ) -> StorageResult<usize> {
        let _guard = self.gate.lock().await;
        let resident = data.players.len();
        let document = StoreDocument {
            received_data: data,
            received_at: Some(now_stamp()),
            source_server: provenance.source_server,
            transfer_type: provenance.transfer_type,
        };

        self.backend.save(document).await?;
        debug!(resident, "record store replaced");
        Ok(resident)
    }

    /// Re-number `incoming` after the highest resident number and append it.
    pub async fn merge_incremental(
        &self,
        incoming: Vec<PlayerEntity>,
        provenance: Provenance,
    ) -> StorageResult<MergeOutcome> {
        let _guard = self.gate.lock().await;
        let mut document = self.read_locked().await?;

        let base = numbering::merge_base(&document.received_data.players);
        let received = incoming.len();
        let stamp = now_iso();
        for (offset, mut player) in incoming.into_iter().enumerate() {
            player.number = base + offset as u64;
            player.timestamp = stamp.clone();
            document.received_data.players.push(player);
        }

        let total = document.received_data.players.len();
        let metadata = &mut document.received_data.metadata;
        metadata.total_count = (total as u64)
            .max(metadata.total_count)
            .max(metadata.current_cursor);
        document.source_server = provenance.source_server;
        document.transfer_type = provenance.transfer_type;
        touch(&mut document);

        self.backend.save(document).await?;
        Ok(MergeOutcome {
            received,
            total,
            base,
        })
    }

    /// Remove the first `count` resident records in stored order and advance
    /// the cursor by the number actually removed.
    pub async fn drain_first(&self, count: usize) -> StorageResult<Drained> {
        let _guard = self.gate.lock().await;
        let mut document = self.read_locked().await?;

        let players = &mut document.received_data.players;
        let take = count.min(players.len());
        let records = players.drain(..take).collect::<Vec<_>>();

        let metadata = &mut document.received_data.metadata;
        metadata.current_cursor = (metadata.current_cursor + take as u64).min(metadata.total_count);
        touch(&mut document);

        self.backend.save(document.clone()).await?;
        Ok(Drained {
            records,
            requested: count,
            document,
        })
    }

    /// Load the document; callers must hold `gate`.
    async fn read_locked(&self) -> StorageResult<StoreDocument> {
        match self.backend.load().await {
            Ok(Some(document)) => Ok(document),
            Ok(None) => Ok(self.empty_document()),
            Err(StorageError::Corrupt { message, .. }) => {
                warn!(
                    location = %self.backend.describe(),
                    error = %message,
                    "persisted document is corrupt; continuing from an empty store"
                );
                Ok(self.empty_document())
            }
            Err(err) => Err(err),
        }
    }

    fn empty_document(&self) -> StoreDocument {
        StoreDocument::empty(self.description.clone(), self.origin.clone())
    }
}

fn append(document: &mut StoreDocument, record: PlayerEntity) {
    document.received_data.players.push(record);
    document.received_data.metadata.total_count += 1;
}

fn touch(document: &mut StoreDocument) {
    let stamp = now_stamp();
    document.received_data.metadata.last_updated = stamp.clone();
    document.received_at = Some(stamp);
}
