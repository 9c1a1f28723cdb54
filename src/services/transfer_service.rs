//! Outbound transfer: ship resident records and staged files to the remote
//! role, then drain what was delivered.
//!
//! Delivery is at-least-once. The network call happens outside the store
//! lock, and cleanup only runs after the remote side confirmed the batch, so
//! a failure at any point leaves every record and staged file in place for
//! the next attempt.

use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::remote_store::DeliveryError,
    dto::transfer::{TransferEnvelope, TransferRequest, TransferResponse},
    error::ServiceError,
    services::artifacts::{self, StagedFile},
    state::SharedState,
};

/// Collect, deliver and (on success) clean up one batch.
pub async fn push_batch(
    state: &SharedState,
    request: TransferRequest,
) -> Result<TransferResponse, ServiceError> {
    let _transfer = state.lock_transfers().await;
    let config = state.config();
    let transfer_type = request.transfer_type;

    let document = state.store().snapshot().await?;
    let total_players = document.received_data.players.len();
    if total_players == 0 {
        info!(transfer_type = transfer_type.as_str(), "no resident records; transfer skipped");
        return Ok(TransferResponse {
            status: "success".into(),
            message: "no players to transfer".into(),
            transfer_type,
            transfer_id: None,
            total_players: 0,
            files_count: 0,
            cloud_transfer_executed: false,
            drained_count: 0,
            files_deleted: 0,
            metadata: document.received_data.metadata,
            remote: None,
            samples: request.requested_samples.map(|_| Vec::new()),
            requested_samples: request.requested_samples,
            actual_samples: request.requested_samples.map(|_| 0),
        });
    }

    let remote = state.remote().ok_or_else(|| {
        ServiceError::InvalidState("no remote store configured for transfers".into())
    })?;

    let staged = artifacts::collect_staged(&config.staging_dir, &config.staged_extensions).await;
    let transfer_id = Uuid::new_v4();
    let envelope = TransferEnvelope {
        transfer_id: Some(transfer_id),
        status: "success".into(),
        transfer_type,
        data: document.received_data,
        total_players: Some(total_players),
        files: staged.iter().map(|file| file.payload.clone()).collect(),
        source: Some(config.origin()),
    };

    info!(
        %transfer_id,
        transfer_type = transfer_type.as_str(),
        players = total_players,
        files = staged.len(),
        target = %remote.describe(),
        "delivering batch"
    );

    let delivered = match timeout(config.transfer_timeout, remote.receive_transfer(envelope)).await
    {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout {
            url: remote.describe(),
        }),
    };
    let remote_response = match delivered {
        Ok(response) => response,
        Err(err) => {
            warn!(%transfer_id, error = %err, "delivery failed; local records and files kept");
            return Err(err.into());
        }
    };

    let drain_count = match request.requested_samples {
        Some(requested) => usize::try_from(requested)
            .unwrap_or(usize::MAX)
            .min(total_players),
        None => total_players,
    };
    let drained = state.store().drain_first(drain_count).await?;
    let files_deleted = cleanup_files(&staged).await;

    info!(
        %transfer_id,
        drained = drained.records.len(),
        files_deleted,
        remote_total = remote_response.total_count,
        "batch delivered"
    );

    let drained_count = drained.records.len();
    let sampled = request.requested_samples.is_some();
    Ok(TransferResponse {
        status: "success".into(),
        message: format!("transferred {total_players} players and {} files", staged.len()),
        transfer_type,
        transfer_id: Some(transfer_id),
        total_players,
        files_count: staged.len(),
        cloud_transfer_executed: true,
        drained_count,
        files_deleted,
        metadata: drained.document.received_data.metadata,
        remote: Some(remote_response),
        actual_samples: sampled.then_some(drained_count),
        samples: sampled.then_some(drained.records),
        requested_samples: request.requested_samples,
    })
}

async fn cleanup_files(staged: &[StagedFile]) -> usize {
    let deleted = artifacts::remove_staged(staged).await;
    if deleted < staged.len() {
        warn!(
            deleted,
            sent = staged.len(),
            "some transferred files could not be deleted"
        );
    }
    deleted
}
