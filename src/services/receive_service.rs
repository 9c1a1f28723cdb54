//! Inbound transfer on the remote role: apply the batch to the record store,
//! persist its artifacts and run the generation gate on new telemetry.

use tracing::{info, warn};

use crate::{
    dto::transfer::{ReceiveResponse, TransferEnvelope, TransferType},
    error::ServiceError,
    services::{
        artifact_gate::GateReport,
        artifacts::{self, ArtifactKind},
    },
    state::{SharedState, record_store::Provenance},
};

/// Sender identity recorded when the envelope does not carry one.
const UNKNOWN_SOURCE: &str = "unknown";

/// Apply one delivered envelope.
pub async fn receive_transfer(
    state: &SharedState,
    envelope: TransferEnvelope,
) -> Result<ReceiveResponse, ServiceError> {
    if envelope.status != "success" {
        return Err(ServiceError::InvalidInput(format!(
            "transfer status must be \"success\", got {:?}",
            envelope.status
        )));
    }

    let transfer_type = envelope.transfer_type;
    let provenance = Provenance {
        source_server: Some(
            envelope
                .source
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        ),
        transfer_type: Some(transfer_type.as_str().to_string()),
    };
    let transfer_id = envelope
        .transfer_id
        .map(|id| id.to_string())
        .unwrap_or_default();

    let (received_count, total_count) = match transfer_type {
        TransferType::FullCopy => {
            let metadata = &envelope.data.metadata;
            if metadata.current_cursor > metadata.total_count {
                return Err(ServiceError::InvalidInput(format!(
                    "current_number {} exceeds total_players {}",
                    metadata.current_cursor, metadata.total_count
                )));
            }
            let resident = state.store().replace_all(envelope.data, provenance).await?;
            (resident, resident)
        }
        TransferType::Incremental => {
            let outcome = state
                .store()
                .merge_incremental(envelope.data.players, provenance)
                .await?;
            (outcome.received, outcome.total)
        }
    };

    let config = state.config();
    let persisted = artifacts::persist_received(&config.files_dir, envelope.files).await;
    let telemetry = persisted
        .saved
        .iter()
        .filter(|descriptor| descriptor.kind == ArtifactKind::Telemetry)
        .cloned()
        .collect::<Vec<_>>();

    let gate_report = if telemetry.is_empty() {
        GateReport::default()
    } else {
        let gate = state.gate();
        let files_dir = config.files_dir.clone();
        tokio::task::spawn_blocking(move || gate.process(&files_dir, &telemetry))
            .await
            .map_err(|err| ServiceError::Internal(format!("artifact gate worker failed: {err}")))?
    };

    if persisted.failed > 0 || gate_report.failed > 0 {
        warn!(
            transfer_id = %transfer_id,
            files_failed = persisted.failed,
            renders_failed = gate_report.failed,
            "batch applied with per-file failures"
        );
    }
    info!(
        transfer_id = %transfer_id,
        transfer_type = transfer_type.as_str(),
        received = received_count,
        total = total_count,
        files_saved = persisted.saved.len(),
        generated = gate_report.generated,
        "transfer received"
    );

    Ok(ReceiveResponse {
        status: "success".into(),
        message: format!(
            "received {received_count} players ({})",
            transfer_type.as_str()
        ),
        transfer_type,
        received_count,
        total_count,
        saved_files_count: persisted.saved.len(),
        failed_files_count: persisted.failed,
        visualizations_generated: gate_report.generated,
        visualizations_skipped: gate_report.skipped,
        visualizations_failed: gate_report.failed,
    })
}
