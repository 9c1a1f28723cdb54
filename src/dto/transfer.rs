use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, hex::Hex, serde_as};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{PlayerEntity, RecordSetEntity, StoreMetadataEntity};

/// How the receiving store applies a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    /// Replace the receiver's records and metadata verbatim.
    FullCopy,
    /// Re-number the batch and append it. Unknown values fall back here.
    #[default]
    #[serde(other)]
    Incremental,
}

impl TransferType {
    /// Wire name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            TransferType::FullCopy => "full_copy",
            TransferType::Incremental => "incremental",
        }
    }
}

/// Binary artifact carried inside a transfer, hex encoded on the wire.
///
/// Decoding is lenient per file: a malformed entry never rejects the
/// envelope, it arrives with an empty name or `None` content and is counted
/// as failed when persisted.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArtifactPayload {
    /// Bare file name, without any directory part.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub filename: String,
    /// File bytes; `None` when the field is missing or not valid hex.
    #[serde_as(as = "DefaultOnError<Option<Hex>>")]
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub content: Option<Vec<u8>>,
}

/// A single transfer request sent from the producing role to the remote role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferEnvelope {
    /// Correlates log lines of both sides; not used for de-duplication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<Uuid>,
    /// Must be `"success"` for the receiver to accept the batch.
    #[serde(default)]
    pub status: String,
    /// How the receiver applies `data`.
    #[serde(default)]
    pub transfer_type: TransferType,
    /// Records and metadata collected by the sender.
    pub data: RecordSetEntity,
    /// Sender's resident record count at collection time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_players: Option<usize>,
    /// Staged artifact files travelling with the batch.
    #[serde(default)]
    pub files: Vec<ArtifactPayload>,
    /// Sender identity recorded as the receiver's `source_server`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Outcome reported by the receiving role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReceiveResponse {
    /// `"success"` or `"error"`.
    pub status: String,
    /// Human readable summary.
    #[serde(default)]
    pub message: String,
    /// Mode the batch was applied with.
    #[serde(default)]
    pub transfer_type: TransferType,
    /// Records taken from the batch.
    #[serde(default)]
    pub received_count: usize,
    /// Records resident on the receiver afterwards.
    #[serde(default)]
    pub total_count: usize,
    /// Artifacts written to disk.
    #[serde(default)]
    pub saved_files_count: usize,
    /// Artifacts rejected or not written.
    #[serde(default)]
    pub failed_files_count: usize,
    /// Artifacts charts were rendered for.
    #[serde(default)]
    pub visualizations_generated: usize,
    /// Artifacts skipped by the generation gate.
    #[serde(default)]
    pub visualizations_skipped: usize,
    /// Artifacts whose rendering failed.
    #[serde(default)]
    pub visualizations_failed: usize,
}

impl ReceiveResponse {
    /// True when the remote side accepted the batch.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Body of the local transfer trigger. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Mode requested from the receiver.
    #[serde(default)]
    pub transfer_type: TransferType,
    /// Number of drained records to hand back to the caller (game engine sampling).
    #[serde(default, alias = "CanGenerateAgantNum")]
    pub requested_samples: Option<u64>,
}

/// Result of a transfer trigger on the producing role.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResponse {
    /// `"success"` once the batch was delivered or there was nothing to send.
    pub status: String,
    /// Human readable summary.
    pub message: String,
    /// Mode the batch was sent with.
    pub transfer_type: TransferType,
    /// Id logged on both sides; absent when nothing was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<Uuid>,
    /// Resident records at collection time.
    pub total_players: usize,
    /// Staged files included in the envelope.
    pub files_count: usize,
    /// Whether an envelope was actually delivered.
    pub cloud_transfer_executed: bool,
    /// Records removed from the local store.
    pub drained_count: usize,
    /// Staged files deleted after delivery.
    pub files_deleted: usize,
    /// Local metadata after cleanup.
    pub metadata: StoreMetadataEntity,
    /// Receiver's answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<ReceiveResponse>,
    /// Drained records handed back for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<PlayerEntity>>,
    /// Sample count asked for by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_samples: Option<u64>,
    /// Sample count returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_samples: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_transfer_type_falls_back_to_incremental() {
        let parsed: TransferType = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(parsed, TransferType::Incremental);
        let parsed: TransferType = serde_json::from_str("\"full_copy\"").unwrap();
        assert_eq!(parsed, TransferType::FullCopy);
    }

    #[test]
    fn artifact_content_is_hex_on_the_wire() {
        let payload = ArtifactPayload {
            filename: "3_@zoe.csv".into(),
            content: Some(b"ok".to_vec()),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["content"], "6f6b");
    }

    #[test]
    fn malformed_artifact_does_not_reject_envelope() {
        let envelope: TransferEnvelope = serde_json::from_str(
            r#"{
                "status": "success",
                "data": {"players": [], "metadata": {}},
                "files": [
                    {"filename": "1_@ok.csv", "content": "6f6b"},
                    {"filename": "2_@bad.csv", "content": "zz-not-hex"},
                    {"filename": "3_@none.csv"},
                    {"filename": 7, "content": "00"}
                ]
            }"#,
        )
        .unwrap();

        let files = envelope.files;
        assert_eq!(files.len(), 4);
        assert_eq!(files[0].content.as_deref(), Some(&b"ok"[..]));
        assert_eq!(files[1].filename, "2_@bad.csv");
        assert_eq!(files[1].content, None);
        assert_eq!(files[2].content, None);
        assert_eq!(files[3].filename, "");
        assert_eq!(files[3].content.as_deref(), Some(&[0u8][..]));
    }

    #[test]
    fn legacy_sampling_key_is_accepted() {
        let request: TransferRequest =
            serde_json::from_str(r#"{"CanGenerateAgantNum": 4}"#).unwrap();
        assert_eq!(request.requested_samples, Some(4));
        assert_eq!(request.transfer_type, TransferType::Incremental);
    }
}
