use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::{RecordSetEntity, StoreDocument};

/// Player fields submitted by the game client when a run ends.
///
/// Required fields are optional at the serde level so that a missing one is
/// reported as a validation failure naming the field.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct PlayerInput {
    /// Player label; `anonymous` when absent.
    #[serde(rename = "Player Name", default)]
    pub label: Option<String>,
    /// Money at the end of the run.
    #[serde(rename = "Player Money", default)]
    pub money: Option<i64>,
    /// Physical condition.
    #[serde(rename = "Player Body State", default)]
    pub body_state: Option<i64>,
    /// Red colour channel.
    #[serde(rename = "R", default)]
    #[validate(range(min = 0, max = 255))]
    pub r: Option<i64>,
    /// Green colour channel.
    #[serde(rename = "G", default)]
    #[validate(range(min = 0, max = 255))]
    pub g: Option<i64>,
    /// Blue colour channel.
    #[serde(rename = "B", default)]
    #[validate(range(min = 0, max = 255))]
    pub b: Option<i64>,
}

/// Acknowledgement returned once a record has been appended.
#[derive(Debug, Serialize, ToSchema)]
pub struct AppendResponse {
    /// Always `"success"`.
    pub status: String,
    /// Human readable summary.
    pub message: String,
    /// Number allocated to the record.
    pub player_number: u64,
}

/// Full view of a store: resident records, metadata and provenance.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotResponse {
    /// Records and metadata.
    pub received_data: RecordSetEntity,
    /// When the last batch was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    /// Sender of the last applied batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_server: Option<String>,
    /// Mode of the last applied batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<String>,
}

impl From<StoreDocument> for SnapshotResponse {
    fn from(document: StoreDocument) -> Self {
        Self {
            received_data: document.received_data,
            received_at: document.received_at,
            source_server: document.source_server,
            transfer_type: document.transfer_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_outside_byte_range_fails_validation() {
        let input = PlayerInput {
            r: Some(300),
            g: Some(0),
            b: Some(-1),
            ..PlayerInput::default()
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("r"));
        assert!(fields.contains_key("b"));
        assert!(!fields.contains_key("g"));
    }

    #[test]
    fn missing_colours_pass_range_validation() {
        assert!(PlayerInput::default().validate().is_ok());
    }
}
