use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Iso8601, macros::format_description};
use utoipa::ToSchema;

/// Human readable description written into freshly created documents.
pub const DEFAULT_DESCRIPTION: &str = "player record store";
/// Document schema version.
pub const DOCUMENT_VERSION: &str = "1.0";
/// Explains the meaning of the colour channels to readers of the raw file.
pub const COLOR_INFO: &str = "R, G and B are the player's colour channels, integers in 0..=255";

/// One player's persisted attribute set plus its sequence number.
///
/// Keys follow the document format the game client has always produced, so
/// existing data files and peers keep working.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PlayerEntity {
    /// `"<number>_@<label>"`.
    #[serde(rename = "Player Name")]
    pub name: String,
    /// Money at the end of the run.
    #[serde(rename = "Player Money")]
    pub money: i64,
    /// Age in years.
    #[serde(rename = "Player Age", default = "default_age")]
    pub age: u32,
    /// Physical condition.
    #[serde(rename = "Player Body State")]
    pub body_state: i64,
    /// Mental condition.
    #[serde(rename = "Player Mind State", default = "default_mind_state")]
    pub mind_state: i64,
    /// Intelligence score.
    #[serde(rename = "PlayerIQ", default = "default_trait")]
    pub iq: i64,
    /// Emotional intelligence score.
    #[serde(rename = "Player El", default = "default_trait")]
    pub ei: i64,
    /// Red colour channel.
    #[serde(rename = "R")]
    pub r: u8,
    /// Green colour channel.
    #[serde(rename = "G")]
    pub g: u8,
    /// Blue colour channel.
    #[serde(rename = "B")]
    pub b: u8,
    /// Free text note.
    #[serde(rename = "Additional Info", default)]
    pub additional_info: String,
    /// Sequence number, unique within a store lineage.
    #[serde(rename = "Number", default)]
    pub number: u64,
    /// ISO-8601 creation (or re-numbering) time.
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
}

fn default_age() -> u32 {
    18
}

fn default_mind_state() -> i64 {
    100
}

fn default_trait() -> i64 {
    120
}

/// Summary counters stored next to the records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct StoreMetadataEntity {
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Document schema version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Records ever allocated in this lineage (`totalCount`).
    #[serde(rename = "total_players", default)]
    pub total_count: u64,
    /// Records consumed through completed transfers (`currentCursor`).
    #[serde(rename = "current_number", default)]
    pub current_cursor: u64,
    /// Local time of the last change.
    #[serde(default)]
    pub last_updated: String,
    /// Explains the colour channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_info: Option<String>,
}

impl StoreMetadataEntity {
    /// Metadata of an empty store.
    pub fn empty(description: Option<String>) -> Self {
        Self {
            description: Some(description.unwrap_or_else(|| DEFAULT_DESCRIPTION.into())),
            version: Some(DOCUMENT_VERSION.into()),
            total_count: 0,
            current_cursor: 0,
            last_updated: now_stamp(),
            color_info: Some(COLOR_INFO.into()),
        }
    }

    /// Records allocated but not yet consumed.
    pub fn pending(&self) -> u64 {
        self.total_count.saturating_sub(self.current_cursor)
    }
}

/// Resident records together with their metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct RecordSetEntity {
    /// Resident records in arrival order.
    #[serde(default)]
    pub players: Vec<PlayerEntity>,
    /// Counters of the lineage.
    pub metadata: StoreMetadataEntity,
}

/// The single persisted document of a store role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct StoreDocument {
    /// Records and metadata.
    pub received_data: RecordSetEntity,
    /// When the last batch was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    /// Sender of the last applied batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_server: Option<String>,
    /// Mode of the last applied batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<String>,
}

impl StoreDocument {
    /// A valid, empty document.
    pub fn empty(description: Option<String>, source_server: Option<String>) -> Self {
        Self {
            received_data: RecordSetEntity {
                players: Vec::new(),
                metadata: StoreMetadataEntity::empty(description),
            },
            received_at: Some(now_stamp()),
            source_server,
            transfer_type: None,
        }
    }
}

/// Local wall-clock time formatted as `YYYY-MM-DD HH:MM:SS`.
pub fn now_stamp() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    now()
        .format(&format)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Local wall-clock time in ISO-8601.
pub fn now_iso() -> String {
    now()
        .format(&Iso8601::DEFAULT)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_document_layout() {
        let raw = r#"{
            "received_data": {
                "players": [{
                    "Player Name": "0_@zlj",
                    "Player Money": 12000000,
                    "Player Age": 18,
                    "Player Body State": 80,
                    "Player Mind State": 100,
                    "PlayerIQ": 120,
                    "Player El": 120,
                    "R": 10, "G": 20, "B": 30,
                    "Additional Info": "generated",
                    "Number": 0,
                    "Timestamp": "2025-01-01T10:00:00.000000"
                }],
                "metadata": {
                    "description": "store",
                    "version": "1.0",
                    "total_players": 1,
                    "current_number": 0,
                    "last_updated": "2025-01-01 10:00:00",
                    "color_info": "rgb"
                }
            },
            "received_at": "2025-01-01 10:00:00",
            "source_server": "http://localhost:10001/save_player_data"
        }"#;

        let document: StoreDocument = serde_json::from_str(raw).unwrap();
        let players = &document.received_data.players;
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "0_@zlj");
        assert_eq!(players[0].g, 20);
        assert_eq!(document.received_data.metadata.total_count, 1);
        assert!(document.transfer_type.is_none());
    }

    #[test]
    fn colour_channel_out_of_range_is_rejected() {
        let raw = r#"{"Player Name": "x", "Player Money": 1, "Player Body State": 1,
                      "R": 256, "G": 0, "B": 0}"#;
        assert!(serde_json::from_str::<PlayerEntity>(raw).is_err());
    }

    #[test]
    fn pending_never_underflows() {
        let mut metadata = StoreMetadataEntity::empty(None);
        metadata.total_count = 3;
        metadata.current_cursor = 5;
        assert_eq!(metadata.pending(), 0);
    }
}
