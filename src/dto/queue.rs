use serde::Serialize;
use utoipa::ToSchema;

/// Queue position and wait estimate derived from the local store counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QueueStatusResponse {
    /// Always `"success"`.
    pub status: String,
    /// Players allocated but not yet consumed.
    pub queue_count: u64,
    /// Estimated wait in minutes.
    pub wait_minutes: u64,
    /// Wait rendered as text.
    pub wait_time_text: String,
    /// Consumption cursor of the store.
    pub current_number: u64,
    /// Players ever allocated.
    pub total_players: u64,
}
