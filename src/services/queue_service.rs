//! Queue position and wait estimate derived from the store counters.

use crate::{
    dao::models::StoreMetadataEntity, dto::queue::QueueStatusResponse, error::ServiceError,
    state::SharedState,
};

/// Pure estimate from a metadata snapshot.
pub fn estimate(metadata: &StoreMetadataEntity, minutes_per_player: u64) -> QueueStatusResponse {
    let queue_count = metadata.pending();
    let wait_minutes = queue_count.saturating_mul(minutes_per_player);

    QueueStatusResponse {
        status: "success".into(),
        queue_count,
        wait_minutes,
        wait_time_text: format_wait(wait_minutes),
        current_number: metadata.current_cursor,
        total_players: metadata.total_count,
    }
}

/// Human readable wait: minutes up to an hour, then hours and minutes.
pub fn format_wait(minutes: u64) -> String {
    if minutes == 0 {
        return "no wait".into();
    }
    if minutes <= 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    let rest = minutes % 60;
    if rest == 0 {
        plural(hours, "hour")
    } else {
        format!("{} {}", plural(hours, "hour"), plural(rest, "minute"))
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Read a consistent snapshot and estimate the queue from it.
pub async fn queue_status(state: &SharedState) -> Result<QueueStatusResponse, ServiceError> {
    let document = state.store().snapshot().await?;
    Ok(estimate(
        &document.received_data.metadata,
        state.config().minutes_per_player,
    ))
}
