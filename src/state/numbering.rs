//! Sequence number allocation.
//!
//! Numbers come from the owning store's `total_count`, so allocation is only
//! race free while the caller holds that store's lock for both the allocation
//! and the append that consumes it.

use std::ops::Range;

use crate::dao::models::{PlayerEntity, StoreMetadataEntity};

/// Next number the store would hand out.
pub fn allocate(metadata: &StoreMetadataEntity) -> u64 {
    metadata.total_count
}

/// Numbers for a batch of `count` new records: `base..base + count`.
pub fn allocate_batch(metadata: &StoreMetadataEntity, count: usize) -> Range<u64> {
    let base = allocate(metadata);
    base..base + count as u64
}

/// First number used when merging records into a store that already holds
/// `existing`: one past the highest number present, or zero.
pub fn merge_base(existing: &[PlayerEntity]) -> u64 {
    existing
        .iter()
        .map(|player| player.number)
        .max()
        .map_or(0, |max| max + 1)
}

/// Embed the sequence number into the player name.
pub fn record_name(number: u64, label: &str) -> String {
    format!("{number}_@{label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(number: u64) -> PlayerEntity {
        PlayerEntity {
            name: record_name(number, "p"),
            money: 0,
            age: 18,
            body_state: 0,
            mind_state: 100,
            iq: 120,
            ei: 120,
            r: 0,
            g: 0,
            b: 0,
            additional_info: String::new(),
            number,
            timestamp: String::new(),
        }
    }

    #[test]
    fn batch_starts_at_total_count() {
        let mut metadata = StoreMetadataEntity::empty(None);
        metadata.total_count = 7;
        assert_eq!(allocate(&metadata), 7);
        assert_eq!(allocate_batch(&metadata, 3), 7..10);
        assert!(allocate_batch(&metadata, 0).is_empty());
    }

    #[test]
    fn merge_base_follows_highest_number_not_length() {
        assert_eq!(merge_base(&[]), 0);
        assert_eq!(merge_base(&[player(4), player(9), player(2)]), 10);
    }

    #[test]
    fn record_name_embeds_number() {
        assert_eq!(record_name(12, "zlj"), "12_@zlj");
    }
}
