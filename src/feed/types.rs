//! Core data types for the wave feed
//!
//! - `RawWave`: a remote tuple exactly as fetched, every field optional
//! - `WaveRecord`: the immutable, fully-populated record the feed displays
//! - `RecordKey`: content identity used to drop duplicate deliveries

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A wave tuple as delivered by the contract or an event log
///
/// Any field may be missing; conversion into [`WaveRecord`] is total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWave {
    #[serde(default)]
    pub sender: Option<Address>,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RawWave {
    pub fn new(sender: Address, timestamp: u64, message: impl Into<String>) -> Self {
        Self {
            sender: Some(sender),
            timestamp: Some(timestamp),
            message: Some(message.into()),
        }
    }
}

/// One wave: who sent it, when, and what it said
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRecord {
    pub sender: Address,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl WaveRecord {
    /// Build a record from a Unix timestamp in seconds
    pub fn new(sender: Address, timestamp_secs: u64, message: impl Into<String>) -> Self {
        RawWave::new(sender, timestamp_secs, message).into()
    }

    /// Identity used for de-duplication
    pub fn key(&self) -> RecordKey {
        RecordKey {
            sender: self.sender,
            timestamp: self.timestamp.timestamp(),
            message: self.message.clone(),
        }
    }

    /// True when the sender was absent from the remote tuple
    pub fn has_unknown_sender(&self) -> bool {
        self.sender == Address::ZERO
    }
}

impl From<RawWave> for WaveRecord {
    fn from(raw: RawWave) -> Self {
        // Timestamps past chrono's range fall back to the epoch like missing ones.
        let timestamp = raw
            .timestamp
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            sender: raw.sender.unwrap_or(Address::ZERO),
            timestamp,
            message: raw.message.unwrap_or_default(),
        }
    }
}

/// Content identity of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub sender: Address,
    pub timestamp: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_tuple_maps_fields() {
        let sender = Address::repeat_byte(0xaa);
        let record: WaveRecord = RawWave::new(sender, 100, "hi").into();

        assert_eq!(record.sender, sender);
        assert_eq!(record.timestamp.timestamp(), 100);
        assert_eq!(record.message, "hi");
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        let record: WaveRecord = RawWave::default().into();

        assert!(record.has_unknown_sender());
        assert_eq!(record.timestamp, DateTime::UNIX_EPOCH);
        assert!(record.message.is_empty());
    }

    #[test]
    fn test_out_of_range_timestamp_uses_epoch() {
        let raw = RawWave {
            sender: None,
            timestamp: Some(u64::MAX),
            message: Some("late".to_string()),
        };
        let record: WaveRecord = raw.into();
        assert_eq!(record.timestamp, DateTime::UNIX_EPOCH);
        assert_eq!(record.message, "late");
    }

    #[test]
    fn test_partial_json_tuple() {
        let raw: RawWave = serde_json::from_str(r#"{"message":"only text"}"#).unwrap();
        assert_eq!(raw.sender, None);
        assert_eq!(raw.timestamp, None);

        let record = WaveRecord::from(raw);
        assert_eq!(record.message, "only text");
    }

    #[test]
    fn test_key_covers_message() {
        let sender = Address::repeat_byte(0x01);
        let a = WaveRecord::new(sender, 10, "a");
        let b = WaveRecord::new(sender, 10, "b");
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), a.clone().key());
    }
}
