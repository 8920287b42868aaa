//! # Temporal Types — Block Heights and UTC Timestamps
//!
//! Two notions of time exist in the registry and they are kept apart:
//!
//! - [`BlockHeight`] is the monotonic sequence number supplied by the
//!   ledger. It is what a record's `issued_at` holds and the only ordering
//!   the registry's semantics depend on.
//! - [`Timestamp`] is wall-clock UTC, truncated to seconds. It annotates
//!   journal entries for operators and has no semantic weight.
//!
//! Non-UTC timestamp inputs are **rejected at construction** — there is no
//! silent conversion that could make two renderings of one instant differ.

use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A ledger sequence number (e.g. block height).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// The next height. Saturates at `u64::MAX`, so a source started at the
    /// maximum would repeat it forever; callers refuse that start value.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Access the raw height.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(h: u64) -> Self {
        Self(h)
    }
}

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Serialized as `YYYY-MM-DDTHH:MM:SSZ`. Deserialization goes through
/// [`Timestamp::parse`], so offsets are rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted; explicit
    /// offsets, even `+00:00`, are rejected.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::Timestamp(format!(
                "must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ValidationError::Timestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_iso8601()
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_height_next_and_order() {
        let h = BlockHeight(1000);
        assert_eq!(h.next(), BlockHeight(1001));
        assert!(h < h.next());
        assert_eq!(BlockHeight(u64::MAX).next(), BlockHeight(u64::MAX));
    }

    #[test]
    fn test_block_height_serializes_as_number() {
        assert_eq!(serde_json::to_string(&BlockHeight(42)).unwrap(), "42");
        assert_eq!(BlockHeight(42).to_string(), "#42");
    }

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.0.nanosecond(), 0);
    }

    #[test]
    fn test_serde_uses_z_suffixed_string() {
        let ts = Timestamp::parse("2026-01-15T12:30:45Z").unwrap();
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            "\"2026-01-15T12:30:45Z\""
        );
        let back: Timestamp = serde_json::from_str("\"2026-01-15T12:30:45Z\"").unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_deserialize_rejects_offsets() {
        let offset = serde_json::from_str::<Timestamp>("\"2026-01-15T17:00:00.123+05:00\"");
        assert!(offset.is_err());
        let utc_offset = serde_json::from_str::<Timestamp>("\"2026-01-15T12:00:00+00:00\"");
        assert!(utc_offset.is_err());
    }

    #[test]
    fn test_deserialize_truncates_subseconds() {
        let ts: Timestamp = serde_json::from_str("\"2026-01-15T12:00:00.123Z\"").unwrap();
        assert_eq!(ts.0.nanosecond(), 0);
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_z_suffix_accepted() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.5Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn test_parse_offsets_rejected() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
    }
}
