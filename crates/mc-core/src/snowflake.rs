// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Snowflake identifiers.
//!
//! 64-bit time-ordered ids: `(millis_since_epoch << 22) | (rand & 0x3FFFFF)`.
//! Zero is the reserved null value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Custom epoch, ms since Unix epoch (2015-01-01T00:00:00Z).
pub const SNOWFLAKE_EPOCH: u64 = 1_420_070_400_000;

/// Mask for the random tail (22 bits).
pub const SNOWFLAKE_RAND_MASK: u64 = 0x3FFFFF;

/// A 64-bit time-ordered identifier.
///
/// Serializes as a decimal string in text contexts (JSON) and as a plain
/// integer in binary/DB contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(pub u64);

impl Snowflake {
    /// The reserved null value.
    pub const NULL: Snowflake = Snowflake(0);

    /// Build a snowflake from a millisecond timestamp and a random tail.
    ///
    /// The timestamp is relative to [`SNOWFLAKE_EPOCH`]; `rand` is masked to
    /// its low 22 bits.
    pub fn new_with(millis_since_epoch: u64, rand: u32) -> Self {
        let t = millis_since_epoch.saturating_sub(0);
        Snowflake((t << 22) | (rand as u64 & SNOWFLAKE_RAND_MASK))
    }

    /// Build a snowflake from a `chrono` timestamp and a random tail, where
    /// the timestamp is absolute (not relative to the epoch).
    pub fn new_from_time(unix_millis: i64, rand: u32) -> Self {
        let relative = (unix_millis as u64).saturating_sub(SNOWFLAKE_EPOCH);
        Self::new_with(relative, rand)
    }

    /// Generate a new snowflake for the current instant using a random tail.
    pub fn generate() -> Self {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let rand: u32 = rand::random();
        Self::new_from_time(now_ms, rand)
    }

    /// Milliseconds since [`SNOWFLAKE_EPOCH`] encoded in this id.
    pub fn timestamp_relative(self) -> u64 {
        self.0 >> 22
    }

    /// Absolute Unix milliseconds this id was minted at.
    pub fn timestamp_unix_millis(self) -> u64 {
        self.timestamp_relative() + SNOWFLAKE_EPOCH
    }

    /// The random tail (low 22 bits).
    pub fn rand(self) -> u32 {
        (self.0 & SNOWFLAKE_RAND_MASK) as u32
    }

    /// Whether this is the reserved null value.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string does not parse as a snowflake.
#[derive(Debug, thiserror::Error)]
#[error("invalid snowflake: {0}")]
pub struct ParseSnowflakeError(String);

impl FromStr for Snowflake {
    type Err = ParseSnowflakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Snowflake)
            .map_err(|_| ParseSnowflakeError(s.to_string()))
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u64>()
            .map(Snowflake)
            .map_err(|_| serde::de::Error::custom("invalid snowflake"))
    }
}

impl From<u64> for Snowflake {
    fn from(v: u64) -> Self {
        Snowflake(v)
    }
}

impl From<Snowflake> for u64 {
    fn from(v: Snowflake) -> Self {
        v.0
    }
}

/// Reinterpret the snowflake's bit pattern as an `i64` for storage in
/// columns that only support signed 64-bit integers (Postgres `BIGINT`).
impl From<Snowflake> for i64 {
    fn from(v: Snowflake) -> Self {
        v.0 as i64
    }
}

impl From<i64> for Snowflake {
    fn from(v: i64) -> Self {
        Snowflake(v as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_timestamp_and_rand() {
        let t = 123_456_789u64;
        let r = 0x1ABCDEu32;
        let sf = Snowflake::new_with(t, r);
        assert_eq!(sf.timestamp_relative(), t);
        assert_eq!(sf.rand(), r & 0x3FFFFF);
    }

    #[test]
    fn rand_is_masked_to_22_bits() {
        let sf = Snowflake::new_with(0, 0xFFFF_FFFF);
        assert_eq!(sf.rand(), 0x3FFFFF);
    }

    #[test]
    fn null_is_zero() {
        assert!(Snowflake::NULL.is_null());
        assert!(!Snowflake::new_with(1, 0).is_null());
    }

    #[test]
    fn display_and_parse_round_trip() {
        let sf = Snowflake::new_with(42, 7);
        let s = sf.to_string();
        let parsed: Snowflake = s.parse().unwrap();
        assert_eq!(sf, parsed);
    }

    #[test]
    fn json_serializes_as_string() {
        let sf = Snowflake::new_with(42, 7);
        let json = serde_json::to_string(&sf).unwrap();
        assert!(json.starts_with('"') && json.ends_with('"'));
        let back: Snowflake = serde_json::from_str(&json).unwrap();
        assert_eq!(sf, back);
    }

    #[test]
    fn ordering_is_time_ordered() {
        let a = Snowflake::new_with(100, 0xFFFFF);
        let b = Snowflake::new_with(101, 0);
        assert!(a < b);
    }
}
