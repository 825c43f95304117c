use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload field names used in error reports.
///
/// # Examples
/// ```
/// use sigtrack_core::Field;
///
/// assert_eq!(Field::UplinkCounter.to_string(), "uplink_counter");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Flags,
    Temperature,
    Gps,
    Latitude,
    Longitude,
    Quality,
    UplinkCounter,
    DownlinkCounter,
    BatteryLevel,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Flags => "flags",
            Field::Temperature => "temperature",
            Field::Gps => "gps",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::Quality => "quality",
            Field::UplinkCounter => "uplink_counter",
            Field::DownlinkCounter => "downlink_counter",
            Field::BatteryLevel => "battery_level",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a payload string is rejected before any field is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatViolation {
    #[error("payload is empty")]
    Empty,
    #[error("odd number of hex digits: {len}")]
    OddLength { len: usize },
    #[error("non-hex character {character:?} at position {position}")]
    NonHexDigit { position: usize, character: char },
}

/// Errors returned by payload decoding.
///
/// # Examples
/// ```
/// use sigtrack_core::{DecodeError, Field, decode};
///
/// let err = decode("9e").unwrap_err();
/// assert!(matches!(
///     err,
///     DecodeError::TruncatedPayload { field: Field::Temperature, .. }
/// ));
/// assert_eq!(err.kind(), "truncated_payload");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid payload format: {0}")]
    InvalidFormat(#[from] FormatViolation),
    #[error("payload truncated at {field}: need {needed} bytes, {available} available")]
    TruncatedPayload {
        field: Field,
        needed: usize,
        available: usize,
    },
    #[error("invalid encoding for {field}: {value:?}")]
    InvalidFieldEncoding { field: Field, value: String },
    #[error("reserved flag bit 0 is set (flags {flags:#04x})")]
    ReservedBitSet { flags: u8 },
}

impl DecodeError {
    /// Stable identifier for reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::InvalidFormat(_) => "invalid_format",
            DecodeError::TruncatedPayload { .. } => "truncated_payload",
            DecodeError::InvalidFieldEncoding { .. } => "invalid_field_encoding",
            DecodeError::ReservedBitSet { .. } => "reserved_bit_set",
        }
    }

    /// Field the decoder was reading when it failed, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            DecodeError::TruncatedPayload { field, .. }
            | DecodeError::InvalidFieldEncoding { field, .. } => Some(*field),
            DecodeError::InvalidFormat(_) | DecodeError::ReservedBitSet { .. } => None,
        }
    }
}
