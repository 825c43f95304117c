//! Decoder configuration.
//!
//! The defaults reproduce the reference field layout exactly: the reserved
//! bit is tolerated and the battery-level bit never consumes data.

use serde::{Deserialize, Serialize};

/// How the battery-level bit (bit 1) is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryField {
    /// Bit 1 is reported through `Flags` only; no byte is consumed.
    #[default]
    Ignore,
    /// Bit 1 consumes one raw byte after the frame counters.
    Decode,
}

/// Options accepted by [`crate::decode_with`].
///
/// # Examples
/// ```
/// use sigtrack_core::{BatteryField, DecodeOptions};
///
/// let options = DecodeOptions::default()
///     .with_strict(true)
///     .with_battery(BatteryField::Decode);
/// assert!(options.strict);
///
/// let parsed: DecodeOptions = serde_json::from_str(r#"{"battery":"decode"}"#)?;
/// assert!(!parsed.strict);
/// assert_eq!(parsed.battery, BatteryField::Decode);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Reject payloads whose reserved bit 0 is set.
    pub strict: bool,
    pub battery: BatteryField,
}

impl DecodeOptions {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_battery(mut self, battery: BatteryField) -> Self {
        self.battery = battery;
        self
    }
}
