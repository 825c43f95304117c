use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{DecodeError, Field};
use super::flags::{Flags, Source};
use super::gps::{Coordinate, read_gps};
use super::reader::{HexCursor, split_flags};
use crate::options::{BatteryField, DecodeOptions};

/// Decoded tracker payload.
///
/// Optional fields are `None` exactly when their flag bit is clear.
///
/// # Examples
/// ```
/// use sigtrack_core::{Source, decode};
///
/// let payload = decode("9e16411954000194897013130c0f")?;
/// assert_eq!(payload.source, Source::Periodic);
/// assert_eq!(payload.temperature, Some(22));
/// assert_eq!(payload.latitude.map(|c| c.to_string()).as_deref(), Some("41.3257"));
/// assert_eq!(payload.uplink_counter, Some(19));
/// assert_eq!(payload.battery_level, None);
/// # Ok::<(), sigtrack_core::DecodeError>(())
/// ```
///
/// Deserialization checks the record against its flags: `source` must be
/// the one the flags select, and no field may be present without its bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PayloadRecord")]
pub struct DecodedPayload {
    /// Raw flags byte.
    pub flags: Flags,
    pub source: Source,
    /// Raw temperature byte; no unit conversion or sign extension.
    pub temperature: Option<u8>,
    pub latitude: Option<Coordinate>,
    pub longitude: Option<Coordinate>,
    /// GPS fix quality byte.
    pub quality: Option<u8>,
    pub uplink_counter: Option<u8>,
    pub downlink_counter: Option<u8>,
    /// Raw battery byte, only read with [`BatteryField::Decode`].
    pub battery_level: Option<u8>,
}

/// Unchecked wire form of [`DecodedPayload`].
#[derive(Deserialize)]
struct PayloadRecord {
    flags: Flags,
    source: Source,
    temperature: Option<u8>,
    latitude: Option<Coordinate>,
    longitude: Option<Coordinate>,
    quality: Option<u8>,
    uplink_counter: Option<u8>,
    downlink_counter: Option<u8>,
    #[serde(default)]
    battery_level: Option<u8>,
}

impl TryFrom<PayloadRecord> for DecodedPayload {
    type Error = String;

    fn try_from(record: PayloadRecord) -> Result<Self, Self::Error> {
        let flags = record.flags;
        if record.source != flags.source() {
            return Err(format!(
                "source {} contradicts flags {} (expected {})",
                record.source,
                flags,
                flags.source()
            ));
        }
        let fields = [
            (Field::Temperature, record.temperature.is_some(), flags.temperature()),
            (Field::Latitude, record.latitude.is_some(), flags.gps()),
            (Field::Longitude, record.longitude.is_some(), flags.gps()),
            (Field::Quality, record.quality.is_some(), flags.gps()),
            (Field::UplinkCounter, record.uplink_counter.is_some(), flags.counters()),
            (Field::DownlinkCounter, record.downlink_counter.is_some(), flags.counters()),
            (Field::BatteryLevel, record.battery_level.is_some(), flags.battery()),
        ];
        if let Some((field, _, _)) = fields
            .iter()
            .find(|(_, present, announced)| *present && !*announced)
        {
            return Err(format!("{field} is present but flags {flags} do not announce it"));
        }
        Ok(DecodedPayload {
            flags,
            source: record.source,
            temperature: record.temperature,
            latitude: record.latitude,
            longitude: record.longitude,
            quality: record.quality,
            uplink_counter: record.uplink_counter,
            downlink_counter: record.downlink_counter,
            battery_level: record.battery_level,
        })
    }
}

/// Decode a hex payload with default options.
pub fn decode(payload: &str) -> Result<DecodedPayload, DecodeError> {
    decode_with(payload, &DecodeOptions::default())
}

/// Decode a hex payload.
///
/// Fields are read left to right in flag order: temperature, GPS block,
/// uplink and downlink counters, then (optionally) battery level. Bytes left
/// over after the last field are ignored.
pub fn decode_with(payload: &str, options: &DecodeOptions) -> Result<DecodedPayload, DecodeError> {
    let (bits, data) = split_flags(payload)?;
    let flags = Flags::new(bits);
    if options.strict && flags.reserved() {
        return Err(DecodeError::ReservedBitSet { flags: bits });
    }

    let mut cursor = HexCursor::new(data);

    let temperature = if flags.temperature() {
        Some(cursor.read_u8(Field::Temperature)?)
    } else {
        None
    };

    let gps = if flags.gps() {
        Some(read_gps(&mut cursor)?)
    } else {
        None
    };

    let (uplink_counter, downlink_counter) = if flags.counters() {
        let uplink = cursor.read_u8(Field::UplinkCounter)?;
        let downlink = cursor.read_u8(Field::DownlinkCounter)?;
        (Some(uplink), Some(downlink))
    } else {
        (None, None)
    };

    let battery_level = match options.battery {
        BatteryField::Decode if flags.battery() => Some(cursor.read_u8(Field::BatteryLevel)?),
        _ => None,
    };

    if cursor.remaining() > 0 {
        debug!(
            %flags,
            consumed = cursor.position(),
            trailing = cursor.remaining(),
            "ignoring trailing bytes"
        );
    }
    debug!(%flags, consumed = cursor.position(), "decoded payload");

    Ok(DecodedPayload {
        flags,
        source: flags.source(),
        temperature,
        latitude: gps.map(|fix| fix.latitude),
        longitude: gps.map(|fix| fix.longitude),
        quality: gps.map(|fix| fix.quality),
        uplink_counter,
        downlink_counter,
        battery_level,
    })
}
