use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{DecodeError, Field};
use super::layout;
use super::reader::{HexCursor, parse_decimal_u32, parse_hex_u8};

/// Signed decimal degrees, kept at four fractional digits.
///
/// Serialized as the formatted string (e.g. `"41.3257"`), so reports carry
/// exactly the digits the decoder produced.
///
/// # Examples
/// ```
/// use sigtrack_core::Coordinate;
///
/// let coordinate: Coordinate = "-12.50004".parse().unwrap();
/// assert_eq!(coordinate.to_string(), "-12.5000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Coordinate(f64);

impl Coordinate {
    /// Round `degrees` to the wire precision.
    pub fn from_degrees(degrees: f64) -> Self {
        let formatted = format!("{:.*}", layout::COORDINATE_DECIMALS, degrees);
        Self(formatted.parse().unwrap_or(degrees))
    }

    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", layout::COORDINATE_DECIMALS, self.0)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self::from_degrees)
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Coordinate {
    type Error = std::num::ParseFloatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Decoded GPS block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub quality: u8,
}

/// Read the 9-byte GPS block at the cursor.
///
/// Latitude is `DDMMmmmH` and longitude `DDDMMmmX` in decimal digits. The
/// low bit of `H` selects the sign of both coordinates; `X` is not read.
pub fn read_gps(cursor: &mut HexCursor<'_>) -> Result<GpsFix, DecodeError> {
    let block = cursor.take(Field::Gps, layout::GPS_LEN)?;

    let hemisphere = parse_decimal_u32(&block[layout::HEMISPHERE_RANGE], Field::Latitude)?;
    let sign = if hemisphere & 1 == 0 { 1.0 } else { -1.0 };

    let latitude = read_coordinate(
        block,
        layout::LATITUDE_DEGREES_RANGE,
        layout::LATITUDE_MINUTES_RANGE,
        layout::LATITUDE_FRACTION_RANGE,
        sign,
        Field::Latitude,
    )?;
    let longitude = read_coordinate(
        block,
        layout::LONGITUDE_DEGREES_RANGE,
        layout::LONGITUDE_MINUTES_RANGE,
        layout::LONGITUDE_FRACTION_RANGE,
        sign,
        Field::Longitude,
    )?;
    let quality = parse_hex_u8(&block[layout::QUALITY_RANGE], Field::Quality)?;

    Ok(GpsFix {
        latitude,
        longitude,
        quality,
    })
}

fn read_coordinate(
    block: &str,
    degrees: std::ops::Range<usize>,
    minutes: std::ops::Range<usize>,
    fraction: std::ops::Range<usize>,
    sign: f64,
    field: Field,
) -> Result<Coordinate, DecodeError> {
    let degrees = parse_decimal_u32(&block[degrees], field)?;
    let minutes = decimal_minutes(&block[minutes], &block[fraction], field)?;
    let value = sign * (f64::from(degrees) + minutes / layout::MINUTES_PER_DEGREE);
    Ok(Coordinate::from_degrees(value))
}

/// Parse `MM` and `mmm` as the decimal number `MM.mmm`.
fn decimal_minutes(whole: &str, fraction: &str, field: Field) -> Result<f64, DecodeError> {
    parse_decimal_u32(whole, field)?;
    parse_decimal_u32(fraction, field)?;
    let text = format!("{whole}.{fraction}");
    text.parse()
        .map_err(|_| DecodeError::InvalidFieldEncoding { field, value: text })
}
