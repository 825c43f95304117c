pub const HEX_DIGITS_PER_BYTE: usize = 2;
pub const FLAGS_LEN: usize = 1;

pub const TEMPERATURE_BIT: u8 = 1 << 7;
pub const ACCELEROMETER_BIT: u8 = 1 << 6;
pub const BUTTON_BIT: u8 = 1 << 5;
pub const GPS_BIT: u8 = 1 << 4;
pub const COUNTERS_BIT: u8 = 1 << 3;
pub const DOWNLINK_BIT: u8 = 1 << 2;
pub const BATTERY_BIT: u8 = 1 << 1;
pub const RESERVED_BIT: u8 = 1 << 0;

pub const BYTE_FIELD_LEN: usize = 1;
pub const GPS_LEN: usize = 9;

// GPS block offsets are in hex digits, relative to the start of the block.
pub const LATITUDE_DEGREES_RANGE: std::ops::Range<usize> = 0..2;
pub const LATITUDE_MINUTES_RANGE: std::ops::Range<usize> = 2..4;
pub const LATITUDE_FRACTION_RANGE: std::ops::Range<usize> = 4..7;
pub const HEMISPHERE_RANGE: std::ops::Range<usize> = 7..8;

pub const LONGITUDE_DEGREES_RANGE: std::ops::Range<usize> = 8..11;
pub const LONGITUDE_MINUTES_RANGE: std::ops::Range<usize> = 11..13;
pub const LONGITUDE_FRACTION_RANGE: std::ops::Range<usize> = 13..15;

pub const QUALITY_RANGE: std::ops::Range<usize> = 16..18;

pub const MINUTES_PER_DEGREE: f64 = 60.0;
pub const COORDINATE_DECIMALS: usize = 4;
