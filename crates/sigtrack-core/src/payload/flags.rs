use std::fmt;

use serde::{Deserialize, Serialize};

use super::layout;

/// Leading flags byte of a tracker payload.
///
/// # Examples
/// ```
/// use sigtrack_core::{Flags, Source};
///
/// let flags = Flags::new(0x9e);
/// assert!(flags.temperature());
/// assert!(flags.gps());
/// assert!(flags.counters());
/// assert_eq!(flags.source(), Source::Periodic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(u8);

impl Flags {
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn temperature(self) -> bool {
        self.0 & layout::TEMPERATURE_BIT != 0
    }

    pub const fn accelerometer(self) -> bool {
        self.0 & layout::ACCELEROMETER_BIT != 0
    }

    pub const fn button(self) -> bool {
        self.0 & layout::BUTTON_BIT != 0
    }

    pub const fn gps(self) -> bool {
        self.0 & layout::GPS_BIT != 0
    }

    pub const fn counters(self) -> bool {
        self.0 & layout::COUNTERS_BIT != 0
    }

    /// Legacy downlink presence bit. Never drives decoding.
    pub const fn downlink(self) -> bool {
        self.0 & layout::DOWNLINK_BIT != 0
    }

    pub const fn battery(self) -> bool {
        self.0 & layout::BATTERY_BIT != 0
    }

    pub const fn reserved(self) -> bool {
        self.0 & layout::RESERVED_BIT != 0
    }

    /// Transmission trigger. The accelerometer bit takes priority over the button bit.
    pub const fn source(self) -> Source {
        if self.accelerometer() {
            Source::Accelerometer
        } else if self.button() {
            Source::Button
        } else {
            Source::Periodic
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}

/// What caused the tracker to transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Accelerometer,
    Button,
    Periodic,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Accelerometer => "Accelerometer",
            Source::Button => "Button",
            Source::Periodic => "Periodic",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Flags, Source};

    #[test]
    fn source_defaults_to_periodic() {
        assert_eq!(Flags::new(0x00).source(), Source::Periodic);
        assert_eq!(Flags::new(0x9e).source(), Source::Periodic);
    }

    #[test]
    fn accelerometer_wins_over_button() {
        assert_eq!(Flags::new(0b0110_0000).source(), Source::Accelerometer);
        assert_eq!(Flags::new(0b0100_0000).source(), Source::Accelerometer);
        assert_eq!(Flags::new(0b0010_0000).source(), Source::Button);
    }

    #[test]
    fn bit_accessors_match_positions() {
        let flags = Flags::new(0b0000_0111);
        assert!(flags.downlink());
        assert!(flags.battery());
        assert!(flags.reserved());
        assert!(!flags.temperature());
        assert!(!flags.gps());
        assert!(!flags.counters());
    }

    #[test]
    fn display_is_binary() {
        assert_eq!(Flags::new(0x9e).to_string(), "0b10011110");
    }
}
