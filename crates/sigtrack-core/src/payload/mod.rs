//! Tracker payload decoding.
//!
//! A payload is a hex string: one flags byte followed by the optional fields
//! the flags announce, in fixed order (temperature, GPS block, frame
//! counters). No field carries a length prefix, so the flags byte alone
//! determines how far the cursor moves.
//!
//! Layout follows the same split as the other decoders in this workspace:
//! - `layout`: bit masks, widths and GPS digit ranges
//! - `reader`: input validation and the byte cursor
//! - `gps`: degrees/minutes decoding of the GPS block
//! - `parser`: field sequencing and the output record
//! - `error`: explicit, field-named errors

pub mod error;
pub mod flags;
pub mod gps;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{DecodedPayload, decode, decode_with};
