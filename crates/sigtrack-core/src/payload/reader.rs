use tracing::trace;

use super::error::{DecodeError, Field, FormatViolation};
use super::layout;

/// Validate a hex payload and split it into the flags byte and the data after it.
///
/// The returned data is guaranteed to be ASCII hex digits of even length.
pub fn split_flags(payload: &str) -> Result<(u8, &str), DecodeError> {
    if payload.is_empty() {
        return Err(FormatViolation::Empty.into());
    }
    if let Some((position, character)) = payload
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(FormatViolation::NonHexDigit {
            position,
            character,
        }
        .into());
    }
    if payload.len() % layout::HEX_DIGITS_PER_BYTE != 0 {
        return Err(FormatViolation::OddLength { len: payload.len() }.into());
    }

    let (flags, data) = payload.split_at(layout::FLAGS_LEN * layout::HEX_DIGITS_PER_BYTE);
    let flags = parse_hex_u8(flags, Field::Flags)?;
    Ok((flags, data))
}

/// Left-to-right reader over validated hex data.
///
/// Positions are counted in bytes (two hex digits each) from the first byte
/// after the flags byte.
pub struct HexCursor<'a> {
    data: &'a str,
    offset: usize,
}

impl<'a> HexCursor<'a> {
    pub fn new(data: &'a str) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() / layout::HEX_DIGITS_PER_BYTE - self.offset
    }

    /// Take the next `len` bytes as hex digits and advance past them.
    pub fn take(&mut self, field: Field, len: usize) -> Result<&'a str, DecodeError> {
        let available = self.remaining();
        if available < len {
            return Err(DecodeError::TruncatedPayload {
                field,
                needed: len,
                available,
            });
        }
        let start = self.offset * layout::HEX_DIGITS_PER_BYTE;
        let end = start + len * layout::HEX_DIGITS_PER_BYTE;
        let digits = self.data.get(start..end).ok_or(DecodeError::TruncatedPayload {
            field,
            needed: len,
            available,
        })?;
        trace!(%field, offset = self.offset, len, digits, "read field");
        self.offset += len;
        Ok(digits)
    }

    pub fn read_u8(&mut self, field: Field) -> Result<u8, DecodeError> {
        let digits = self.take(field, layout::BYTE_FIELD_LEN)?;
        parse_hex_u8(digits, field)
    }
}

pub fn parse_hex_u8(digits: &str, field: Field) -> Result<u8, DecodeError> {
    u8::from_str_radix(digits, 16).map_err(|_| DecodeError::InvalidFieldEncoding {
        field,
        value: digits.to_string(),
    })
}

/// Parse a run of decimal digits. Signs and whitespace are rejected.
pub fn parse_decimal_u32(digits: &str, field: Field) -> Result<u32, DecodeError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidFieldEncoding {
            field,
            value: digits.to_string(),
        });
    }
    digits.parse().map_err(|_| DecodeError::InvalidFieldEncoding {
        field,
        value: digits.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{HexCursor, parse_decimal_u32, split_flags};
    use crate::payload::error::{DecodeError, Field, FormatViolation};

    #[test]
    fn split_flags_accepts_mixed_case() {
        let (flags, data) = split_flags("9E16aB").unwrap();
        assert_eq!(flags, 0x9e);
        assert_eq!(data, "16aB");
    }

    #[test]
    fn split_flags_rejects_empty() {
        let err = split_flags("").unwrap_err();
        assert_eq!(err, DecodeError::InvalidFormat(FormatViolation::Empty));
    }

    #[test]
    fn split_flags_reports_first_bad_character() {
        let err = split_flags("9eg1").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidFormat(FormatViolation::NonHexDigit {
                position: 2,
                character: 'g',
            })
        );
    }

    #[test]
    fn split_flags_rejects_non_ascii() {
        let err = split_flags("9é").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidFormat(FormatViolation::NonHexDigit { position: 1, .. })
        ));
    }

    #[test]
    fn split_flags_rejects_odd_length() {
        let err = split_flags("9e1").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidFormat(FormatViolation::OddLength { len: 3 })
        );
    }

    #[test]
    fn cursor_advances_by_field_width() {
        let mut cursor = HexCursor::new("0102030405");
        assert_eq!(cursor.remaining(), 5);
        assert_eq!(cursor.read_u8(Field::Temperature).unwrap(), 1);
        assert_eq!(cursor.take(Field::Gps, 3).unwrap(), "020304");
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.read_u8(Field::UplinkCounter).unwrap(), 5);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn cursor_does_not_advance_on_truncation() {
        let mut cursor = HexCursor::new("0102");
        let err = cursor.take(Field::Gps, 9).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedPayload {
                field: Field::Gps,
                needed: 9,
                available: 2,
            }
        );
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn decimal_rejects_hex_letters_and_signs() {
        assert_eq!(parse_decimal_u32("041", Field::Latitude).unwrap(), 41);
        assert!(parse_decimal_u32("4a", Field::Latitude).is_err());
        assert!(parse_decimal_u32("+4", Field::Latitude).is_err());
        assert!(parse_decimal_u32("", Field::Latitude).is_err());
    }
}
