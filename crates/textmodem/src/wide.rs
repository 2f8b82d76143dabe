//! UTF-16 and UTF-32 codecs, little- and big-endian.
//!
//! Each decoder is a lazy iterator over code units (pairing surrogates for
//! UTF-16, range-checking scalars for UTF-32) fused by one single-pass
//! writer that applies the error policy per malformed code unit: one error
//! per unpaired surrogate or out-of-range unit, and one for a truncated
//! trailing unit. Encoders are the inverses and never fail, since
//! [`Text`] is well-formed by construction.
//!
//! Byte-order marks get no special treatment: a BOM decodes to U+FEFF like
//! any other code point.

use alloc::{string::String, vec::Vec};

use crate::{
    error::DecodeError,
    policy::{self, Disposition, ErrorPolicy, Strict},
    text::Text,
};

/// Reason string for malformed UTF-16LE input.
pub const INVALID_UTF16LE: &str = "Invalid UTF-16LE stream";
/// Reason string for malformed UTF-16BE input.
pub const INVALID_UTF16BE: &str = "Invalid UTF-16BE stream";
/// Reason string for malformed UTF-32LE input.
pub const INVALID_UTF32LE: &str = "Invalid UTF-32LE stream";
/// Reason string for malformed UTF-32BE input.
pub const INVALID_UTF32BE: &str = "Invalid UTF-32BE stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

impl Endian {
    fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        }
    }

    fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        }
    }

    fn write_u16(self, unit: u16) -> [u8; 2] {
        match self {
            Endian::Little => unit.to_le_bytes(),
            Endian::Big => unit.to_be_bytes(),
        }
    }

    fn write_u32(self, unit: u32) -> [u8; 4] {
        match self {
            Endian::Little => unit.to_le_bytes(),
            Endian::Big => unit.to_be_bytes(),
        }
    }
}

/// One malformed code unit, as handed to the policy and the error.
struct BadUnit {
    /// The unit's value (for a truncated unit, the bytes read).
    unit: u32,
    /// First byte of the unit, passed to the policy.
    byte: u8,
    /// Byte offset at which the unit starts.
    pos: usize,
}

fn truncated(rest: &[u8], pos: usize) -> BadUnit {
    BadUnit {
        unit: rest.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
        byte: rest[0],
        pos,
    }
}

/// Lazy scalar stream over UTF-16 code units.
struct Utf16Units<'a> {
    bytes: &'a [u8],
    endian: Endian,
    pos: usize,
}

impl Iterator for Utf16Units<'_> {
    type Item = Result<char, BadUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.bytes[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let pos = self.pos;
        if rest.len() < 2 {
            self.pos = self.bytes.len();
            return Some(Err(truncated(rest, pos)));
        }
        let unit = self.endian.read_u16([rest[0], rest[1]]);
        match unit {
            0xD800..=0xDBFF => {
                if rest.len() >= 4 {
                    let low = self.endian.read_u16([rest[2], rest[3]]);
                    if (0xDC00..=0xDFFF).contains(&low) {
                        self.pos += 4;
                        let scalar = 0x1_0000
                            + ((u32::from(unit - 0xD800) << 10) | u32::from(low - 0xDC00));
                        return Some(Ok(scalar_from(scalar)));
                    }
                }
                // Unpaired high surrogate: one error, the next unit is
                // rescanned on its own.
                self.pos += 2;
                Some(Err(BadUnit {
                    unit: u32::from(unit),
                    byte: rest[0],
                    pos,
                }))
            }
            0xDC00..=0xDFFF => {
                self.pos += 2;
                Some(Err(BadUnit {
                    unit: u32::from(unit),
                    byte: rest[0],
                    pos,
                }))
            }
            _ => {
                self.pos += 2;
                Some(Ok(scalar_from(u32::from(unit))))
            }
        }
    }
}

/// Lazy scalar stream over UTF-32 code units.
struct Utf32Units<'a> {
    bytes: &'a [u8],
    endian: Endian,
    pos: usize,
}

impl Iterator for Utf32Units<'_> {
    type Item = Result<char, BadUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.bytes[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let pos = self.pos;
        if rest.len() < 4 {
            self.pos = self.bytes.len();
            return Some(Err(truncated(rest, pos)));
        }
        let unit = self.endian.read_u32([rest[0], rest[1], rest[2], rest[3]]);
        self.pos += 4;
        match char::from_u32(unit) {
            Some(c) => Some(Ok(c)),
            None => Some(Err(BadUnit {
                unit,
                byte: rest[0],
                pos,
            })),
        }
    }
}

/// A scalar value known to be in range.
fn scalar_from(value: u32) -> char {
    match char::from_u32(value) {
        Some(c) => c,
        None => unreachable!("surrogates were paired and u16s are in range"),
    }
}

/// Single-pass fusion of a scalar-or-error stream into text.
fn fuse<I, P>(units: I, reason: &'static str, policy: &mut P, capacity: usize) -> Result<Text, DecodeError>
where
    I: Iterator<Item = Result<char, BadUnit>>,
    P: ErrorPolicy + ?Sized,
{
    let mut out = String::with_capacity(capacity);
    for item in units {
        match item {
            Ok(c) => out.push(c),
            Err(bad) => match policy.on_error(reason, Some(bad.byte)) {
                Disposition::Replace(raw) => out.push(policy::sanitize_replacement(raw)),
                Disposition::Skip => {}
                Disposition::Abort => {
                    return Err(DecodeError::InvalidCodeUnit {
                        reason,
                        unit: bad.unit,
                        pos: bad.pos,
                    });
                }
            },
        }
    }
    Ok(Text::from(out))
}

macro_rules! utf16_codec {
    ($decode:ident, $decode_with:ident, $encode:ident, $endian:expr, $reason:expr, $name:literal) => {
        #[doc = concat!("Decodes ", $name, " strictly.")]
        ///
        /// # Errors
        ///
        /// [`DecodeError::InvalidCodeUnit`] on an unpaired surrogate or a
        /// truncated trailing unit.
        pub fn $decode(bytes: &[u8]) -> Result<Text, DecodeError> {
            $decode_with(&mut Strict, bytes)
        }

        #[doc = concat!("Decodes ", $name, " under a caller-supplied policy, invoked once per malformed code unit.")]
        ///
        /// # Errors
        ///
        /// [`DecodeError::InvalidCodeUnit`] if the policy aborts.
        pub fn $decode_with<P: ErrorPolicy + ?Sized>(
            policy: &mut P,
            bytes: &[u8],
        ) -> Result<Text, DecodeError> {
            let units = Utf16Units {
                bytes,
                endian: $endian,
                pos: 0,
            };
            fuse(units, $reason, policy, bytes.len() / 2 + 1)
        }

        #[doc = concat!("Encodes text as ", $name, ". Never fails.")]
        #[must_use]
        pub fn $encode(text: &Text) -> Vec<u8> {
            let mut out = Vec::with_capacity(text.len() * 2);
            let mut units = [0u16; 2];
            for c in text.chars() {
                for &unit in c.encode_utf16(&mut units).iter() {
                    out.extend_from_slice(&$endian.write_u16(unit));
                }
            }
            out
        }
    };
}

macro_rules! utf32_codec {
    ($decode:ident, $decode_with:ident, $encode:ident, $endian:expr, $reason:expr, $name:literal) => {
        #[doc = concat!("Decodes ", $name, " strictly.")]
        ///
        /// # Errors
        ///
        /// [`DecodeError::InvalidCodeUnit`] on a surrogate or out-of-range
        /// unit, or a truncated trailing unit.
        pub fn $decode(bytes: &[u8]) -> Result<Text, DecodeError> {
            $decode_with(&mut Strict, bytes)
        }

        #[doc = concat!("Decodes ", $name, " under a caller-supplied policy, invoked once per malformed code unit.")]
        ///
        /// # Errors
        ///
        /// [`DecodeError::InvalidCodeUnit`] if the policy aborts.
        pub fn $decode_with<P: ErrorPolicy + ?Sized>(
            policy: &mut P,
            bytes: &[u8],
        ) -> Result<Text, DecodeError> {
            let units = Utf32Units {
                bytes,
                endian: $endian,
                pos: 0,
            };
            fuse(units, $reason, policy, bytes.len() / 4 + 1)
        }

        #[doc = concat!("Encodes text as ", $name, ". Never fails.")]
        #[must_use]
        pub fn $encode(text: &Text) -> Vec<u8> {
            let mut out = Vec::with_capacity(text.len() * 4);
            for c in text.chars() {
                out.extend_from_slice(&$endian.write_u32(u32::from(c)));
            }
            out
        }
    };
}

utf16_codec!(
    decode_utf16le,
    decode_utf16le_with,
    encode_utf16le,
    Endian::Little,
    INVALID_UTF16LE,
    "UTF-16LE"
);
utf16_codec!(
    decode_utf16be,
    decode_utf16be_with,
    encode_utf16be,
    Endian::Big,
    INVALID_UTF16BE,
    "UTF-16BE"
);
utf32_codec!(
    decode_utf32le,
    decode_utf32le_with,
    encode_utf32le,
    Endian::Little,
    INVALID_UTF32LE,
    "UTF-32LE"
);
utf32_codec!(
    decode_utf32be,
    decode_utf32be_with,
    encode_utf32be,
    Endian::Big,
    INVALID_UTF32BE,
    "UTF-32BE"
);

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::policy::Lossy;

    #[test]
    fn snowman_round_trips_through_utf16le() {
        let text = Text::from("☃");
        assert_eq!(encode_utf16le(&text), [0x03, 0x26]);
        assert_eq!(decode_utf16le(&[0x03, 0x26]).unwrap(), "☃");
    }

    #[test]
    fn surrogate_pairs_round_trip_in_both_orders() {
        let text = Text::from("𝄞 clef");
        let codecs: [(fn(&Text) -> Vec<u8>, fn(&[u8]) -> Result<Text, DecodeError>); 2] = [
            (encode_utf16le, decode_utf16le),
            (encode_utf16be, decode_utf16be),
        ];
        for (encode, decode) in codecs {
            let bytes = encode(&text);
            assert_eq!(decode(&bytes).unwrap(), text);
        }
        // And the pair itself is laid out as expected: D834 DD1E.
        assert_eq!(encode_utf16be(&Text::from("𝄞")), [0xD8, 0x34, 0xDD, 0x1E]);
    }

    #[test]
    fn unpaired_surrogates_are_one_error_each() {
        // high, high, 'A': the first high is not followed by a low.
        let bytes = [0x34, 0xD8, 0x34, 0xD8, 0x41, 0x00];
        assert!(matches!(
            decode_utf16le(&bytes),
            Err(DecodeError::InvalidCodeUnit {
                reason: INVALID_UTF16LE,
                unit: 0xD834,
                pos: 0,
            })
        ));
        let text = decode_utf16le_with(&mut Lossy, &bytes).unwrap();
        assert_eq!(text, "\u{FFFD}\u{FFFD}A");
    }

    #[test]
    fn lone_low_surrogate_is_an_error() {
        let text = decode_utf16le_with(&mut Lossy, &[0x1E, 0xDD, 0x41, 0x00]).unwrap();
        assert_eq!(text, "\u{FFFD}A");
    }

    #[test]
    fn odd_trailing_byte_is_one_error() {
        assert!(matches!(
            decode_utf16le(&[0x41, 0x00, 0x7F]),
            Err(DecodeError::InvalidCodeUnit { unit: 0x7F, pos: 2, .. })
        ));
        assert_eq!(
            decode_utf16le_with(&mut Lossy, &[0x41, 0x00, 0x7F]).unwrap(),
            "A\u{FFFD}"
        );
    }

    #[test]
    fn utf32_validates_the_scalar_range() {
        // 0x110000 and a surrogate are both out of range.
        let beyond = 0x0011_0000u32.to_le_bytes();
        assert!(matches!(
            decode_utf32le(&beyond),
            Err(DecodeError::InvalidCodeUnit { unit: 0x0011_0000, pos: 0, .. })
        ));
        let surrogate = 0xD800u32.to_be_bytes();
        assert!(matches!(
            decode_utf32be(&surrogate),
            Err(DecodeError::InvalidCodeUnit { unit: 0xD800, .. })
        ));
        assert_eq!(
            decode_utf32le_with(&mut Lossy, &beyond).unwrap(),
            "\u{FFFD}"
        );
    }

    #[test]
    fn utf32_round_trips_both_endiannesses() {
        let text = Text::from("a☃𝄞");
        assert_eq!(decode_utf32le(&encode_utf32le(&text)).unwrap(), text);
        assert_eq!(decode_utf32be(&encode_utf32be(&text)).unwrap(), text);
        assert_eq!(
            encode_utf32be(&Text::from("☃")),
            [0x00, 0x00, 0x26, 0x03]
        );
    }

    #[test]
    fn truncated_utf32_unit_is_one_error() {
        let text = decode_utf32le_with(&mut Lossy, &[0x41, 0x00, 0x00, 0x00, 0x42]).unwrap();
        assert_eq!(text, "A\u{FFFD}");
    }

    #[test]
    fn boms_are_ordinary_code_points() {
        let le_bom = vec![0xFF, 0xFE, 0x41, 0x00];
        assert_eq!(decode_utf16le(&le_bom).unwrap(), "\u{FEFF}A");
        let be_bom = vec![0xFE, 0xFF, 0x00, 0x41];
        assert_eq!(decode_utf16be(&be_bom).unwrap(), "\u{FEFF}A");
    }

    #[test]
    fn empty_input_in_every_codec() {
        assert_eq!(decode_utf16le(b"").unwrap(), "");
        assert_eq!(decode_utf16be(b"").unwrap(), "");
        assert_eq!(decode_utf32le(b"").unwrap(), "");
        assert_eq!(decode_utf32be(b"").unwrap(), "");
        assert_eq!(encode_utf16le(&Text::new()), Vec::<u8>::new());
        assert_eq!(encode_utf32be(&Text::new()), Vec::<u8>::new());
    }
}
