//! ASCII and Latin-1 decoding.
//!
//! Both encodings are trivial per byte, so the interesting part is doing as
//! little per-byte work as possible: runs of ASCII are found a word at a
//! time and copied in bulk.

use alloc::vec::Vec;

use crate::{error::DecodeError, text::Text};

/// High bit of every lane in a `usize` of bytes.
const HIGH_BITS: usize = usize::from_ne_bytes([0x80; size_of::<usize>()]);

/// Length of the leading all-ASCII run of `bytes`.
pub(crate) fn ascii_prefix_len(bytes: &[u8]) -> usize {
    const LANES: usize = size_of::<usize>();
    let mut i = 0;
    while i + LANES <= bytes.len() {
        let mut lane = [0u8; LANES];
        lane.copy_from_slice(&bytes[i..i + LANES]);
        if usize::from_ne_bytes(lane) & HIGH_BITS != 0 {
            break;
        }
        i += LANES;
    }
    while i < bytes.len() && bytes[i].is_ascii() {
        i += 1;
    }
    i
}

/// Decodes the longest ASCII prefix of `bytes`, reporting the first
/// non-ASCII byte and its index if there is one.
///
/// ```
/// use textmodem::decode_ascii_prefix;
///
/// let (prefix, rest) = decode_ascii_prefix(b"Hi\xC3\xA9");
/// assert_eq!(prefix, "Hi");
/// assert_eq!(rest, Some((0xC3, 2)));
///
/// let (all, rest) = decode_ascii_prefix(b"plain");
/// assert_eq!(all, "plain");
/// assert_eq!(rest, None);
/// ```
#[must_use]
pub fn decode_ascii_prefix(bytes: &[u8]) -> (Text, Option<(u8, usize)>) {
    let k = ascii_prefix_len(bytes);
    // SAFETY: `bytes[..k]` is all ASCII, which is well-formed UTF-8.
    let prefix = unsafe { Text::from_vec_unchecked(bytes[..k].to_vec()) };
    let stopper = bytes.get(k).map(|&b| (b, k));
    (prefix, stopper)
}

/// Decodes ASCII input.
///
/// # Errors
///
/// [`DecodeError::NonAscii`] naming the first byte outside `0x00..=0x7F`
/// and its position.
pub fn decode_ascii(bytes: &[u8]) -> Result<Text, DecodeError> {
    match decode_ascii_prefix(bytes) {
        (text, None) => Ok(text),
        (_, Some((byte, pos))) => Err(DecodeError::NonAscii { byte, pos }),
    }
}

/// Decodes ISO-8859-1, mapping byte `b` to U+00`b`. Total: every byte
/// sequence is valid Latin-1.
///
/// ```
/// use textmodem::decode_latin1;
///
/// assert_eq!(decode_latin1(&[0x41, 0xE9]), "Aé");
/// assert_eq!(decode_latin1(&[0x41, 0xE9]).as_bytes(), [0x41, 0xC3, 0xA9]);
/// ```
#[must_use]
pub fn decode_latin1(bytes: &[u8]) -> Text {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    let mut rest = bytes;
    while !rest.is_empty() {
        let run = ascii_prefix_len(rest);
        out.extend_from_slice(&rest[..run]);
        rest = &rest[run..];
        if let Some((&b, tail)) = rest.split_first() {
            // U+0080..=U+00FF encode as exactly two bytes.
            out.push(0xC0 | (b >> 6));
            out.push(0x80 | (b & 0x3F));
            rest = tail;
        }
    }
    out.shrink_to_fit();
    // SAFETY: ASCII runs are copied verbatim and every high byte was
    // expanded to a valid two-byte sequence.
    unsafe { Text::from_vec_unchecked(out) }
}
