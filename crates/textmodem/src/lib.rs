//! A streaming, incremental Unicode text codec.
//!
//! `textmodem` converts between byte buffers and an immutable [`Text`]
//! representation across ASCII, Latin-1, UTF-8, UTF-16 (LE/BE) and UTF-32
//! (LE/BE). The heart of the crate is a streaming UTF-8 validator/decoder
//! that tolerates input split at *arbitrary* byte boundaries, even in the
//! middle of a code point, and drives a pluggable [error
//! policy](crate::policy) over malformed input without ever rescanning.
//!
//! # One-shot decoding
//!
//! ```
//! use textmodem::{decode_utf8, decode_utf8_lenient, decode_latin1};
//!
//! assert_eq!(decode_utf8("snow ☃".as_bytes()).unwrap(), "snow ☃");
//! assert_eq!(decode_utf8_lenient(b"bad \xFF byte"), "bad \u{FFFD} byte");
//! assert_eq!(decode_latin1(b"caf\xE9"), "café");
//! ```
//!
//! # Streaming
//!
//! A [`StreamDecoder`] holds the 0–3 bytes of a code point that straddles a
//! chunk boundary and completes it on the next feed. Splitting a stream at
//! any boundary yields the same text, and the same policy callbacks in the
//! same order, as decoding it whole:
//!
//! ```
//! use textmodem::StreamDecoder;
//!
//! let mut decoder = StreamDecoder::strict();
//! let mut out = String::new();
//! for chunk in ["snow ".as_bytes(), &[0xE2, 0x98], &[0x83]] {
//!     out.push_str(&decoder.feed(chunk).unwrap());
//! }
//! decoder.finish().unwrap();
//! assert_eq!(out, "snow ☃");
//! ```
//!
//! # Layers
//!
//! Three levels of API, lowest first:
//!
//! - [`validate_utf8_chunk`] / [`validate_next_utf8_chunk`]: pure validation
//!   returning the longest well-formed prefix and a [`Carry`] or resume
//!   point. Never allocates, never fails.
//! - [`decode_utf8_chunk`] / [`decode_next_utf8_chunk`] /
//!   [`handle_utf8_err`] over a [`SegmentStack`]: the assembly layer, for
//!   callers orchestrating their own decode loop.
//! - [`decode_utf8`] and friends, [`StreamDecoder`], the Latin-1/ASCII
//!   decoders, the [`Utf8Builder`] encoders and the UTF-16/32 codecs.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod ascii;
mod decoder;
mod encode;
mod error;
pub mod policy;
mod text;
mod wide;

#[cfg(test)]
mod tests;

pub use ascii::{decode_ascii, decode_ascii_prefix, decode_latin1};
pub use decoder::{
    ByteRange, Carry, Decoded, DecoderState, SegmentStack, StreamDecoder, Validation,
    decode_next_utf8_chunk, decode_utf8, decode_utf8_chunk, decode_utf8_lenient, decode_utf8_with,
    handle_utf8_err, stream_decode_utf8, stream_decode_utf8_with, validate_next_utf8_chunk,
    validate_utf8_chunk,
};
pub use encode::{BuildStep, EscapePrim, EscapedUtf8Builder, Utf8Builder, encode_utf8};
pub use error::DecodeError;
pub use policy::{Disposition, ErrorPolicy, INCOMPLETE_UTF8, INVALID_UTF8, Lossy, Strict};
pub use text::Text;
pub use wide::{
    INVALID_UTF16BE, INVALID_UTF16LE, INVALID_UTF32BE, INVALID_UTF32LE, decode_utf16be,
    decode_utf16be_with, decode_utf16le, decode_utf16le_with, decode_utf32be, decode_utf32be_with,
    decode_utf32le, decode_utf32le_with, encode_utf16be, encode_utf16le, encode_utf32be,
    encode_utf32le,
};
