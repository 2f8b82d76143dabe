//! The library error type.

use alloc::vec::Vec;

use thiserror::Error;

/// Error returned by the strict decoders, or by any decoder whose policy
/// aborts.
///
/// Positions are measured in the address space of the call that observed the
/// error: for the one-shot decoders this is an offset into the input slice,
/// for [`StreamDecoder::feed`](crate::StreamDecoder::feed) it is an offset
/// into the current chunk, where *negative* offsets denote bytes retained
/// from a previous chunk (`-1` is the last carried byte).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// An invalid byte was observed in the input stream.
    #[error("{reason}: byte {byte:#04x} at offset {pos}")]
    Malformed {
        /// The reason string that was passed to the error policy.
        reason: &'static str,
        /// The offending byte.
        byte: u8,
        /// Offset of the byte; negative when it came from the carry.
        pos: isize,
    },

    /// The input ended in the middle of a multi-byte code point.
    ///
    /// Reported only on strict finalisation; `bytes` holds the dangling
    /// prefix (one to three bytes).
    #[error("{reason}: {:?}", bstr::BStr::new(.bytes))]
    Incomplete {
        /// The reason string that was passed to the error policy.
        reason: &'static str,
        /// The carried bytes of the unfinished code point.
        bytes: Vec<u8>,
    },

    /// [`decode_ascii`](crate::decode_ascii) met a byte outside `0x00..=0x7F`.
    #[error("input is not ASCII: byte {byte:#04x} at offset {pos}")]
    NonAscii {
        /// The offending byte.
        byte: u8,
        /// Offset of the byte in the input.
        pos: usize,
    },

    /// A malformed code unit in UTF-16 or UTF-32 input: an unpaired
    /// surrogate, an out-of-range scalar, or a truncated trailing unit.
    #[error("{reason}: code unit {unit:#x} at offset {pos}")]
    InvalidCodeUnit {
        /// The reason string that was passed to the error policy.
        reason: &'static str,
        /// The offending code unit (for a truncated unit, the bytes read).
        unit: u32,
        /// Byte offset at which the code unit starts.
        pos: usize,
    },
}
