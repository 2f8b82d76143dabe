//! Streaming UTF-8 decoding.
//!
//! Overview
//! - This module implements an incremental decoder that accepts raw bytes in
//!   chunks split at arbitrary boundaries and assembles validated output
//!   into a single [`Text`] per call.
//! - Validation ([`validate_utf8_chunk`], [`validate_next_utf8_chunk`])
//!   never fails and never allocates; it reports the longest well-formed
//!   prefix and either where to resume after an invalid sequence or the
//!   [`Carry`] straddling the chunk boundary.
//! - The decode layer pushes validated ranges onto a [`SegmentStack`] and
//!   drives the [`ErrorPolicy`] over erroneous ranges, so valid bytes are
//!   copied exactly once (at materialise time) and errors never force a
//!   rescan.
//!
//! Error ranges
//! - An invalid range runs from the end of the valid prefix up to the next
//!   candidate byte, and may begin *inside* the carry when a code point that
//!   straddled a boundary turns out to be malformed. The driver enumerates
//!   such ranges byte by byte in a virtual address space where negative
//!   positions denote carried bytes, invoking the policy once per byte in
//!   order. One replacement per byte is this crate's approximation of the
//!   Unicode "maximal subpart" rule.
//!
//! Choosing an entry point
//! - Whole input in hand: [`decode_utf8`], [`decode_utf8_lenient`], or
//!   [`decode_utf8_with`].
//! - Input arriving in chunks: [`StreamDecoder`] (or the
//!   [`stream_decode_utf8`] helpers), which carries the 0–3 straddling bytes
//!   between [`feed`](StreamDecoder::feed) calls. Chunk boundaries are
//!   unobservable: any partition of a byte stream produces the same text
//!   and the same ordered policy invocations as one call on the whole.

mod machine;
mod segments;
mod validate;


pub use machine::{ByteRange, DecoderState};
pub use segments::SegmentStack;
pub use validate::{Carry, Validation, validate_next_utf8_chunk, validate_utf8_chunk};

use crate::{
    error::DecodeError,
    policy::{self, Disposition, ErrorPolicy, Lossy, Strict},
    text::Text,
};

/// Outcome of a mid-level decode step: [`decode_utf8_chunk`] and
/// [`decode_next_utf8_chunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// An invalid sequence follows the committed prefix; `rest` is the
    /// not-yet-examined tail starting at the next candidate byte.
    Invalid {
        /// Index of the next candidate byte in the chunk.
        next: usize,
        /// `bytes[next..]`, for resuming.
        rest: &'a [u8],
    },
    /// The chunk ended cleanly with this carry pending (possibly empty).
    Carry(Carry),
}

/// Validates one chunk from a code point boundary and commits the valid
/// prefix to `stack`. Returns the committed length and what follows.
pub fn decode_utf8_chunk<'a>(
    bytes: &'a [u8],
    stack: &mut SegmentStack<'a>,
) -> (isize, Decoded<'a>) {
    decode_next_utf8_chunk(bytes, &Carry::default(), stack)
}

/// Validates one chunk against a pending carry and commits the completed
/// carry bytes plus the newly validated prefix to `stack`.
///
/// The returned `end_pos` follows [`validate_next_utf8_chunk`]: when
/// non-negative, `carry` completed and `bytes[..end_pos]` was committed;
/// when negative, nothing was committed and the pending or erroneous range
/// begins inside the carry.
pub fn decode_next_utf8_chunk<'a>(
    bytes: &'a [u8],
    carry: &Carry,
    stack: &mut SegmentStack<'a>,
) -> (isize, Decoded<'a>) {
    let (end, outcome) = validate_next_utf8_chunk(bytes, carry);
    if end >= 0 {
        // SAFETY: the validator accepted the carry bytes followed by
        // `bytes[..end]` as a continuation of the stream, so together with
        // everything already on the stack they stay well-formed.
        unsafe {
            stack.push_inline(carry.bytes());
            stack.push_bytes(&bytes[..end.unsigned_abs()]);
        }
    }
    let decoded = match outcome {
        Validation::Invalid { next } => Decoded::Invalid {
            next,
            rest: &bytes[next..],
        },
        Validation::Carry(c) => Decoded::Carry(c),
    };
    (end, decoded)
}

/// Walks one erroneous byte range through the policy, pushing whatever
/// replacements it asks for onto `stack`.
///
/// The range is `carry_bytes` followed by `chunk_bytes`, enumerated in
/// order; carried bytes report negative positions (`-carry_bytes.len()`
/// up to `0`), chunk bytes report `chunk_base` upwards.
///
/// # Errors
///
/// [`DecodeError::Malformed`] for the byte on which the policy aborted.
pub fn handle_utf8_err<P: ErrorPolicy + ?Sized>(
    policy: &mut P,
    reason: &'static str,
    carry_bytes: &[u8],
    chunk_bytes: &[u8],
    chunk_base: isize,
    stack: &mut SegmentStack<'_>,
) -> Result<(), DecodeError> {
    let carried = to_isize(carry_bytes.len());
    for (j, &byte) in carry_bytes.iter().enumerate() {
        let pos = to_isize(j) - carried;
        apply_policy(policy, reason, byte, pos, stack)?;
    }
    for (j, &byte) in chunk_bytes.iter().enumerate() {
        apply_policy(policy, reason, byte, chunk_base + to_isize(j), stack)?;
    }
    Ok(())
}

fn apply_policy<P: ErrorPolicy + ?Sized>(
    policy: &mut P,
    reason: &'static str,
    byte: u8,
    pos: isize,
    stack: &mut SegmentStack<'_>,
) -> Result<(), DecodeError> {
    match policy.on_error(reason, Some(byte)) {
        Disposition::Replace(raw) => {
            stack.push_char(policy::sanitize_replacement(raw));
            Ok(())
        }
        Disposition::Skip => Ok(()),
        Disposition::Abort => Err(DecodeError::Malformed { reason, byte, pos }),
    }
}

/// Reports a carry left dangling at end of input to the policy.
fn flush_incomplete<P: ErrorPolicy + ?Sized>(
    policy: &mut P,
    carry: &Carry,
    stack: &mut SegmentStack<'_>,
) -> Result<(), DecodeError> {
    for &byte in carry.bytes() {
        match policy.on_error(policy::INCOMPLETE_UTF8, Some(byte)) {
            Disposition::Replace(raw) => stack.push_char(policy::sanitize_replacement(raw)),
            Disposition::Skip => {}
            Disposition::Abort => {
                return Err(DecodeError::Incomplete {
                    reason: policy::INCOMPLETE_UTF8,
                    bytes: carry.bytes().to_vec(),
                });
            }
        }
    }
    Ok(())
}

/// Decodes as much of `bytes` as possible, driving the policy over every
/// invalid range, and returns the carry pending at the end of the chunk.
fn run_chunk<'a, P: ErrorPolicy + ?Sized>(
    policy: &mut P,
    mut carry: Carry,
    mut bytes: &'a [u8],
    stack: &mut SegmentStack<'a>,
) -> Result<Carry, DecodeError> {
    // Offset of the current `bytes` tail within the chunk this call was
    // given, so reported error positions stay in the caller's address space.
    let mut base = 0isize;
    loop {
        let (end, outcome) = decode_next_utf8_chunk(bytes, &carry, stack);
        match outcome {
            Decoded::Carry(next) => return Ok(next),
            Decoded::Invalid { next, rest } => {
                if end < 0 {
                    handle_utf8_err(
                        policy,
                        policy::INVALID_UTF8,
                        carry.bytes(),
                        &bytes[..next],
                        base,
                        stack,
                    )?;
                } else {
                    let start = end.unsigned_abs();
                    handle_utf8_err(
                        policy,
                        policy::INVALID_UTF8,
                        &[],
                        &bytes[start..next],
                        base + end,
                        stack,
                    )?;
                }
                carry = Carry::default();
                base += to_isize(next);
                bytes = rest;
            }
        }
    }
}

/// Decodes UTF-8 strictly.
///
/// Either the whole input is well-formed and the decoded text is returned,
/// or the first error is reported and no partial output escapes. This is
/// both the strict and the catching entry point: the `Result` *is* the
/// catch.
///
/// ```
/// use textmodem::decode_utf8;
///
/// assert_eq!(decode_utf8(b"hi \xE2\x98\x83").unwrap(), "hi ☃");
/// assert!(decode_utf8(b"hi \xE2\x98").is_err());
/// ```
///
/// # Errors
///
/// [`DecodeError::Malformed`] on an invalid byte,
/// [`DecodeError::Incomplete`] when the input ends mid-code point.
pub fn decode_utf8(bytes: &[u8]) -> Result<Text, DecodeError> {
    decode_utf8_with(&mut Strict, bytes)
}

/// Decodes UTF-8, replacing every erroneous byte with U+FFFD.
///
/// Total: always returns a text.
///
/// ```
/// use textmodem::decode_utf8_lenient;
///
/// assert_eq!(decode_utf8_lenient(b"A\xFFB"), "A\u{FFFD}B");
/// ```
#[must_use]
pub fn decode_utf8_lenient(bytes: &[u8]) -> Text {
    match decode_utf8_with(&mut Lossy, bytes) {
        Ok(text) => text,
        Err(_) => unreachable!("Lossy never aborts"),
    }
}

/// Decodes UTF-8 under a caller-supplied [`ErrorPolicy`].
///
/// The policy is invoked once per erroneous byte, in input order, with the
/// reason string and the byte; see [`crate::policy`] for the contract.
///
/// # Errors
///
/// Whatever error the policy's `Abort` produces: [`DecodeError::Malformed`]
/// or, at end of input, [`DecodeError::Incomplete`].
pub fn decode_utf8_with<P: ErrorPolicy + ?Sized>(
    policy: &mut P,
    bytes: &[u8],
) -> Result<Text, DecodeError> {
    let mut stack = SegmentStack::new();
    let carry = run_chunk(policy, Carry::default(), bytes, &mut stack)?;
    if !carry.is_empty() {
        flush_incomplete(policy, &carry, &mut stack)?;
    }
    Ok(stack.materialise())
}

/// A push-based streaming UTF-8 decoder.
///
/// Feed it byte chunks split anywhere, even mid-code point, and it
/// returns the text each chunk completed, holding back the 1–3 bytes of a
/// straddling code point until the next feed:
///
/// ```
/// use textmodem::StreamDecoder;
///
/// let mut decoder = StreamDecoder::strict();
/// assert_eq!(decoder.feed(b"hi \xE2").unwrap(), "hi ");
/// assert_eq!(decoder.leftover(), [0xE2]);
/// assert_eq!(decoder.feed(b"\x98").unwrap(), "");
/// assert_eq!(decoder.feed(b"\x83").unwrap(), "☃");
/// assert_eq!(decoder.finish().unwrap(), "");
/// ```
///
/// The decoder captures its policy at construction; errors in any later
/// feed obey that policy. Error positions are reported per feed, negative
/// for carried bytes.
#[derive(Debug, Clone)]
pub struct StreamDecoder<P = Strict> {
    carry: Carry,
    policy: P,
}

impl StreamDecoder<Strict> {
    /// A decoder that fails on the first error.
    #[must_use]
    pub fn strict() -> Self {
        StreamDecoder::with_policy(Strict)
    }
}

impl StreamDecoder<Lossy> {
    /// A decoder that replaces every erroneous byte with U+FFFD.
    #[must_use]
    pub fn lenient() -> Self {
        StreamDecoder::with_policy(Lossy)
    }
}

impl<P: ErrorPolicy> StreamDecoder<P> {
    /// A decoder driving the given policy.
    pub fn with_policy(policy: P) -> Self {
        StreamDecoder {
            carry: Carry::default(),
            policy,
        }
    }

    /// Decodes the next chunk, returning the text it produced.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Malformed`] if the policy aborts; the partial output
    /// of the failed feed is discarded and the carry is reset.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Text, DecodeError> {
        let mut stack = SegmentStack::new();
        let carry = core::mem::take(&mut self.carry);
        self.carry = run_chunk(&mut self.policy, carry, bytes, &mut stack)?;
        Ok(stack.materialise())
    }

    /// The bytes of the incomplete code point pending from the last feed.
    pub fn leftover(&self) -> &[u8] {
        self.carry.bytes()
    }

    /// Ends the stream, reporting a dangling carry to the policy.
    ///
    /// Returns the replacement text the policy produced for it (empty for a
    /// clean stream).
    ///
    /// # Errors
    ///
    /// [`DecodeError::Incomplete`] if bytes are pending and the policy
    /// aborts; with [`Strict`], that is exactly when the stream was truncated.
    pub fn finish(mut self) -> Result<Text, DecodeError> {
        let carry = core::mem::take(&mut self.carry);
        if carry.is_empty() {
            return Ok(Text::new());
        }
        let mut stack = SegmentStack::new();
        flush_incomplete(&mut self.policy, &carry, &mut stack)?;
        Ok(stack.materialise())
    }
}

/// Starts a strict decoding stream with its first chunk.
///
/// Returns the text the chunk produced and the continuation holding the
/// carry; keep feeding the continuation.
///
/// # Errors
///
/// [`DecodeError::Malformed`] on the first invalid byte.
pub fn stream_decode_utf8(bytes: &[u8]) -> Result<(Text, StreamDecoder<Strict>), DecodeError> {
    stream_decode_utf8_with(Strict, bytes)
}

/// Starts a decoding stream under `policy` with its first chunk.
///
/// # Errors
///
/// [`DecodeError::Malformed`] if the policy aborts on the first chunk.
pub fn stream_decode_utf8_with<P: ErrorPolicy>(
    policy: P,
    bytes: &[u8],
) -> Result<(Text, StreamDecoder<P>), DecodeError> {
    let mut decoder = StreamDecoder::with_policy(policy);
    let produced = decoder.feed(bytes)?;
    Ok((produced, decoder))
}

fn to_isize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}
