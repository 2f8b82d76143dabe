//! Chunk validation: longest valid prefix, carry, continuation.
//!
//! [`validate_utf8_chunk`] walks one slice and reports how much of it is
//! well-formed together with what to do about the rest: either the index at
//! which scanning should resume after an invalid sequence, or the trailing
//! bytes of a code point that straddles the chunk boundary. The straddling
//! bytes travel between chunks as a [`Carry`]; [`validate_next_utf8_chunk`]
//! resumes against one.
//!
//! Nothing in this module allocates or fails; errors are values for the
//! driver in [`crate::decoder`] to act on.

use super::machine::DecoderState;

/// The 0–3 pending bytes of a code point split across a chunk boundary,
/// together with the automaton state they left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carry {
    buf: [u8; 3],
    len: u8,
    state: DecoderState,
}

impl Carry {
    /// The pending bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }

    /// Number of pending bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Whether nothing is pending. Holds exactly when the state is
    /// [`DecoderState::Start`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The automaton state after the pending bytes.
    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    fn from_suffix(bytes: &[u8], state: DecoderState) -> Self {
        debug_assert!(bytes.len() <= 3);
        debug_assert_eq!(bytes.is_empty(), state.is_complete());
        let mut buf = [0u8; 3];
        buf[..bytes.len()].copy_from_slice(bytes);
        Carry {
            buf,
            len: bytes.len() as u8,
            state,
        }
    }

    /// Extends the carry with further bytes of the still-unfinished code
    /// point. The combined length never exceeds three: a four-byte sequence
    /// has at most three bytes buffered before its last byte arrives.
    fn extended(&self, bytes: &[u8], state: DecoderState) -> Self {
        let mut next = self.clone();
        next.buf[usize::from(next.len)..usize::from(next.len) + bytes.len()]
            .copy_from_slice(bytes);
        next.len += bytes.len() as u8;
        next.state = state;
        next
    }
}

/// What follows the valid prefix of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// An invalid sequence; rescanning should resume at `bytes[next..]`.
    ///
    /// The erroneous range is `[valid_prefix_len, next)`: a single bad lead
    /// byte gives `next == i + 1`, a bad continuation byte gives `next == i`
    /// so the offending byte itself is rescanned as a candidate lead.
    Invalid {
        /// First index not part of the erroneous range.
        next: usize,
    },
    /// The chunk ended cleanly; an empty carry means at a code point
    /// boundary, a nonempty one holds the straddling bytes.
    Carry(Carry),
}

/// Scans `bytes` from a code point boundary and returns the length of the
/// longest well-formed prefix plus the [`Validation`] describing the rest.
///
/// ```
/// use textmodem::{validate_utf8_chunk, Validation};
///
/// // "hi " followed by the first byte of a three-byte code point.
/// let (n, outcome) = validate_utf8_chunk(b"hi \xE2");
/// assert_eq!(n, 3);
/// let Validation::Carry(carry) = outcome else { panic!() };
/// assert_eq!(carry.bytes(), [0xE2]);
/// ```
#[must_use]
pub fn validate_utf8_chunk(bytes: &[u8]) -> (usize, Validation) {
    // Bulk fast path: everything before the last possible multi-byte lead
    // can be batch-validated; only the tail needs the byte-at-a-time walk.
    let boundary = trailing_lead_boundary(bytes);
    if boundary > 0 && core::str::from_utf8(&bytes[..boundary]).is_ok() {
        return walk(bytes, boundary);
    }
    walk(bytes, 0)
}

/// Scalar walk from `start`, which must be a code point boundary of `bytes`.
fn walk(bytes: &[u8], start: usize) -> (usize, Validation) {
    let mut state = DecoderState::Start;
    let mut last_complete = start;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match state.step(b) {
            Some(next) => {
                state = next;
                if state.is_complete() {
                    last_complete = i + 1;
                }
            }
            None => {
                let next = if i == last_complete { i + 1 } else { i };
                return (last_complete, Validation::Invalid { next });
            }
        }
    }
    let carry = Carry::from_suffix(&bytes[last_complete..], state);
    (last_complete, Validation::Carry(carry))
}

/// Largest boundary such that `bytes[..boundary]` cannot end inside a
/// multi-byte code point *that the suffix walk would miss*: we back off past
/// at most one trailing byte that could begin a 2-, 3- or 4-byte sequence.
fn trailing_lead_boundary(bytes: &[u8]) -> usize {
    let len = bytes.len();
    if len >= 1 && bytes[len - 1] >= 0xC2 {
        len - 1
    } else if len >= 2 && bytes[len - 2] >= 0xE0 {
        len - 2
    } else if len >= 3 && bytes[len - 3] >= 0xF0 {
        len - 3
    } else {
        len
    }
}

/// Continues validation across a chunk boundary.
///
/// Returns `(end_pos, outcome)`. A non-negative `end_pos` means the carry
/// (if any) completed and `bytes[..end_pos]` extends the valid output; the
/// outcome's indices are relative to `bytes`. A negative `end_pos`, always
/// exactly `-(carry.len())`, means the pending or erroneous range begins
/// inside the carry: on [`Validation::Invalid`] the erroneous bytes are the
/// whole carry followed by `bytes[..next]`, and on [`Validation::Carry`]
/// nothing was committed and the returned carry holds the old bytes plus
/// all of `bytes`.
///
/// A carry completing exactly at the end of `bytes` yields
/// `(bytes.len(), Validation::Carry(Carry::default()))`.
#[must_use]
pub fn validate_next_utf8_chunk(bytes: &[u8], carry: &Carry) -> (isize, Validation) {
    if carry.is_empty() {
        let (n, outcome) = validate_utf8_chunk(bytes);
        return (to_isize(n), outcome);
    }

    let carried = -to_isize(carry.len());
    let mut state = carry.state();
    for (i, &b) in bytes.iter().enumerate() {
        match state.step(b) {
            None => return (carried, Validation::Invalid { next: i }),
            Some(next_state) => {
                state = next_state;
                if state.is_complete() {
                    let p = i + 1;
                    let (n, outcome) = validate_utf8_chunk(&bytes[p..]);
                    let outcome = match outcome {
                        Validation::Invalid { next } => Validation::Invalid { next: next + p },
                        carry @ Validation::Carry(_) => carry,
                    };
                    return (to_isize(p + n), outcome);
                }
            }
        }
    }
    (carried, Validation::Carry(carry.extended(bytes, state)))
}

fn to_isize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(next: usize) -> Validation {
        Validation::Invalid { next }
    }

    fn carry_of(bytes: &[u8]) -> Carry {
        let (n, outcome) = validate_utf8_chunk(bytes);
        assert_eq!(n, 0);
        match outcome {
            Validation::Carry(c) => c,
            Validation::Invalid { .. } => panic!("expected carry from {bytes:02x?}"),
        }
    }

    #[test]
    fn clean_ascii_chunk() {
        let (n, outcome) = validate_utf8_chunk(b"hello");
        assert_eq!(n, 5);
        assert_eq!(outcome, Validation::Carry(Carry::default()));
    }

    #[test]
    fn empty_chunk() {
        let (n, outcome) = validate_utf8_chunk(b"");
        assert_eq!(n, 0);
        assert_eq!(outcome, Validation::Carry(Carry::default()));
    }

    #[test]
    fn bad_lead_byte_resumes_after_it() {
        let (n, outcome) = validate_utf8_chunk(&[0x41, 0xFF, 0x42]);
        assert_eq!(n, 1);
        assert_eq!(outcome, invalid(2));
    }

    #[test]
    fn bad_continuation_resumes_at_the_offending_byte() {
        // E0 must be followed by A0..=BF; the 0x41 gets rescanned as a lead.
        let (n, outcome) = validate_utf8_chunk(&[0xE0, 0x41]);
        assert_eq!(n, 0);
        assert_eq!(outcome, invalid(1));
    }

    #[test]
    fn dangling_lead_in_mid_sequence_resumes_at_the_bad_byte() {
        let (n, outcome) = validate_utf8_chunk(&[0xE2, 0x98, 0xFF, 0x41]);
        assert_eq!(n, 0);
        assert_eq!(outcome, invalid(2));
    }

    #[test]
    fn trailing_partial_code_point_becomes_the_carry() {
        let (n, outcome) = validate_utf8_chunk(b"hi \xE2\x98");
        assert_eq!(n, 3);
        let Validation::Carry(c) = outcome else {
            panic!();
        };
        assert_eq!(c.bytes(), [0xE2, 0x98]);
        assert!(!c.state().is_complete());
    }

    #[test]
    fn valid_prefix_is_maximal() {
        // Every prefix boundary of a valid string must round-trip.
        let s = "aé☃𝄞!";
        let (n, outcome) = validate_utf8_chunk(s.as_bytes());
        assert_eq!(n, s.len());
        assert_eq!(outcome, Validation::Carry(Carry::default()));
    }

    #[test]
    fn bulk_and_scalar_paths_agree() {
        // Inputs chosen to hit each trailing-lead back-off and the fallback.
        let cases: &[&[u8]] = &[
            b"plain ascii",
            b"snow \xE2\x98\x83 ok",
            b"tail2 \xE2\x98",
            b"tail3 \xF0\x9D\x84",
            b"tail1 \xC3",
            b"bad \xFF mid",
            b"\xE0\x80\x80",
            b"\xF4\x90\x80\x80",
        ];
        for &case in cases {
            assert_eq!(
                validate_utf8_chunk(case),
                walk(case, 0),
                "{case:02x?}"
            );
        }
    }

    #[test]
    fn continuation_completes_across_the_boundary() {
        let carry = carry_of(&[0xE2]);
        let (end, outcome) = validate_next_utf8_chunk(&[0x98, 0x83, b'!'], &carry);
        assert_eq!(end, 3);
        assert_eq!(outcome, Validation::Carry(Carry::default()));
    }

    #[test]
    fn continuation_completing_exactly_at_the_end() {
        let carry = carry_of(&[0xE2, 0x98]);
        let (end, outcome) = validate_next_utf8_chunk(&[0x83], &carry);
        assert_eq!(end, 1);
        assert_eq!(outcome, Validation::Carry(Carry::default()));
    }

    #[test]
    fn continuation_still_pending_extends_the_carry() {
        let carry = carry_of(&[0xF0]);
        let (end, outcome) = validate_next_utf8_chunk(&[0x9D, 0x84], &carry);
        assert_eq!(end, -1);
        let Validation::Carry(c) = outcome else {
            panic!();
        };
        assert_eq!(c.bytes(), [0xF0, 0x9D, 0x84]);
    }

    #[test]
    fn continuation_rejecting_points_inside_the_carry() {
        let carry = carry_of(&[0xE2, 0x98]);
        let (end, outcome) = validate_next_utf8_chunk(&[0x41], &carry);
        assert_eq!(end, -2);
        assert_eq!(outcome, invalid(0));
    }

    #[test]
    fn continuation_rejecting_after_consuming_chunk_bytes() {
        // F0 carried, then a good continuation and a bad one: the error
        // range is the carry plus one chunk byte.
        let carry = carry_of(&[0xF0]);
        let (end, outcome) = validate_next_utf8_chunk(&[0x90, 0x41], &carry);
        assert_eq!(end, -1);
        assert_eq!(outcome, invalid(1));
    }

    #[test]
    fn empty_carry_delegates() {
        let (end, outcome) = validate_next_utf8_chunk(b"ok", &Carry::default());
        assert_eq!(end, 2);
        assert_eq!(outcome, Validation::Carry(Carry::default()));
    }
}
