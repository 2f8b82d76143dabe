//! The UTF-8 byte automaton.
//!
//! One state per "how many continuation bytes remain", parameterised by the
//! window the *next* byte must fall in. The windows are what make the
//! automaton recognise exactly well-formed UTF-8 (RFC 3629): they exclude
//! overlong forms (`E0 80..9F`, `F0 80..8F`), the UTF-16 surrogate block
//! (`ED A0..BF`) and code points above U+10FFFF (`F4 90..BF`). The bytes
//! `C0`, `C1` and `F5..=FF` have no successor state at all.

/// An inclusive window of permissible byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    lo: u8,
    hi: u8,
}

impl ByteRange {
    /// The plain continuation-byte window `80..=BF`.
    pub(crate) const TAIL: ByteRange = ByteRange::new(0x80, 0xBF);

    pub(crate) const fn new(lo: u8, hi: u8) -> Self {
        ByteRange { lo, hi }
    }

    /// Whether `byte` falls inside the window.
    #[must_use]
    pub fn contains(self, byte: u8) -> bool {
        self.lo <= byte && byte <= self.hi
    }
}

/// A node in the UTF-8 recogniser.
///
/// `Start` doubles as the accepting state: the input seen so far is
/// well-formed exactly when the automaton is in `Start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// At a code point boundary.
    #[default]
    Start,
    /// One continuation byte (`80..=BF`) remains.
    Expect1,
    /// Two bytes remain; the next must fall in `next`.
    Expect2 {
        /// Window for the next byte.
        next: ByteRange,
    },
    /// Three bytes remain; the next must fall in `next`.
    Expect3 {
        /// Window for the next byte.
        next: ByteRange,
    },
}

impl DecoderState {
    /// Whether the automaton is at a code point boundary.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self == DecoderState::Start
    }

    /// Advances the automaton by one byte, or returns `None` if `byte` is
    /// invalid in this state (the stream is malformed at this position).
    #[must_use]
    pub fn step(self, byte: u8) -> Option<DecoderState> {
        use DecoderState::{Expect1, Expect2, Expect3, Start};

        match self {
            Start => match byte {
                0x00..=0x7F => Some(Start),
                0xC2..=0xDF => Some(Expect1),
                0xE0 => Some(Expect2 {
                    next: ByteRange::new(0xA0, 0xBF),
                }),
                0xE1..=0xEC | 0xEE..=0xEF => Some(Expect2 {
                    next: ByteRange::TAIL,
                }),
                0xED => Some(Expect2 {
                    next: ByteRange::new(0x80, 0x9F),
                }),
                0xF0 => Some(Expect3 {
                    next: ByteRange::new(0x90, 0xBF),
                }),
                0xF1..=0xF3 => Some(Expect3 {
                    next: ByteRange::TAIL,
                }),
                0xF4 => Some(Expect3 {
                    next: ByteRange::new(0x80, 0x8F),
                }),
                _ => None,
            },
            Expect1 => ByteRange::TAIL.contains(byte).then_some(Start),
            Expect2 { next } => next.contains(byte).then_some(Expect1),
            Expect3 { next } => next.contains(byte).then_some(Expect2 {
                next: ByteRange::TAIL,
            }),
        }
    }
}
