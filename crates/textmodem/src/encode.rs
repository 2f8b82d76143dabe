//! Encoding text back to UTF-8 bytes.
//!
//! [`encode_utf8`] is a plain buffer copy, since [`Text`](crate::Text)
//! stores UTF-8. The builders exist for writers that fill fixed-size output
//! buffers: each `write` call fills as much of the given buffer as it can
//! and reports, without recursion, whether it is done or how much room the
//! next call needs at minimum.

use alloc::vec::Vec;

use crate::text::Text;

/// Copies the text's UTF-8 bytes into a fresh buffer.
#[must_use]
pub fn encode_utf8(text: &Text) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Result of one builder `write` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// All output has been written.
    Done,
    /// The output buffer filled up. The next buffer must hold at least
    /// `min` bytes for the builder to make progress.
    NeedMore {
        /// Minimum capacity of the next buffer.
        min: usize,
    },
}

/// Resumable writer appending a text's UTF-8 bytes across buffer-full
/// boundaries.
///
/// ```
/// use textmodem::{BuildStep, Text, Utf8Builder};
///
/// let text = Text::from("chunked ☃");
/// let mut builder = Utf8Builder::new(&text);
/// let mut out = Vec::new();
/// let mut buf = [0u8; 4];
/// loop {
///     let (n, step) = builder.write(&mut buf);
///     out.extend_from_slice(&buf[..n]);
///     if step == BuildStep::Done {
///         break;
///     }
/// }
/// assert_eq!(out, text.as_bytes());
/// ```
#[derive(Debug)]
pub struct Utf8Builder<'t> {
    bytes: &'t [u8],
    pos: usize,
}

impl<'t> Utf8Builder<'t> {
    /// A builder over the bytes of `text`.
    #[must_use]
    pub fn new(text: &'t Text) -> Self {
        Utf8Builder {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    /// Writes as many pending bytes as fit into `out`, returning how many
    /// were written. Never overruns `out`.
    pub fn write(&mut self, out: &mut [u8]) -> (usize, BuildStep) {
        let n = core::cmp::min(self.bytes.len() - self.pos, out.len());
        out[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
        self.pos += n;
        if self.pos == self.bytes.len() {
            (n, BuildStep::Done)
        } else {
            (n, BuildStep::NeedMore { min: 1 })
        }
    }
}

/// A bounded serialiser for ASCII bytes, used by [`EscapedUtf8Builder`].
///
/// Implementations promise that `write` never writes more than `max_len()`
/// bytes; the builder in turn guarantees `out` has at least that much room
/// on every call.
pub trait EscapePrim {
    /// Upper bound on the output of a single [`write`](EscapePrim::write).
    /// Must be nonzero.
    fn max_len(&self) -> usize;

    /// Serialises one byte (`< 0x80`) into the front of `out`, returning
    /// how many bytes were written.
    fn write(&self, byte: u8, out: &mut [u8]) -> usize;
}

/// Resumable writer that passes every ASCII byte of a text through an
/// [`EscapePrim`] and copies multi-byte code points verbatim.
///
/// Each iteration needs at most `max(4, prim.max_len())` bytes of room; the
/// builder asks for exactly what the next pending item requires.
#[derive(Debug)]
pub struct EscapedUtf8Builder<'t, E> {
    bytes: &'t [u8],
    pos: usize,
    prim: E,
}

impl<'t, E: EscapePrim> EscapedUtf8Builder<'t, E> {
    /// A builder over the bytes of `text`, escaping through `prim`.
    ///
    /// # Panics
    ///
    /// Panics if `prim.max_len() == 0`: a primitive that can never write
    /// anything is a caller error.
    pub fn new(text: &'t Text, prim: E) -> Self {
        assert!(prim.max_len() > 0, "escape primitive with zero size bound");
        EscapedUtf8Builder {
            bytes: text.as_bytes(),
            pos: 0,
            prim,
        }
    }

    /// Writes as many pending items (escaped ASCII bytes or verbatim code
    /// points) as fit into `out`, returning how many bytes were written.
    /// Never overruns `out`.
    pub fn write(&mut self, out: &mut [u8]) -> (usize, BuildStep) {
        let mut written = 0;
        while self.pos < self.bytes.len() {
            let byte = self.bytes[self.pos];
            if byte < 0x80 {
                let need = self.prim.max_len();
                if out.len() - written < need {
                    return (written, BuildStep::NeedMore { min: need });
                }
                let n = self.prim.write(byte, &mut out[written..]);
                debug_assert!(n <= need);
                written += n;
                self.pos += 1;
            } else {
                // The text is well-formed, so the lead byte fixes the
                // length of the code point to copy verbatim.
                let need = utf8_sequence_len(byte);
                if out.len() - written < need {
                    return (written, BuildStep::NeedMore { min: need });
                }
                out[written..written + need]
                    .copy_from_slice(&self.bytes[self.pos..self.pos + need]);
                written += need;
                self.pos += need;
            }
        }
        (written, BuildStep::Done)
    }
}

/// Sequence length from a non-ASCII lead byte of well-formed UTF-8.
fn utf8_sequence_len(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
