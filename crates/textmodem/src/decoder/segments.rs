//! The segment stack: validated output waiting to be coalesced.
//!
//! Decoding a stream produces output in dribs and drabs: a validated range
//! of the current chunk here, a couple of carried bytes there, the odd
//! replacement character. The stack records each piece without copying it,
//! and [`SegmentStack::materialise`] assembles all of them into one
//! contiguous [`Text`] with a single allocation and a single copy per byte.
//!
//! Segments are never mutated after being pushed. Individual segments need
//! not be well-formed UTF-8 on their own (a code point that straddled a
//! chunk boundary arrives as a carry segment followed by a byte-range
//! segment) but their concatenation in push order must be, which is why the
//! raw-byte pushes are `unsafe`.

use alloc::vec::Vec;

use crate::text::Text;

/// One validated piece of pending output.
#[derive(Debug, Clone)]
enum Segment<'a> {
    /// Already-decoded text.
    Text(Text),
    /// A validated range borrowed from an input chunk.
    Bytes(&'a [u8]),
    /// Up to four bytes stored inline: a replacement scalar or the
    /// completed bytes of a carry, neither of which should allocate.
    Inline { buf: [u8; 4], len: u8 },
}

impl Segment<'_> {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Segment::Text(t) => t.as_bytes(),
            Segment::Bytes(b) => b,
            Segment::Inline { buf, len } => &buf[..usize::from(*len)],
        }
    }
}

/// Append-only accumulator of validated segments.
///
/// The stack borrows pushed byte ranges until [`materialise`] copies them
/// out, so input chunks must stay live for the lifetime `'a`.
///
/// [`materialise`]: SegmentStack::materialise
#[derive(Debug, Default)]
pub struct SegmentStack<'a> {
    items: Vec<Segment<'a>>,
    total: usize,
}

impl<'a> SegmentStack<'a> {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        SegmentStack::default()
    }

    /// Total byte length of everything pushed so far; exactly the length of
    /// the text [`materialise`](SegmentStack::materialise) will produce.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.total
    }

    /// Pushes already-decoded text. A no-op for empty text.
    pub fn push_text(&mut self, text: Text) {
        if text.is_empty() {
            return;
        }
        self.total += text.len();
        self.items.push(Segment::Text(text));
    }

    /// Pushes one scalar value (at most four bytes, stored inline).
    pub fn push_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let len = c.encode_utf8(&mut buf).len() as u8;
        self.total += usize::from(len);
        self.items.push(Segment::Inline { buf, len });
    }

    /// Pushes a validated byte range borrowed from an input chunk. A no-op
    /// for an empty range.
    ///
    /// # Safety
    ///
    /// The bytes of all raw pushes (`push_bytes` and [`push_inline`]) must,
    /// concatenated with every other segment in push order, form well-formed
    /// UTF-8 by the time [`materialise`] is called. The decoders uphold this
    /// by pushing only ranges the validator accepted.
    ///
    /// [`push_inline`]: SegmentStack::push_inline
    /// [`materialise`]: SegmentStack::materialise
    pub unsafe fn push_bytes(&mut self, bytes: &'a [u8]) {
        if bytes.is_empty() {
            return;
        }
        self.total += bytes.len();
        self.items.push(Segment::Bytes(bytes));
    }

    /// Pushes up to four bytes by value, used for the bytes of a completed
    /// carry, which do not outlive the current call. A no-op when empty.
    ///
    /// # Safety
    ///
    /// Same contract as [`push_bytes`](SegmentStack::push_bytes).
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than four bytes.
    pub unsafe fn push_inline(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        assert!(bytes.len() <= 4);
        let mut buf = [0u8; 4];
        buf[..bytes.len()].copy_from_slice(bytes);
        self.total += bytes.len();
        self.items.push(Segment::Inline {
            buf,
            len: bytes.len() as u8,
        });
    }

    /// Coalesces the stack into one contiguous [`Text`].
    ///
    /// Allocates exactly [`total_bytes`](SegmentStack::total_bytes) and
    /// fills it from the end backwards, one segment at a time. An empty
    /// stack yields the canonical empty text.
    #[must_use]
    pub fn materialise(self) -> Text {
        if self.items.is_empty() {
            return Text::new();
        }
        let mut out = alloc::vec![0u8; self.total];
        let mut end = self.total;
        for seg in self.items.iter().rev() {
            let bytes = seg.as_bytes();
            end -= bytes.len();
            out[end..end + bytes.len()].copy_from_slice(bytes);
        }
        debug_assert_eq!(end, 0);
        // SAFETY: push order is preserved by the backwards fill, and the
        // push contracts guarantee the concatenation is well-formed UTF-8.
        unsafe { Text::from_vec_unchecked(out) }
    }
}
