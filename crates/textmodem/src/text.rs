//! The immutable text type produced by every decoder.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    str,
};

use crate::error::DecodeError;

/// An immutable sequence of Unicode scalar values, stored as well-formed
/// UTF-8 in a shared heap buffer.
///
/// `Text` is cheap to clone (the buffer is reference counted) and derefs to
/// `str`, so the whole `str` API is available on it:
///
/// ```
/// use textmodem::Text;
///
/// let t = Text::from("snow ☃");
/// let u = t.clone();
/// assert_eq!(t, "snow ☃");
/// assert!(u.ends_with('☃'));
/// ```
///
/// The invariant (the viewed byte range always decodes without error) is
/// established at construction and never rechecked.
#[derive(Clone)]
pub struct Text {
    buf: Arc<Vec<u8>>,
    off: usize,
    len: usize,
}

impl Text {
    /// The canonical empty text.
    #[must_use]
    pub fn new() -> Self {
        Text {
            buf: Arc::new(Vec::new()),
            off: 0,
            len: 0,
        }
    }

    /// Creates a `Text` viewing `len` bytes of `buf` starting at `off`,
    /// validating that the range is well-formed UTF-8.
    ///
    /// Several `Text` values may share one buffer this way without copying.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Malformed`] if the range contains an invalid byte,
    /// [`DecodeError::Incomplete`] if it ends inside a multi-byte code point.
    ///
    /// # Panics
    ///
    /// Panics if `off + len` is out of bounds of `buf`, like slicing would.
    pub fn from_shared(buf: Arc<Vec<u8>>, off: usize, len: usize) -> Result<Self, DecodeError> {
        let bytes = &buf[off..off + len];
        if let Err(e) = str::from_utf8(bytes) {
            let at = e.valid_up_to();
            return Err(match e.error_len() {
                Some(_) => DecodeError::Malformed {
                    reason: crate::policy::INVALID_UTF8,
                    byte: bytes[at],
                    pos: isize::try_from(at).unwrap_or(isize::MAX),
                },
                None => DecodeError::Incomplete {
                    reason: crate::policy::INCOMPLETE_UTF8,
                    bytes: bytes[at..].to_vec(),
                },
            });
        }
        Ok(Text { buf, off, len })
    }

    /// Wraps an owned buffer without validating it.
    ///
    /// # Safety
    ///
    /// `bytes` must be well-formed UTF-8.
    pub(crate) unsafe fn from_vec_unchecked(bytes: Vec<u8>) -> Self {
        debug_assert!(str::from_utf8(&bytes).is_ok());
        let len = bytes.len();
        Text {
            buf: Arc::new(bytes),
            off: 0,
            len,
        }
    }

    /// The text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: the construction invariant guarantees the range is
        // well-formed UTF-8.
        unsafe { str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// The UTF-8 bytes of the text.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.off..self.off + self.len]
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates the scalar values of the text.
    pub fn chars(&self) -> str::Chars<'_> {
        self.as_str().chars()
    }
}

impl Default for Text {
    fn default() -> Self {
        Text::new()
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        // SAFETY: `s` is UTF-8 by type.
        unsafe { Text::from_vec_unchecked(s.as_bytes().to_vec()) }
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        // SAFETY: `s` is UTF-8 by type; the buffer is moved, not copied.
        unsafe { Text::from_vec_unchecked(s.into_bytes()) }
    }
}

impl From<char> for Text {
    fn from(c: char) -> Self {
        let mut buf = [0u8; 4];
        Text::from(&*c.encode_utf8(&mut buf))
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Text {}

impl PartialOrd for Text {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Text {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for Text {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

// Comparisons against string types so tests and callers can write
// `text == "..."` in either direction.
macro_rules! impl_str_eq {
    ($($ty:ty),*) => {
        $(
            impl PartialEq<$ty> for Text {
                fn eq(&self, other: &$ty) -> bool {
                    self.as_str() == &other[..]
                }
            }

            impl PartialEq<Text> for $ty {
                fn eq(&self, other: &Text) -> bool {
                    &self[..] == other.as_str()
                }
            }
        )*
    };
}

impl_str_eq!(str, &str, String);

#[cfg(feature = "serde")]
impl serde::Serialize for Text {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Text {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Text::from(s))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn empty_text_is_canonical() {
        let t = Text::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert_eq!(t, "");
        assert_eq!(t, Text::default());
    }

    #[test]
    fn from_shared_validates_the_viewed_range() {
        let buf = Arc::new(vec![b'a', 0xFF, b'b', b'c']);
        // The full buffer is invalid...
        assert!(matches!(
            Text::from_shared(buf.clone(), 0, 4),
            Err(DecodeError::Malformed { byte: 0xFF, pos: 1, .. })
        ));
        // ...but a sub-range avoiding the bad byte is fine, without a copy.
        let t = Text::from_shared(buf.clone(), 2, 2).unwrap();
        assert_eq!(t, "bc");
        assert!(Arc::ptr_eq(&t.buf, &buf));
    }

    #[test]
    fn from_shared_reports_truncated_tails_as_incomplete() {
        let buf = Arc::new(vec![b'a', 0xE2, 0x98]);
        assert!(matches!(
            Text::from_shared(buf, 0, 3),
            Err(DecodeError::Incomplete { ref bytes, .. }) if bytes == &[0xE2, 0x98]
        ));
    }

    #[test]
    fn clones_share_the_buffer() {
        let t = Text::from("shared");
        let u = t.clone();
        assert!(Arc::ptr_eq(&t.buf, &u.buf));
        assert_eq!(t, u);
    }

    #[test]
    fn string_conversions_round_trip() {
        let t = Text::from(String::from("héllo"));
        assert_eq!(t, "héllo");
        assert_eq!(t.chars().count(), 5);
        assert_eq!(Text::from('☃'), "☃");
    }
}
