//! SIMD-accelerated markup scanning using memchr
//!
//! Uses memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! All delimiters searched for are ASCII, so every position returned is a
//! char boundary when the input is valid UTF-8.

use memchr::{memchr, memmem};

/// Scanner for markup delimiter detection
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.input.len()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip whitespace characters (space, tab, newline, carriage return, form feed)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && is_whitespace(self.input[self.pos]) {
            self.pos += 1;
        }
    }

    /// Find next '<' (tag start) using SIMD
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', &self.input[self.pos..]).map(|i| self.pos + i)
    }

    /// Find tag end while handling quotes properly
    /// Returns the position of '>' that is not inside quotes
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut pos = self.pos;
        let mut quote: Option<u8> = None;

        while pos < self.input.len() {
            match (self.input[pos], quote) {
                (b @ (b'"' | b'\''), None) => quote = Some(b),
                (b, Some(q)) if b == q => quote = None,
                (b'>', None) => return Some(pos),
                _ => {}
            }
            pos += 1;
        }
        None
    }

    /// Find next occurrence of a byte sequence
    #[inline]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(&self.input[self.pos..], needle).map(|i| self.pos + i)
    }

    /// Find next occurrence of an ASCII byte sequence, ignoring ASCII case
    ///
    /// Candidates are located with memchr on the first byte (both cases).
    pub fn find_ignore_ascii_case(&self, needle: &[u8]) -> Option<usize> {
        let (&first, rest) = needle.split_first()?;
        let (lower, upper) = (first.to_ascii_lowercase(), first.to_ascii_uppercase());
        let mut pos = self.pos;

        while let Some(i) = memchr::memchr2(lower, upper, &self.input[pos..]) {
            let start = pos + i;
            let end = start + needle.len();
            if end <= self.input.len() && self.input[start + 1..end].eq_ignore_ascii_case(rest) {
                return Some(start);
            }
            pos = start + 1;
        }
        None
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.pos..].starts_with(needle)
    }

    /// Read a tag or attribute name, stopping at whitespace, '/', '>', '=' or quotes
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        if !self.input.get(start).copied().is_some_and(is_name_start_char) {
            return None;
        }

        self.pos += 1;
        while self.pos < self.input.len() && is_name_char(self.input[self.pos]) {
            self.pos += 1;
        }

        Some(&self.input[start..self.pos])
    }
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

/// Tag names start with an ASCII letter (or non-ASCII); `<1` or `< ` is literal text
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

#[inline]
fn is_name_char(b: u8) -> bool {
    !is_whitespace(b) && !matches!(b, b'/' | b'>' | b'=' | b'"' | b'\'' | b'<')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_start() {
        let scanner = Scanner::new(b"hello <world>");
        assert_eq!(scanner.find_tag_start(), Some(6));
    }

    #[test]
    fn test_find_tag_end_quoted() {
        let scanner = Scanner::new(b"<a title=\">test\" data-x='>'>content");
        assert_eq!(scanner.find_tag_end_quoted(), Some(27));
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new(b"data-role=\"x\"");
        assert_eq!(scanner.read_name(), Some(b"data-role" as &[u8]));
        assert_eq!(scanner.position(), 9);
    }

    #[test]
    fn test_read_name_rejects_digit() {
        let mut scanner = Scanner::new(b"1 < 2");
        assert_eq!(scanner.read_name(), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_find_ignore_ascii_case() {
        let scanner = Scanner::new(b"var a = '</b>'; </SCRIPT>");
        assert_eq!(scanner.find_ignore_ascii_case(b"</script"), Some(16));
        assert_eq!(scanner.find_ignore_ascii_case(b"</style"), None);
    }

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = Scanner::new(b"  \t\n hello");
        scanner.skip_whitespace();
        assert_eq!(scanner.position(), 5);
    }
}
