//! Character Offset Utilities
//!
//! The engine addresses text by character offsets so that element ranges are
//! independent of any particular string encoding. Rust strings are UTF-8 and
//! the regex engine reports byte offsets, so every boundary between the two
//! goes through this module.
//!
//! # Problem
//! Characters like `ø`, `æ`, `å`, `中`, `🎉` are multi-byte in UTF-8. A byte
//! offset from a regex match is not the offset a host text view expects, and
//! slicing with a character offset used as a byte offset panics or silently
//! picks the wrong text.
//!
//! # Solution
//! `TextSnapshot` freezes a text together with a character-to-byte table so
//! conversions in both directions are O(1) / O(log n). The free functions
//! handle one-off conversions on a mutable `String`.

use std::ops::Range;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters in `s`.
#[inline]
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Convert a character range to a byte range.
pub fn char_range_to_byte_range(s: &str, range: &Range<usize>) -> Range<usize> {
    char_index_to_byte_index(s, range.start)..char_index_to_byte_index(s, range.end)
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable view of the document text, shareable across threads.
///
/// Background parses read a snapshot, never the live buffer.
#[derive(Debug, Clone)]
pub struct TextSnapshot {
    text: Arc<str>,
    /// Byte offset of every character, plus the total byte length at the end
    char_starts: Vec<usize>,
}

impl TextSnapshot {
    /// Freeze `text` into a snapshot.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let mut char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        char_starts.push(text.len());
        Self { text, char_starts }
    }

    /// The full text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.char_starts.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of a character offset, clamped to the text length.
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        self.char_starts[char_offset.min(self.char_len())]
    }

    /// Character offset of a byte offset. Mid-character offsets round down.
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        match self.char_starts.binary_search(&byte_offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Convert a byte range (e.g. a regex match) to a character range.
    pub fn char_range(&self, bytes: Range<usize>) -> Range<usize> {
        self.char_offset(bytes.start)..self.char_offset(bytes.end)
    }

    /// Slice by character range. Out-of-range offsets are clamped.
    pub fn slice(&self, chars: &Range<usize>) -> &str {
        let start = self.byte_offset(chars.start);
        let end = self.byte_offset(chars.end).max(start);
        &self.text[start..end]
    }

    /// Character at a character offset.
    pub fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.char_len() {
            return None;
        }
        self.text[self.char_starts[char_offset]..].chars().next()
    }

    /// Character offset of the start of the line containing `char_offset`.
    pub fn line_start(&self, char_offset: usize) -> usize {
        let byte = self.byte_offset(char_offset);
        self.text[..byte]
            .rfind('\n')
            .map(|i| self.char_offset(i + 1))
            .unwrap_or(0)
    }

    /// Character offset of the end of the line containing `char_offset`
    /// (the position of the newline, or the text end).
    pub fn line_end(&self, char_offset: usize) -> usize {
        let byte = self.byte_offset(char_offset);
        self.text[byte..]
            .find('\n')
            .map(|i| self.char_offset(byte + i))
            .unwrap_or_else(|| self.char_len())
    }
}

impl From<&str> for TextSnapshot {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextSnapshot {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index() {
        let s = "Hello 你好 World";
        assert_eq!(char_index_to_byte_index(s, 6), 6);
        assert_eq!(char_index_to_byte_index(s, 7), 9);
        assert_eq!(char_index_to_byte_index(s, 999), s.len());
    }

    #[test]
    fn test_char_range_to_byte_range() {
        let s = "Party 🎉 time";
        assert_eq!(char_range_to_byte_range(s, &(6..7)), 6..10);
    }

    #[test]
    fn test_snapshot_offsets() {
        let snap = TextSnapshot::new("på **deg**");
        assert_eq!(snap.char_len(), 10);
        assert_eq!(snap.byte_offset(2), 3);
        assert_eq!(snap.char_offset(3), 2);
        assert_eq!(snap.char_offset(2), 1); // mid-character rounds down
        assert_eq!(snap.char_range(3..11), 2..10);
        assert_eq!(snap.slice(&(3..10)), "**deg**");
        assert_eq!(snap.char_at(1), Some('å'));
        assert_eq!(snap.char_at(10), None);
    }

    #[test]
    fn test_snapshot_lines() {
        let snap = TextSnapshot::new("ab\ncdé\nf");
        assert_eq!(snap.line_start(4), 3);
        assert_eq!(snap.line_end(4), 6);
        assert_eq!(snap.line_start(0), 0);
        assert_eq!(snap.line_end(7), 8);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = TextSnapshot::new("");
        assert!(snap.is_empty());
        assert_eq!(snap.char_len(), 0);
        assert_eq!(snap.slice(&(0..5)), "");
    }
}
