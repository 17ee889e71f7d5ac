//! Detected elements and their sub-ranges.

use super::SyntaxVariant;
use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Ranges
// ─────────────────────────────────────────────────────────────────────────────

/// The four character ranges of one element, over the same text snapshot.
///
/// `leading.end <= content.start`, `content.end <= trailing.start`, and all
/// three lie inside `all`. Empty ranges are anchored at a real offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ranges {
    /// The full match
    pub all: Range<usize>,
    /// Opening marker
    pub leading: Range<usize>,
    /// Text with markers stripped
    pub content: Range<usize>,
    /// Closing marker
    pub trailing: Range<usize>,
}

impl Ranges {
    /// Check the ordering and containment invariants.
    pub fn is_well_formed(&self) -> bool {
        let inside = |r: &Range<usize>| {
            r.start <= r.end && self.all.start <= r.start && r.end <= self.all.end
        };
        inside(&self.leading)
            && inside(&self.content)
            && inside(&self.trailing)
            && self.leading.end <= self.content.start
            && self.content.end <= self.trailing.start
    }

    /// Shift every range by `delta` characters.
    ///
    /// Returns `None` if a range would move before offset 0.
    pub fn shifted(&self, delta: isize) -> Option<Ranges> {
        let shift = |r: &Range<usize>| -> Option<Range<usize>> {
            let start = r.start.checked_add_signed(delta)?;
            let end = r.end.checked_add_signed(delta)?;
            Some(start..end)
        };
        Some(Ranges {
            all: shift(&self.all)?,
            leading: shift(&self.leading)?,
            content: shift(&self.content)?,
            trailing: shift(&self.trailing)?,
        })
    }

    /// Whether `offset` lies within the element. The end offset counts, so a
    /// cursor placed right after a closing marker is still "in" the element.
    pub fn touches(&self, offset: usize) -> bool {
        self.all.start <= offset && offset <= self.all.end
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Element
// ─────────────────────────────────────────────────────────────────────────────

/// One detected occurrence of a syntax variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The matched text (`all`)
    pub text: String,
    pub variant: SyntaxVariant,
    pub ranges: Ranges,
}

impl Element {
    pub fn new(text: impl Into<String>, variant: SyntaxVariant, ranges: Ranges) -> Self {
        Self {
            text: text.into(),
            variant,
            ranges,
        }
    }

    /// Whether the element's full range intersects `range`.
    ///
    /// Half-open intervals; an empty query range intersects an element that
    /// strictly contains its offset.
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        let all = &self.ranges.all;
        if range.start == range.end {
            return all.start <= range.start && range.start < all.end;
        }
        all.start < range.end && range.start < all.end
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
