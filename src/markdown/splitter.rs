//! Range Splitter
//!
//! Cuts a raw match span into leading marker, content and trailing marker
//! according to the variant's boundary kind.

use super::{BoundaryKind, Ranges, SyntaxRule};
use crate::error::SpanError;
use crate::string_utils::TextSnapshot;
use std::ops::Range;

/// Split a match into its sub-ranges.
///
/// - `EnclosedSymmetrical`: strip the marker counts from both ends.
/// - `EnclosedAsymmetrical`: one structural opening character; the syntax on
///   the right is part of the content, the trailing range is empty at the end.
/// - `LeadingOnly`: strip the marker from the start. The whitespace between
///   the marker and the text belongs to neither range, so `# Title` has
///   leading `[0,1)` and content `[2,7)`.
/// - `None`: the whole match is marker.
///
/// # Errors
///
/// `SpanError::MalformedSpan` when the match lies outside the text or is
/// shorter than its markers. Callers drop such matches.
pub fn split(
    snapshot: &TextSnapshot,
    matched: Range<usize>,
    rule: &SyntaxRule,
) -> Result<Ranges, SpanError> {
    let malformed = || SpanError::MalformedSpan {
        variant: rule.variant().name().to_string(),
        range: matched.clone(),
    };

    if matched.start > matched.end || matched.end > snapshot.char_len() {
        return Err(malformed());
    }

    let (start, end) = (matched.start, matched.end);
    let len = end - start;

    let ranges = match rule.boundary() {
        BoundaryKind::EnclosedSymmetrical => {
            let (lead, trail) = (rule.leading_count(), rule.trailing_count());
            if lead + trail > len {
                return Err(malformed());
            }
            Ranges {
                all: start..end,
                leading: start..start + lead,
                content: start + lead..end - trail,
                trailing: end - trail..end,
            }
        }
        BoundaryKind::EnclosedAsymmetrical => {
            if len < 1 {
                return Err(malformed());
            }
            Ranges {
                all: start..end,
                leading: start..start + 1,
                content: start + 1..end,
                trailing: end..end,
            }
        }
        BoundaryKind::LeadingOnly => {
            let lead = rule.leading_count();
            if lead > len {
                return Err(malformed());
            }
            let mut content_start = start + lead;
            while content_start < end
                && matches!(snapshot.char_at(content_start), Some(' ') | Some('\t'))
            {
                content_start += 1;
            }
            Ranges {
                all: start..end,
                leading: start..start + lead,
                content: content_start..end,
                trailing: end..end,
            }
        }
        BoundaryKind::None => Ranges {
            all: start..end,
            leading: start..end,
            content: end..end,
            trailing: end..end,
        },
    };

    if ranges.is_well_formed() {
        Ok(ranges)
    } else {
        Err(malformed())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{SyntaxCatalog, SyntaxVariant};

    fn split_text(text: &str, range: Range<usize>, variant: SyntaxVariant) -> Option<Ranges> {
        let catalog = SyntaxCatalog::new();
        split(&TextSnapshot::new(text), range, catalog.lookup(variant)).ok()
    }

    #[test]
    fn test_symmetrical() {
        let ranges = split_text("Hello, **world**!", 7..16, SyntaxVariant::Bold).unwrap();
        assert_eq!(ranges.leading, 7..9);
        assert_eq!(ranges.content, 9..14);
        assert_eq!(ranges.trailing, 14..16);
    }

    #[test]
    fn test_heading_excludes_separator() {
        let ranges = split_text("# Title", 0..7, SyntaxVariant::Heading(1)).unwrap();
        assert_eq!(ranges.leading, 0..1);
        assert_eq!(ranges.content, 2..7);
        assert!(ranges.trailing.is_empty());
    }

    #[test]
    fn test_heading_level_three() {
        let ranges = split_text("###   Deep", 0..10, SyntaxVariant::Heading(3)).unwrap();
        assert_eq!(ranges.leading, 0..3);
        assert_eq!(ranges.content, 6..10);
    }

    #[test]
    fn test_asymmetrical_link() {
        let ranges = split_text("[a](b)", 0..6, SyntaxVariant::Link).unwrap();
        assert_eq!(ranges.leading, 0..1);
        assert_eq!(ranges.content, 1..6);
        assert_eq!(ranges.trailing, 6..6);
    }

    #[test]
    fn test_none_is_all_marker() {
        let ranges = split_text("---", 0..3, SyntaxVariant::HorizontalRule).unwrap();
        assert_eq!(ranges.leading, 0..3);
        assert!(ranges.content.is_empty());
        assert!(ranges.trailing.is_empty());
    }

    #[test]
    fn test_too_short_match_is_malformed() {
        assert!(split_text("***", 0..3, SyntaxVariant::Bold).is_none());
        assert!(split_text("#", 0..0, SyntaxVariant::Heading(1)).is_none());
        assert!(split_text("", 0..0, SyntaxVariant::Link).is_none());
    }

    #[test]
    fn test_out_of_text_is_malformed() {
        let catalog = SyntaxCatalog::new();
        let err = split(
            &TextSnapshot::new("**a**"),
            0..9,
            catalog.lookup(SyntaxVariant::Bold),
        )
        .unwrap_err();
        assert!(matches!(err, SpanError::MalformedSpan { range, .. } if range == (0..9)));
    }

    #[test]
    fn test_exact_marker_length_has_empty_content() {
        let ranges = split_text("****", 0..4, SyntaxVariant::Bold).unwrap();
        assert_eq!(ranges.content, 2..2);
    }
}
