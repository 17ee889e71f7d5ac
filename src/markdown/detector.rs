//! Span Detector
//!
//! Runs one variant's pattern over a text snapshot and reports the raw match
//! spans as character ranges, left to right and non-overlapping.

use super::SyntaxRule;
use crate::string_utils::TextSnapshot;
use std::ops::Range;

/// Detect all matches of `rule` in the snapshot.
///
/// With `within`, only matches whose span starts inside that character range
/// are reported, but anchors (`^`, `$`) and the characters around a span
/// still see the whole text, so a sub-range scan reports the same spans a
/// full scan would for that region.
///
/// A rule with a guard character (`not_after`) rejects a match that starts
/// right after that character, unless the character closed the previous
/// match. `**a****b**` is two bold spans, while `***b***` holds no bold.
/// After a rejection the scan resumes one character into the rejected span.
///
/// A rule without a compiled pattern (disabled or failed to compile) yields
/// no matches.
pub fn detect(
    snapshot: &TextSnapshot,
    rule: &SyntaxRule,
    within: Option<Range<usize>>,
) -> Vec<Range<usize>> {
    let Some(regex) = rule.regex() else {
        return Vec::new();
    };

    let text = snapshot.as_str();
    let (start_byte, end_byte) = match within {
        Some(range) => (snapshot.byte_offset(range.start), snapshot.byte_offset(range.end)),
        None => (0, text.len()),
    };

    let group = rule.span_group();
    let not_after = rule.not_after();

    // Capture-group and guarded patterns depend on what precedes the span on
    // its line, so a sub-range scan replays the line from its start.
    let search_from = if (group > 0 || not_after.is_some()) && start_byte > 0 {
        text[..start_byte].rfind('\n').map_or(0, |i| i + 1)
    } else {
        start_byte
    };

    let mut spans = Vec::new();
    let mut pos = search_from;
    let mut last_end: Option<usize> = None;

    while pos <= text.len() {
        let Some(caps) = regex.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if whole.start() >= end_byte {
            break;
        }

        if let Some(span) = caps.get(group) {
            let guarded = not_after.is_some_and(|guard| {
                last_end != Some(span.start())
                    && text[..span.start()].chars().next_back() == Some(guard)
            });
            if guarded {
                match step_char(text, span.start()) {
                    Some(next) => {
                        pos = next;
                        continue;
                    }
                    None => break,
                }
            }

            if !span.is_empty() && span.start() >= start_byte && span.start() < end_byte {
                spans.push(snapshot.char_range(span.start()..span.end()));
            }
            last_end = Some(span.end());
        }

        pos = if whole.end() > whole.start() {
            whole.end()
        } else {
            // Step over one character after an empty match
            match step_char(text, whole.end()) {
                Some(next) => next,
                None => break,
            }
        };
    }

    spans
}

/// Byte offset of the character after the one at `at`.
fn step_char(text: &str, at: usize) -> Option<usize> {
    text[at..].chars().next().map(|c| at + c.len_utf8())
}

/// Convenience wrapper that freezes `text` and scans all of it.
pub fn detect_in(text: &str, rule: &SyntaxRule) -> Vec<Range<usize>> {
    detect(&TextSnapshot::new(text), rule, None)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{SyntaxCatalog, SyntaxVariant, VariantSpec};

    fn spans(text: &str, variant: SyntaxVariant) -> Vec<Range<usize>> {
        let catalog = SyntaxCatalog::new();
        detect_in(text, catalog.lookup(variant))
    }

    #[test]
    fn test_bold() {
        assert_eq!(spans("Hello, **world**!", SyntaxVariant::Bold), vec![7..16]);
        assert_eq!(
            spans("**a** and **b**", SyntaxVariant::Bold),
            vec![0..5, 10..15]
        );
    }

    #[test]
    fn test_bold_not_inside_bold_italic() {
        assert!(spans("***both***", SyntaxVariant::Bold).is_empty());
        assert_eq!(spans("***both***", SyntaxVariant::BoldItalic), vec![0..10]);
    }

    #[test]
    fn test_italic_is_not_bold() {
        assert!(spans("**bold**", SyntaxVariant::Italic).is_empty());
        assert_eq!(spans("*a* *b*", SyntaxVariant::Italic), vec![0..3, 4..7]);
    }

    #[test]
    fn test_adjacent_links() {
        assert_eq!(spans("[a](b)[c](d)", SyntaxVariant::Link), vec![0..6, 6..12]);
    }

    #[test]
    fn test_link_right_after_image() {
        let text = "![i](x)[a](b)";
        assert_eq!(spans(text, SyntaxVariant::Link), vec![7..13]);
        assert_eq!(spans(text, SyntaxVariant::Image), vec![0..7]);
    }

    #[test]
    fn test_adjacent_emphasis() {
        assert_eq!(spans("**a****b**", SyntaxVariant::Bold), vec![0..5, 5..10]);
        assert_eq!(spans("*a**b*", SyntaxVariant::Italic), vec![0..3, 3..6]);
    }

    #[test]
    fn test_emphasis_at_line_start_after_match() {
        assert_eq!(spans("**a**\n**b**", SyntaxVariant::Bold), vec![0..5, 6..11]);
        assert_eq!(spans("*a*\n*b*", SyntaxVariant::Italic), vec![0..3, 4..7]);
    }

    #[test]
    fn test_sub_range_sees_previous_match_on_line() {
        let catalog = SyntaxCatalog::new();
        let snapshot = TextSnapshot::new("**a****b**");
        let rule = catalog.lookup(SyntaxVariant::Bold);
        assert_eq!(detect(&snapshot, rule, Some(5..10)), vec![5..10]);
    }

    #[test]
    fn test_headings_by_level() {
        let text = "# One\n## Two\n#NoSpace\n### Three";
        assert_eq!(spans(text, SyntaxVariant::Heading(1)), vec![0..5]);
        assert_eq!(spans(text, SyntaxVariant::Heading(2)), vec![6..12]);
        assert_eq!(spans(text, SyntaxVariant::Heading(3)), vec![22..31]);
    }

    #[test]
    fn test_link_and_image() {
        let text = "see [docs](http://x) and ![logo](a.png)";
        assert_eq!(spans(text, SyntaxVariant::Link), vec![4..20]);
        assert_eq!(spans(text, SyntaxVariant::Image), vec![25..39]);
    }

    #[test]
    fn test_code_block_spans_lines() {
        let text = "intro\n```rust\nlet x = 1;\n```\nafter";
        assert_eq!(spans(text, SyntaxVariant::CodeBlock), vec![6..28]);
    }

    #[test]
    fn test_list_and_quote_and_rule() {
        let text = "- item\n  * nested\n> quote\n---";
        assert_eq!(spans(text, SyntaxVariant::List), vec![0..6, 9..17]);
        assert_eq!(spans(text, SyntaxVariant::QuoteBlock), vec![18..25]);
        assert_eq!(spans(text, SyntaxVariant::HorizontalRule), vec![26..29]);
    }

    #[test]
    fn test_offsets_are_characters() {
        // 'å' and '你' are multi-byte
        assert_eq!(spans("på **你好**", SyntaxVariant::Bold), vec![3..9]);
    }

    #[test]
    fn test_sub_range_scan() {
        let catalog = SyntaxCatalog::new();
        let snapshot = TextSnapshot::new("**a** **b** **c**");
        let rule = catalog.lookup(SyntaxVariant::Bold);
        assert_eq!(detect(&snapshot, rule, Some(6..12)), vec![6..11]);
        assert_eq!(detect(&snapshot, rule, None).len(), 3);
    }

    #[test]
    fn test_sub_range_keeps_line_anchors() {
        let catalog = SyntaxCatalog::new();
        let snapshot = TextSnapshot::new("x # not\n# yes");
        let rule = catalog.lookup(SyntaxVariant::Heading(1));
        assert!(detect(&snapshot, rule, Some(2..7)).is_empty());
        assert_eq!(detect(&snapshot, rule, Some(8..13)), vec![8..13]);
    }

    #[test]
    fn test_uncompiled_pattern_yields_nothing() {
        let broken = VariantSpec {
            pattern: "[".to_string(),
            ..VariantSpec::builtin(SyntaxVariant::Bold)
        };
        let catalog = SyntaxCatalog::with_overrides(vec![broken]);
        assert!(detect_in("**x**", catalog.lookup(SyntaxVariant::Bold)).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "# T\n**a** *b* `c` ~~d~~ ==e==";
        for variant in SyntaxVariant::ALL {
            assert_eq!(spans(text, variant), spans(text, variant));
        }
    }
}
