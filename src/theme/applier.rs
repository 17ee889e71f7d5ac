//! Style Applier
//!
//! Turns detected elements into attribute runs and writes them to a host
//! buffer in a single call. Attributes for the whole restyled range are
//! staged first, starting from the theme's base attributes, so an aborted
//! pass leaves the buffer as it was and repeated passes give the same result.

use super::{StyleTheme, TextAttributes};
use crate::markdown::{Element, SyntaxCatalog};
use log::debug;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Buffer Seam
// ─────────────────────────────────────────────────────────────────────────────

/// Attributes applied to a character range.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRun {
    pub range: Range<usize>,
    pub attributes: TextAttributes,
}

/// A text buffer that can carry per-character attributes.
pub trait StyledBuffer {
    /// Length in characters.
    fn len_chars(&self) -> usize;

    /// Replace the attributes of `range` with `runs`.
    ///
    /// The runs are contiguous, ordered, and cover `range` exactly.
    fn apply_runs(&mut self, range: Range<usize>, runs: &[StyleRun]);
}

/// In-memory text with one attribute set per character.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedText {
    text: String,
    attributes: Vec<TextAttributes>,
}

impl AttributedText {
    pub fn new(text: impl Into<String>, base: TextAttributes) -> Self {
        let text = text.into();
        let attributes = vec![base; text.chars().count()];
        Self { text, attributes }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, resetting every character to `base`.
    pub fn set_text(&mut self, text: impl Into<String>, base: TextAttributes) {
        *self = Self::new(text, base);
    }

    pub fn attributes_at(&self, offset: usize) -> Option<&TextAttributes> {
        self.attributes.get(offset)
    }

    /// The attributes as coalesced runs.
    pub fn runs(&self) -> Vec<StyleRun> {
        coalesce(0, &self.attributes)
    }
}

impl StyledBuffer for AttributedText {
    fn len_chars(&self) -> usize {
        self.attributes.len()
    }

    fn apply_runs(&mut self, range: Range<usize>, runs: &[StyleRun]) {
        let end = range.end.min(self.attributes.len());
        for run in runs {
            let start = run.range.start.max(range.start);
            let stop = run.range.end.min(end);
            for slot in self.attributes.iter_mut().take(stop).skip(start) {
                *slot = run.attributes;
            }
        }
    }
}

/// Merge equal neighbours into runs. `offset` is the position of `attrs[0]`.
fn coalesce(offset: usize, attrs: &[TextAttributes]) -> Vec<StyleRun> {
    let mut runs: Vec<StyleRun> = Vec::new();
    for (i, attributes) in attrs.iter().enumerate() {
        let at = offset + i;
        match runs.last_mut() {
            Some(run) if run.attributes == *attributes => run.range.end = at + 1,
            _ => runs.push(StyleRun {
                range: at..at + 1,
                attributes: *attributes,
            }),
        }
    }
    runs
}

// ─────────────────────────────────────────────────────────────────────────────
// Style Applier
// ─────────────────────────────────────────────────────────────────────────────

/// Applies a `StyleTheme` to elements.
#[derive(Debug, Clone)]
pub struct StyleApplier {
    catalog: Arc<SyntaxCatalog>,
    theme: StyleTheme,
}

impl StyleApplier {
    pub fn new(catalog: Arc<SyntaxCatalog>, theme: StyleTheme) -> Self {
        Self { catalog, theme }
    }

    pub fn theme(&self) -> &StyleTheme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: StyleTheme) {
        self.theme = theme;
    }

    /// Restyle the whole buffer.
    pub fn restyle<B: StyledBuffer + ?Sized>(&self, elements: &[Element], buffer: &mut B) {
        let range = 0..buffer.len_chars();
        let never = AtomicBool::new(false);
        self.restyle_cancellable(elements, range, buffer, &never);
    }

    /// Restyle `range` only, e.g. the lines an incremental update rescanned.
    pub fn restyle_range<B: StyledBuffer + ?Sized>(
        &self,
        elements: &[Element],
        range: Range<usize>,
        buffer: &mut B,
    ) {
        let never = AtomicBool::new(false);
        self.restyle_cancellable(elements, range, buffer, &never);
    }

    /// Stage the attributes for `range` and commit them unless `cancel` is
    /// raised first. Returns true if the buffer was written.
    pub fn restyle_cancellable<B: StyledBuffer + ?Sized>(
        &self,
        elements: &[Element],
        range: Range<usize>,
        buffer: &mut B,
        cancel: &AtomicBool,
    ) -> bool {
        let len = buffer.len_chars();
        let range = range.start.min(len)..range.end.min(len);
        let staged = match self.stage(elements, &range, cancel) {
            Some(staged) => staged,
            None => {
                debug!("Restyle of {}..{} canceled", range.start, range.end);
                return false;
            }
        };
        let runs = coalesce(range.start, &staged);

        if cancel.load(Ordering::Acquire) {
            debug!("Restyle of {}..{} canceled", range.start, range.end);
            return false;
        }
        buffer.apply_runs(range, &runs);
        true
    }

    fn stage(
        &self,
        elements: &[Element],
        range: &Range<usize>,
        cancel: &AtomicBool,
    ) -> Option<Vec<TextAttributes>> {
        let mut staged = vec![self.theme.base_attributes(); range.len()];

        // Catalog order decides conflicts: later variants overwrite earlier.
        let mut ordered: Vec<&Element> = elements
            .iter()
            .filter(|e| e.ranges.all.start < range.end && range.start < e.ranges.all.end)
            .collect();
        ordered.sort_by_key(|e| (self.catalog.position(e.variant), e.ranges.all.start));

        for element in ordered {
            if cancel.load(Ordering::Acquire) {
                return None;
            }
            let rule = self.catalog.lookup(element.variant);
            let content = self.theme.content_attributes(rule);
            let marker = self.theme.marker_attributes(rule);
            let ranges = &element.ranges;
            for (span, attrs) in [
                (&ranges.leading, &marker),
                (&ranges.content, &content),
                (&ranges.trailing, &marker),
            ] {
                let start = span.start.max(range.start);
                let end = span.end.min(range.end);
                for offset in start..end {
                    let slot = &mut staged[offset - range.start];
                    *slot = slot.merge(attrs);
                }
            }
        }
        Some(staged)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
