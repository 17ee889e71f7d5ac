//! Element Store
//!
//! Owns the published set of detected elements and schedules re-parses.
//!
//! # Threading
//!
//! The store lives on the owner (UI) thread. `reparse_full_document` freezes
//! the text into a snapshot and hands it to a background worker, which runs
//! the detector and splitter for every catalog variant and sends the result
//! back over a channel tagged with its generation. The owner publishes it in
//! `poll` (or `wait_for_parse`) by swapping one `Arc`, so readers never see a
//! half-built set.
//!
//! Each new parse bumps the generation and raises the cancellation flag of
//! the previous one. The worker checks its flag between variants; results of
//! any generation but the current one are discarded at publish time.

use super::range_index::RangeIndex;
use crate::markdown::{detect, split, Element, SyntaxCatalog, SyntaxRule, SyntaxVariant};
use crate::string_utils::TextSnapshot;
use log::{debug, warn};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Literal that opens and closes fenced code blocks.
const CODE_FENCE: &str = "```";

// ─────────────────────────────────────────────────────────────────────────────
// Element Set
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable, published parse result with its range index.
#[derive(Debug, Clone, Default)]
pub struct ElementSet {
    generation: u64,
    elements: Vec<Element>,
    index: RangeIndex,
}

impl ElementSet {
    fn new(generation: u64, mut elements: Vec<Element>) -> Self {
        sort_elements(&mut elements);
        let index = RangeIndex::build(
            elements
                .iter()
                .enumerate()
                .map(|(i, e)| (e.ranges.all.clone(), i)),
        );
        Self {
            generation,
            elements,
            index,
        }
    }

    /// Generation of the parse that produced this set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All elements, ordered by start offset then catalog position.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements whose full range intersects `range`, in start order.
    pub fn intersecting(&self, range: &Range<usize>) -> Vec<&Element> {
        self.index
            .query(range)
            .into_iter()
            .map(|i| &self.elements[i])
            .collect()
    }
}

fn sort_elements(elements: &mut [Element]) {
    elements.sort_by(|a, b| {
        (a.ranges.all.start, a.variant.ordinal(), a.ranges.all.end).cmp(&(
            b.ranges.all.start,
            b.variant.ordinal(),
            b.ranges.all.end,
        ))
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Detect and split one variant. Malformed matches are logged and dropped.
fn parse_rule(
    snapshot: &TextSnapshot,
    rule: &SyntaxRule,
    within: Option<Range<usize>>,
    out: &mut Vec<Element>,
) {
    for span in detect(snapshot, rule, within) {
        match split(snapshot, span, rule) {
            Ok(ranges) => out.push(Element::new(
                snapshot.slice(&ranges.all),
                rule.variant(),
                ranges,
            )),
            Err(err) => debug!("Dropping element: {}", err),
        }
    }
}

/// Run every active catalog variant over the snapshot.
///
/// Returns `None` if `cancel` was raised before the pass finished.
pub fn parse_snapshot(
    catalog: &SyntaxCatalog,
    snapshot: &TextSnapshot,
    cancel: &AtomicBool,
) -> Option<Vec<Element>> {
    let mut elements = Vec::new();
    for rule in catalog.rules().filter(|r| r.is_active()) {
        if cancel.load(Ordering::Acquire) {
            return None;
        }
        parse_rule(snapshot, rule, None, &mut elements);
    }
    Some(elements)
}

/// Message from a worker back to the owner thread.
struct ParseOutcome {
    generation: u64,
    /// `None` when the parse was canceled
    elements: Option<Vec<Element>>,
}

struct InFlight {
    generation: u64,
    cancel: Arc<AtomicBool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Edits
// ─────────────────────────────────────────────────────────────────────────────

/// A text replacement, in character offsets of the text before the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Where the replacement starts
    pub start: usize,
    /// The text that was replaced
    pub removed: String,
    /// The text that replaced it
    pub inserted: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            removed: String::new(),
            inserted: text.into(),
        }
    }

    pub fn delete(at: usize, removed: impl Into<String>) -> Self {
        Self {
            start: at,
            removed: removed.into(),
            inserted: String::new(),
        }
    }

    fn removed_len(&self) -> usize {
        self.removed.chars().count()
    }

    fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }

    /// Change in document length.
    pub fn delta(&self) -> isize {
        self.inserted_len() as isize - self.removed_len() as isize
    }
}

/// Result of an incremental update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The published set was updated in place
    Applied { rescanned: Range<usize> },
    /// The edit cannot be handled incrementally; call `reparse_full_document`
    NeedsFullReparse,
}

// ─────────────────────────────────────────────────────────────────────────────
// Element Store
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a parse is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    Parsing,
}

/// Holds the published elements and the parse scheduling state.
pub struct ElementStore {
    catalog: Arc<SyntaxCatalog>,
    published: Arc<ElementSet>,
    generation: u64,
    in_flight: Option<InFlight>,
    sender: Sender<ParseOutcome>,
    receiver: Receiver<ParseOutcome>,
}

impl ElementStore {
    pub fn new(catalog: Arc<SyntaxCatalog>) -> Self {
        let (sender, receiver) = channel();
        Self {
            catalog,
            published: Arc::new(ElementSet::default()),
            generation: 0,
            in_flight: None,
            sender,
            receiver,
        }
    }

    pub fn catalog(&self) -> &Arc<SyntaxCatalog> {
        &self.catalog
    }

    /// Generation of the most recently requested parse.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> ParseState {
        if self.in_flight.is_some() {
            ParseState::Parsing
        } else {
            ParseState::Idle
        }
    }

    /// The published set, shareable with other threads.
    pub fn published(&self) -> Arc<ElementSet> {
        Arc::clone(&self.published)
    }

    /// Published elements intersecting `range`.
    pub fn elements_intersecting(&self, range: Range<usize>) -> Vec<&Element> {
        self.published.intersecting(&range)
    }

    /// Variants of the published elements enclosing `offset`, outermost
    /// first. The end offset counts as inside, matching cursor semantics.
    pub fn variants_at(&self, offset: usize) -> Vec<SyntaxVariant> {
        let mut variants: Vec<SyntaxVariant> = self
            .published
            .intersecting(&(offset.saturating_sub(1)..offset + 1))
            .into_iter()
            .filter(|e| e.ranges.touches(offset))
            .map(|e| e.variant)
            .collect();
        variants.dedup();
        variants
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Full Re-parse
    // ─────────────────────────────────────────────────────────────────────────

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!("Canceling parse generation {}", in_flight.generation);
            in_flight.cancel.store(true, Ordering::Release);
        }
    }

    fn publish(&mut self, generation: u64, elements: Vec<Element>) {
        let set = ElementSet::new(generation, elements);
        debug!(
            "Published generation {} with {} elements",
            generation,
            set.len()
        );
        self.published = Arc::new(set);
    }

    /// Start a background parse of `text`, canceling any parse in flight.
    ///
    /// Returns the generation of the new parse. The result becomes visible
    /// after `poll` or `wait_for_parse` observes it.
    pub fn reparse_full_document(&mut self, text: impl Into<Arc<str>>) -> u64 {
        self.cancel_in_flight();
        self.generation += 1;
        let generation = self.generation;

        let cancel = Arc::new(AtomicBool::new(false));
        let catalog = Arc::clone(&self.catalog);
        let sender = self.sender.clone();
        let worker_cancel = Arc::clone(&cancel);
        let text: Arc<str> = text.into();
        let worker_text = Arc::clone(&text);

        let spawned = thread::Builder::new()
            .name(format!("span-parse-{}", generation))
            .spawn(move || {
                let snapshot = TextSnapshot::new(worker_text);
                let elements = parse_snapshot(&catalog, &snapshot, &worker_cancel);
                // The owner may be gone; nothing to report to then.
                let _ = sender.send(ParseOutcome {
                    generation,
                    elements,
                });
            });

        match spawned {
            Ok(_) => {
                debug!("Started parse generation {}", generation);
                self.in_flight = Some(InFlight { generation, cancel });
            }
            Err(e) => {
                warn!("Failed to spawn parse worker, parsing inline: {}", e);
                let snapshot = TextSnapshot::new(text);
                if let Some(elements) = parse_snapshot(&self.catalog, &snapshot, &cancel) {
                    self.publish(generation, elements);
                }
            }
        }
        generation
    }

    /// Parse `text` on the calling thread and publish immediately.
    pub fn reparse_blocking(&mut self, text: &str) -> u64 {
        self.cancel_in_flight();
        self.generation += 1;
        let generation = self.generation;
        let snapshot = TextSnapshot::new(text);
        let never = AtomicBool::new(false);
        if let Some(elements) = parse_snapshot(&self.catalog, &snapshot, &never) {
            self.publish(generation, elements);
        }
        generation
    }

    /// Handle one worker message. Returns true if it was published.
    fn accept(&mut self, outcome: ParseOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                "Discarding stale parse generation {} (current {})",
                outcome.generation, self.generation
            );
            return false;
        }
        self.in_flight = None;
        match outcome.elements {
            Some(elements) => {
                self.publish(outcome.generation, elements);
                true
            }
            None => {
                debug!("Parse generation {} was canceled", outcome.generation);
                false
            }
        }
    }

    /// Publish any finished parse of the current generation without blocking.
    ///
    /// Returns true if a new set was published.
    pub fn poll(&mut self) -> bool {
        let mut published = false;
        while let Ok(outcome) = self.receiver.try_recv() {
            published |= self.accept(outcome);
        }
        published
    }

    /// Block until the current generation is published or `timeout` passes.
    ///
    /// Returns true if the store is idle with the current generation
    /// published when this returns.
    pub fn wait_for_parse(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.accept(outcome);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Incremental Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    fn modify(&mut self, f: impl FnOnce(&mut Vec<Element>)) {
        let generation = self.published.generation;
        let mut elements = self.published.elements.clone();
        f(&mut elements);
        self.published = Arc::new(ElementSet::new(generation, elements));
    }

    /// Insert an element. Ill-formed ranges are rejected.
    pub fn add(&mut self, element: Element) -> bool {
        if !element.ranges.is_well_formed() {
            debug!("Refusing to add ill-formed {} element", element.variant);
            return false;
        }
        self.modify(|elements| elements.push(element));
        true
    }

    /// Remove the element of `variant` whose full range is `all`.
    pub fn remove(&mut self, variant: SyntaxVariant, all: &Range<usize>) -> Option<Element> {
        let position = self
            .published
            .elements
            .iter()
            .position(|e| e.variant == variant && &e.ranges.all == all)?;
        let mut removed = None;
        self.modify(|elements| removed = Some(elements.remove(position)));
        removed
    }

    /// Move the element of `variant` at `all` by `delta` characters.
    pub fn update_range(&mut self, variant: SyntaxVariant, all: &Range<usize>, delta: isize) -> bool {
        let Some(position) = self
            .published
            .elements
            .iter()
            .position(|e| e.variant == variant && &e.ranges.all == all)
        else {
            return false;
        };
        let Some(ranges) = self.published.elements[position].ranges.shifted(delta) else {
            return false;
        };
        self.modify(|elements| elements[position].ranges = ranges);
        true
    }

    /// Update the published set for an edit that produced `new_text`.
    ///
    /// Elements before the edited lines are kept, elements after them are
    /// shifted, and the edited lines are re-detected. Code blocks that
    /// enclose the edit grow or shrink with it. Edits that touch a code
    /// fence, or arrive while a parse is in flight, need a full re-parse.
    pub fn apply_edit(&mut self, new_text: &str, edit: &TextEdit) -> EditOutcome {
        if self.in_flight.is_some()
            || edit.removed.contains('`')
            || edit.inserted.contains('`')
        {
            return EditOutcome::NeedsFullReparse;
        }

        let snapshot = TextSnapshot::new(new_text);
        let delta = edit.delta();
        let old_edit_end = edit.start + edit.removed_len();
        let new_edit_end = edit.start + edit.inserted_len();
        if new_edit_end > snapshot.char_len() {
            return EditOutcome::NeedsFullReparse;
        }

        let region_start = snapshot.line_start(edit.start);
        let region_end = snapshot.line_end(new_edit_end);
        let region = region_start..region_end;
        if snapshot.slice(&region).contains(CODE_FENCE) {
            return EditOutcome::NeedsFullReparse;
        }
        let old_region_end = (region_end as isize - delta) as usize;

        let mut kept = Vec::with_capacity(self.published.len());
        for element in self.published.elements.iter() {
            let all = &element.ranges.all;
            if all.end <= region_start {
                kept.push(element.clone());
            } else if all.start >= old_region_end {
                match element.ranges.shifted(delta) {
                    Some(ranges) => kept.push(Element {
                        ranges,
                        ..element.clone()
                    }),
                    None => return EditOutcome::NeedsFullReparse,
                }
            } else if element.variant == SyntaxVariant::CodeBlock {
                // Edit strictly inside the block body
                if element.ranges.content.start <= edit.start
                    && old_edit_end <= element.ranges.trailing.start
                {
                    let mut ranges = element.ranges.clone();
                    ranges.content.end = ranges.content.end.saturating_add_signed(delta);
                    ranges.trailing =
                        ranges.trailing.start.saturating_add_signed(delta)
                            ..ranges.trailing.end.saturating_add_signed(delta);
                    ranges.all.end = ranges.all.end.saturating_add_signed(delta);
                    kept.push(Element::new(snapshot.slice(&ranges.all), element.variant, ranges));
                } else {
                    return EditOutcome::NeedsFullReparse;
                }
            }
        }

        for rule in self
            .catalog
            .rules()
            .filter(|r| r.is_active() && r.variant() != SyntaxVariant::CodeBlock)
        {
            parse_rule(&snapshot, rule, Some(region.clone()), &mut kept);
        }

        let generation = self.published.generation;
        self.published = Arc::new(ElementSet::new(generation, kept));
        debug!(
            "Incremental update rescanned {}..{}",
            region.start, region.end
        );
        EditOutcome::Applied { rescanned: region }
    }
}

impl Drop for ElementStore {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

impl std::fmt::Debug for ElementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementStore")
            .field("generation", &self.generation)
            .field("state", &self.state())
            .field("published", &self.published.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
