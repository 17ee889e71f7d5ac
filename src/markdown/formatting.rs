//! Wrap / Unwrap Formatting
//!
//! The editing primitive behind formatting shortcuts: insert a variant's
//! markers around a selection, or remove them again.
//!
//! All offsets are character offsets into the buffer.
//!
//! # Usage
//! ```ignore
//! use ferrite_spans::markdown::{SyntaxCatalog, SyntaxVariant, WrapAction, WrapEditor};
//!
//! let editor = WrapEditor::new(Arc::new(SyntaxCatalog::new()));
//! let mut text = String::from("Hello, world!");
//! let selection = editor.toggle_wrap(WrapAction::Wrap, SyntaxVariant::Bold, 0..5, &mut text)?;
//! assert_eq!(text, "**Hello**, world!");
//! assert_eq!(selection, 2..7);
//! ```

use super::{SyntaxCatalog, SyntaxRule, SyntaxVariant};
use crate::config::Settings;
use crate::error::WrapError;
use crate::string_utils::{char_count, char_range_to_byte_range};
use egui::{Key, Modifiers};
use log::debug;
use std::ops::Range;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Actions and Policies
// ─────────────────────────────────────────────────────────────────────────────

/// Whether to insert or remove markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapAction {
    Wrap,
    Unwrap,
}

/// How unwrap treats the characters it removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnwrapPolicy {
    /// Fail with `MarkerMismatch` unless the removed text is the marker
    #[default]
    Strict,
    /// Remove the marker-sized ranges around the selection unconditionally
    Lenient,
}

impl UnwrapPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.strict_unwrap {
            UnwrapPolicy::Strict
        } else {
            UnwrapPolicy::Lenient
        }
    }
}

/// A formatting request produced by keyboard dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapCommand {
    pub action: WrapAction,
    pub variant: SyntaxVariant,
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Mutation
// ─────────────────────────────────────────────────────────────────────────────

fn normalize(selection: Range<usize>) -> Range<usize> {
    if selection.start > selection.end {
        selection.end..selection.start
    } else {
        selection
    }
}

fn out_of_bounds(start: isize, end: isize, buffer_len: usize) -> WrapError {
    WrapError::OutOfBounds {
        range: start..end,
        buffer_len,
    }
}

/// Insert the rule's markers around `selection`.
///
/// Returns the new selection, which covers the same text inside the markers.
pub fn wrap(
    rule: &SyntaxRule,
    selection: Range<usize>,
    buffer: &mut String,
) -> Result<Range<usize>, WrapError> {
    let selection = normalize(selection);
    if selection.is_empty() {
        return Err(WrapError::EmptySelection);
    }

    let (Some(leading), Some(trailing)) = (rule.leading_marker(), rule.trailing_marker()) else {
        return Err(WrapError::MissingMarker {
            variant: rule.variant().name().to_string(),
        });
    };

    let buffer_len = char_count(buffer);
    if selection.end > buffer_len {
        return Err(out_of_bounds(
            selection.start as isize,
            selection.end as isize,
            buffer_len,
        ));
    }

    let bytes = char_range_to_byte_range(buffer, &selection);
    let wrapped = format!("{}{}{}", leading, &buffer[bytes.clone()], trailing);
    buffer.replace_range(bytes, &wrapped);

    let start = selection.start + rule.leading_count();
    debug!("Wrapped {}..{} in {}", selection.start, selection.end, rule.variant());
    Ok(start..start + selection.len())
}

/// Remove the rule's markers from around `selection`.
///
/// The removal range is `[start - leading, end + trailing)`, where the
/// leading side includes the separator of line-prefix variants.
pub fn unwrap(
    rule: &SyntaxRule,
    selection: Range<usize>,
    buffer: &mut String,
    policy: UnwrapPolicy,
) -> Result<Range<usize>, WrapError> {
    let selection = normalize(selection);
    if selection.is_empty() {
        return Err(WrapError::EmptySelection);
    }

    let Some(leading) = rule.leading_marker() else {
        return Err(WrapError::MissingMarker {
            variant: rule.variant().name().to_string(),
        });
    };
    let leading = format!("{}{}", leading, rule.separator());
    let trailing = rule.trailing_marker().unwrap_or("");
    let (lead, trail) = (char_count(&leading), char_count(trailing));

    let buffer_len = char_count(buffer);
    let removal_start = selection.start as isize - lead as isize;
    let removal_end = selection.end + trail;
    if removal_start < 0 || removal_end > buffer_len {
        return Err(out_of_bounds(removal_start, removal_end as isize, buffer_len));
    }
    let removal = selection.start - lead..removal_end;

    let before = char_range_to_byte_range(buffer, &(removal.start..selection.start));
    let inner = char_range_to_byte_range(buffer, &selection);
    let after = char_range_to_byte_range(buffer, &(selection.end..removal.end));

    if policy == UnwrapPolicy::Strict {
        let found_leading = &buffer[before.clone()];
        let found_trailing = &buffer[after.clone()];
        if found_leading != leading || found_trailing != trailing {
            return Err(WrapError::MarkerMismatch {
                expected: format!("{}…{}", leading, trailing),
                found: format!("{}…{}", found_leading, found_trailing),
            });
        }
    }

    let inner_text = buffer[inner].to_string();
    buffer.replace_range(before.start..after.end, &inner_text);

    debug!(
        "Unwrapped {}..{} from {}",
        selection.start,
        selection.end,
        rule.variant()
    );
    Ok(removal.start..removal.start + selection.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrap Editor
// ─────────────────────────────────────────────────────────────────────────────

/// Wrap/unwrap entry point with shortcut dispatch.
///
/// Holds only the catalog handle and the unwrap policy; every call works on
/// the buffer and selection it is given.
#[derive(Debug, Clone)]
pub struct WrapEditor {
    catalog: Arc<SyntaxCatalog>,
    policy: UnwrapPolicy,
}

impl WrapEditor {
    pub fn new(catalog: Arc<SyntaxCatalog>) -> Self {
        Self {
            catalog,
            policy: UnwrapPolicy::default(),
        }
    }

    pub fn from_settings(catalog: Arc<SyntaxCatalog>, settings: &Settings) -> Self {
        Self::new(catalog).with_policy(UnwrapPolicy::from_settings(settings))
    }

    pub fn with_policy(mut self, policy: UnwrapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnwrapPolicy {
        self.policy
    }

    /// Apply `action` for `variant` to the selection. On error the buffer is
    /// unchanged.
    pub fn toggle_wrap(
        &self,
        action: WrapAction,
        variant: SyntaxVariant,
        selection: Range<usize>,
        buffer: &mut String,
    ) -> Result<Range<usize>, WrapError> {
        let rule = self.catalog.lookup(variant);
        match action {
            WrapAction::Wrap => wrap(rule, selection, buffer),
            WrapAction::Unwrap => unwrap(rule, selection, buffer, self.policy),
        }
    }

    /// Decide whether a key event is a formatting shortcut.
    ///
    /// Returns a `Wrap` command when the key is bound and the selection is
    /// non-empty; otherwise `None` and the event passes through to the host.
    pub fn dispatch(
        &self,
        key: Key,
        modifiers: Modifiers,
        selection: &Range<usize>,
    ) -> Option<WrapCommand> {
        if selection.start == selection.end {
            return None;
        }
        let variant = self.catalog.find_by_shortcut(key, modifiers)?;
        Some(WrapCommand {
            action: WrapAction::Wrap,
            variant,
        })
    }

    /// Dispatch a key event and apply the resulting command.
    ///
    /// `None` means the key was not handled.
    pub fn handle_key(
        &self,
        key: Key,
        modifiers: Modifiers,
        selection: Range<usize>,
        buffer: &mut String,
    ) -> Option<Result<Range<usize>, WrapError>> {
        let command = self.dispatch(key, modifiers, &selection)?;
        Some(self.toggle_wrap(command.action, command.variant, selection, buffer))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::BoundaryKind;

    fn editor() -> WrapEditor {
        WrapEditor::new(Arc::new(SyntaxCatalog::new()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wrap Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_wrap_bold() {
        let mut text = String::from("Hello, world!");
        let selection = editor()
            .toggle_wrap(WrapAction::Wrap, SyntaxVariant::Bold, 0..5, &mut text)
            .unwrap();
        assert_eq!(text, "**Hello**, world!");
        assert_eq!(selection, 2..7);
    }

    #[test]
    fn test_wrap_reversed_selection() {
        let mut text = String::from("Hello world");
        let selection = editor()
            .toggle_wrap(WrapAction::Wrap, SyntaxVariant::Italic, 11..6, &mut text)
            .unwrap();
        assert_eq!(text, "Hello *world*");
        assert_eq!(selection, 7..12);
    }

    #[test]
    fn test_wrap_link() {
        let mut text = String::from("Click here");
        let selection = editor()
            .toggle_wrap(WrapAction::Wrap, SyntaxVariant::Link, 6..10, &mut text)
            .unwrap();
        assert_eq!(text, "Click [here]()");
        assert_eq!(selection, 7..11);
    }

    #[test]
    fn test_wrap_empty_selection_fails() {
        let mut text = String::from("Hello");
        for variant in SyntaxVariant::ALL {
            for action in [WrapAction::Wrap, WrapAction::Unwrap] {
                let result = editor().toggle_wrap(action, variant, 3..3, &mut text);
                assert_eq!(result, Err(WrapError::EmptySelection));
            }
        }
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_wrap_line_prefix_variant_needs_trailing_marker() {
        let mut text = String::from("Title");
        let result = editor().toggle_wrap(
            WrapAction::Wrap,
            SyntaxVariant::Heading(1),
            0..5,
            &mut text,
        );
        assert!(matches!(result, Err(WrapError::MissingMarker { .. })));
        assert_eq!(text, "Title");
    }

    #[test]
    fn test_wrap_selection_past_end() {
        let mut text = String::from("abc");
        let result = editor().toggle_wrap(WrapAction::Wrap, SyntaxVariant::Bold, 1..9, &mut text);
        assert!(matches!(result, Err(WrapError::OutOfBounds { .. })));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Unwrap Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_unwrap_bold() {
        let mut text = String::from("Hello, **world**!");
        let selection = editor()
            .toggle_wrap(WrapAction::Unwrap, SyntaxVariant::Bold, 9..14, &mut text)
            .unwrap();
        assert_eq!(text, "Hello, world!");
        assert_eq!(selection, 7..12);
    }

    #[test]
    fn test_unwrap_out_of_bounds() {
        let mut text = String::from("*x*");
        let result =
            editor().toggle_wrap(WrapAction::Unwrap, SyntaxVariant::Bold, 1..2, &mut text);
        assert_eq!(
            result,
            Err(WrapError::OutOfBounds {
                range: -1..4,
                buffer_len: 3
            })
        );
        assert_eq!(text, "*x*");
    }

    #[test]
    fn test_strict_unwrap_rejects_plain_text() {
        let mut text = String::from("ab word cd");
        let result =
            editor().toggle_wrap(WrapAction::Unwrap, SyntaxVariant::Bold, 3..7, &mut text);
        assert!(matches!(result, Err(WrapError::MarkerMismatch { .. })));
        assert_eq!(text, "ab word cd");
    }

    #[test]
    fn test_lenient_unwrap_strips_anything() {
        let mut text = String::from("ab word cd");
        let selection = editor()
            .with_policy(UnwrapPolicy::Lenient)
            .toggle_wrap(WrapAction::Unwrap, SyntaxVariant::Bold, 3..7, &mut text)
            .unwrap();
        assert_eq!(text, "awordd");
        assert_eq!(selection, 1..5);
    }

    #[test]
    fn test_unwrap_heading_removes_separator() {
        let mut text = String::from("## Title");
        let selection = editor()
            .toggle_wrap(WrapAction::Unwrap, SyntaxVariant::Heading(2), 3..8, &mut text)
            .unwrap();
        assert_eq!(text, "Title");
        assert_eq!(selection, 0..5);
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = Settings {
            strict_unwrap: false,
            ..Settings::default()
        };
        assert_eq!(UnwrapPolicy::from_settings(&settings), UnwrapPolicy::Lenient);
        assert_eq!(
            UnwrapPolicy::from_settings(&Settings::default()),
            UnwrapPolicy::Strict
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Round Trip
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_wrap_unwrap_roundtrip_for_symmetrical_variants() {
        let catalog = Arc::new(SyntaxCatalog::new());
        let editor = WrapEditor::new(catalog.clone());
        let samples = [
            ("Hello, world!", 0..5),
            ("Hello, world!", 7..12),
            ("Hei på deg 你好 🎉", 4..6),
            ("x", 0..1),
            ("line one\nline two", 3..12),
        ];

        for rule in catalog.rules() {
            if rule.boundary() != BoundaryKind::EnclosedSymmetrical {
                continue;
            }
            for (original, selection) in samples.iter().cloned() {
                let mut text = original.to_string();
                let wrapped = editor
                    .toggle_wrap(WrapAction::Wrap, rule.variant(), selection.clone(), &mut text)
                    .unwrap();
                let restored = editor
                    .toggle_wrap(WrapAction::Unwrap, rule.variant(), wrapped, &mut text)
                    .unwrap();
                assert_eq!(text, original, "{}", rule.variant());
                assert_eq!(restored, selection, "{}", rule.variant());
            }
        }
    }

    #[test]
    fn test_wrap_multibyte_selection() {
        let mut text = String::from("Hello 你好 World");
        editor()
            .toggle_wrap(WrapAction::Wrap, SyntaxVariant::Bold, 6..8, &mut text)
            .unwrap();
        assert_eq!(text, "Hello **你好** World");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_dispatch_emits_wrap() {
        let command = editor().dispatch(Key::B, Modifiers::COMMAND, &(0..5));
        assert_eq!(
            command,
            Some(WrapCommand {
                action: WrapAction::Wrap,
                variant: SyntaxVariant::Bold
            })
        );
    }

    #[test]
    fn test_dispatch_ignores_empty_selection_and_unbound_keys() {
        assert_eq!(editor().dispatch(Key::B, Modifiers::COMMAND, &(3..3)), None);
        assert_eq!(editor().dispatch(Key::Q, Modifiers::NONE, &(0..5)), None);
    }

    #[test]
    fn test_dispatch_wraps_even_when_already_wrapped() {
        let mut text = String::from("**bold**");
        let result = editor()
            .handle_key(Key::B, Modifiers::CTRL, 2..6, &mut text)
            .unwrap()
            .unwrap();
        assert_eq!(text, "****bold****");
        assert_eq!(result, 4..8);
    }

    #[test]
    fn test_handle_key_passes_through() {
        let mut text = String::from("abc");
        assert!(editor()
            .handle_key(Key::A, Modifiers::NONE, 0..3, &mut text)
            .is_none());
        assert_eq!(text, "abc");
    }
}
