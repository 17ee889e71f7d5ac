//! Ferrite Spans - Markdown syntax-span engine
//!
//! Detects markdown constructs in a plain-text buffer, splits each match into
//! marker and content ranges, styles them through a host buffer, and wraps or
//! unwraps selections with a variant's markers.
//!
//! # Flow
//!
//! A text change triggers `ElementStore::reparse_full_document` (or the
//! incremental `apply_edit`). Once the new element set is published,
//! `StyleApplier::restyle` writes attributes to the host's `StyledBuffer`.
//! A keystroke matching a shortcut goes through `WrapEditor::handle_key`,
//! which edits the text and returns the new selection; the edit then takes
//! the same re-parse path.
//!
//! ```ignore
//! use std::sync::Arc;
//! use ferrite_spans::{config, ElementStore, StyleApplier, StyleTheme, SyntaxCatalog};
//!
//! let settings = config::load_config();
//! let catalog = Arc::new(SyntaxCatalog::with_settings(&settings));
//! let mut store = ElementStore::new(Arc::clone(&catalog));
//! store.reparse_full_document("# Title\n\nSome **bold** text");
//! store.wait_for_parse(std::time::Duration::from_secs(1));
//!
//! let applier = StyleApplier::new(catalog, StyleTheme::from_settings(&settings));
//! applier.restyle(store.published().elements(), &mut buffer);
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod string_utils;
pub mod theme;

pub use config::{load_config, save_config, Settings, Theme};
pub use editor::{EditOutcome, ElementSet, ElementStore, ParseState, TextEdit};
pub use error::{Error, Result, ResultExt, SpanError, WrapError};
pub use markdown::{
    detect, split, BoundaryKind, ColorRole, Element, Ranges, StyleTemplate, SyntaxCatalog,
    SyntaxRule, SyntaxVariant, UnwrapPolicy, WrapAction, WrapCommand, WrapEditor,
};
pub use string_utils::TextSnapshot;
pub use theme::{AttributedText, StyleApplier, StyleRun, StyleTheme, StyledBuffer, TextAttributes};
