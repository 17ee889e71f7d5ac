//! Markdown syntax spans and the wrap/unwrap editing primitive
//!
//! This module holds the lexical side of the engine: the catalog of markdown
//! constructs, the detector that finds their occurrences, the splitter that
//! separates markers from content, and the formatting primitive that inserts
//! or removes markers around a selection.
//!
//! # Example
//! ```ignore
//! use ferrite_spans::markdown::{detect_in, split, SyntaxCatalog, SyntaxVariant};
//! use ferrite_spans::string_utils::TextSnapshot;
//!
//! let catalog = SyntaxCatalog::new();
//! let rule = catalog.lookup(SyntaxVariant::Heading(1));
//! let snapshot = TextSnapshot::new("# Title");
//! for span in detect_in("# Title", rule) {
//!     let ranges = split(&snapshot, span, rule)?;
//!     assert_eq!(ranges.content, 2..7);
//! }
//! ```

mod detector;
mod element;
pub mod formatting;
mod splitter;
pub mod syntax;

pub use detector::{detect, detect_in};
pub use element::{Element, Ranges};
pub use formatting::{UnwrapPolicy, WrapAction, WrapCommand, WrapEditor};
pub use splitter::split;
pub use syntax::{
    heading_scale, BoundaryKind, ColorRole, MatchOptions, Shortcut, StyleTemplate, SyntaxCatalog,
    SyntaxKind, SyntaxRule, SyntaxVariant, VariantSpec,
};
