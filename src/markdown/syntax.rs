//! Syntax Catalog
//!
//! The catalog is the single table of markdown constructs the engine knows
//! about. Every per-variant property (markers, boundary kind, pattern, match
//! options, keyboard binding) lives in one `VariantSpec` record, so adding a
//! construct means adding one row rather than touching a dozen `match` arms.
//!
//! The catalog is built once, explicitly, and shared by handle:
//!
//! ```ignore
//! use std::sync::Arc;
//! use ferrite_spans::markdown::{SyntaxCatalog, SyntaxVariant};
//!
//! let catalog = Arc::new(SyntaxCatalog::new());
//! let bold = catalog.lookup(SyntaxVariant::Bold);
//! assert_eq!(bold.leading_marker(), Some("**"));
//! ```

use crate::config::Settings;
use crate::error::SpanError;
use egui::{Key, Modifiers};
use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Variant Tags
// ─────────────────────────────────────────────────────────────────────────────

/// One markdown construct kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxVariant {
    /// ATX heading, level 1-6 (`# Title`)
    Heading(u8),
    /// `**bold**`
    Bold,
    /// `*italic*`
    Italic,
    /// `***bold italic***`
    BoldItalic,
    /// `~~strikethrough~~`
    Strikethrough,
    /// `==highlight==`
    Highlight,
    /// `` `code` ``
    InlineCode,
    /// Bullet list item (`- item`)
    List,
    /// `---`
    HorizontalRule,
    /// Fenced code block
    CodeBlock,
    /// `> quote`
    QuoteBlock,
    /// `[text](url)`
    Link,
    /// `![alt](url)`
    Image,
}

/// Number of distinct variants (six heading levels count separately).
pub const VARIANT_COUNT: usize = 18;

impl SyntaxVariant {
    /// All variants in catalog declaration order.
    pub const ALL: [SyntaxVariant; VARIANT_COUNT] = [
        SyntaxVariant::Heading(1),
        SyntaxVariant::Heading(2),
        SyntaxVariant::Heading(3),
        SyntaxVariant::Heading(4),
        SyntaxVariant::Heading(5),
        SyntaxVariant::Heading(6),
        SyntaxVariant::Bold,
        SyntaxVariant::Italic,
        SyntaxVariant::BoldItalic,
        SyntaxVariant::Strikethrough,
        SyntaxVariant::Highlight,
        SyntaxVariant::InlineCode,
        SyntaxVariant::List,
        SyntaxVariant::HorizontalRule,
        SyntaxVariant::CodeBlock,
        SyntaxVariant::QuoteBlock,
        SyntaxVariant::Link,
        SyntaxVariant::Image,
    ];

    /// Position in catalog declaration order. Heading levels are clamped to 1-6.
    pub fn ordinal(&self) -> usize {
        match self {
            SyntaxVariant::Heading(level) => (*level).clamp(1, 6) as usize - 1,
            SyntaxVariant::Bold => 6,
            SyntaxVariant::Italic => 7,
            SyntaxVariant::BoldItalic => 8,
            SyntaxVariant::Strikethrough => 9,
            SyntaxVariant::Highlight => 10,
            SyntaxVariant::InlineCode => 11,
            SyntaxVariant::List => 12,
            SyntaxVariant::HorizontalRule => 13,
            SyntaxVariant::CodeBlock => 14,
            SyntaxVariant::QuoteBlock => 15,
            SyntaxVariant::Link => 16,
            SyntaxVariant::Image => 17,
        }
    }

    /// Stable identifier used in configuration files.
    pub fn name(&self) -> &'static str {
        const HEADINGS: [&str; 6] = [
            "heading1", "heading2", "heading3", "heading4", "heading5", "heading6",
        ];
        match self {
            SyntaxVariant::Heading(_) => HEADINGS[self.ordinal()],
            SyntaxVariant::Bold => "bold",
            SyntaxVariant::Italic => "italic",
            SyntaxVariant::BoldItalic => "bolditalic",
            SyntaxVariant::Strikethrough => "strikethrough",
            SyntaxVariant::Highlight => "highlight",
            SyntaxVariant::InlineCode => "inlinecode",
            SyntaxVariant::List => "list",
            SyntaxVariant::HorizontalRule => "horizontalrule",
            SyntaxVariant::CodeBlock => "codeblock",
            SyntaxVariant::QuoteBlock => "quoteblock",
            SyntaxVariant::Link => "link",
            SyntaxVariant::Image => "image",
        }
    }

    /// Human-readable name for menus and tooltips.
    pub fn display_name(&self) -> &'static str {
        const HEADINGS: [&str; 6] = [
            "Heading 1",
            "Heading 2",
            "Heading 3",
            "Heading 4",
            "Heading 5",
            "Heading 6",
        ];
        match self {
            SyntaxVariant::Heading(_) => HEADINGS[self.ordinal()],
            SyntaxVariant::Bold => "Bold",
            SyntaxVariant::Italic => "Italic",
            SyntaxVariant::BoldItalic => "Bold Italic",
            SyntaxVariant::Strikethrough => "Strikethrough",
            SyntaxVariant::Highlight => "Highlight",
            SyntaxVariant::InlineCode => "Inline Code",
            SyntaxVariant::List => "List",
            SyntaxVariant::HorizontalRule => "Horizontal Rule",
            SyntaxVariant::CodeBlock => "Code Block",
            SyntaxVariant::QuoteBlock => "Blockquote",
            SyntaxVariant::Link => "Link",
            SyntaxVariant::Image => "Image",
        }
    }
}

impl fmt::Display for SyntaxVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyntaxVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SyntaxVariant::ALL
            .iter()
            .copied()
            .find(|v| v.name() == lower)
            .ok_or_else(|| format!("Unknown syntax variant '{}'", s))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lexical Properties
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a construct lives inside a line or spans whole lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    Inline,
    Block,
}

/// How markers sit relative to the content of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Equal-length markers on both ends (`**bold**`)
    EnclosedSymmetrical,
    /// One structural opening character, structural syntax on the right (`[a](b)`)
    EnclosedAsymmetrical,
    /// Marker only at the start of the line (`# Title`)
    LeadingOnly,
    /// The whole match is marker (`---`)
    None,
}

/// Regex flags a pattern is compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    /// `^` and `$` match at line boundaries
    pub multi_line: bool,
    /// `.` matches `\n`
    pub dot_matches_new_line: bool,
    pub case_insensitive: bool,
}

impl MatchOptions {
    /// Options for line-anchored block patterns.
    pub const fn lines() -> Self {
        Self {
            multi_line: true,
            dot_matches_new_line: false,
            case_insensitive: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboard Shortcuts
// ─────────────────────────────────────────────────────────────────────────────

/// A key plus modifier set that triggers a wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl Shortcut {
    /// Ctrl (Cmd on macOS) + key.
    pub const fn command(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::COMMAND,
        }
    }

    /// Ctrl (Cmd on macOS) + Shift + key.
    pub const fn command_shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::COMMAND
            },
        }
    }

    /// Whether a key event triggers this shortcut.
    ///
    /// Ctrl, Cmd and egui's logical `command` flag are treated as one
    /// primary modifier so bindings work on every platform.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        fn primary(m: Modifiers) -> bool {
            m.ctrl || m.command || m.mac_cmd
        }
        self.key == key
            && primary(self.modifiers) == primary(modifiers)
            && self.modifiers.shift == modifiers.shift
            && self.modifiers.alt == modifiers.alt
    }

    /// Label for tooltips, e.g. `Ctrl+Shift+K`.
    pub fn label(&self) -> String {
        let mut label = String::new();
        if self.modifiers.ctrl || self.modifiers.command || self.modifiers.mac_cmd {
            label.push_str("Ctrl+");
        }
        if self.modifiers.alt {
            label.push_str("Alt+");
        }
        if self.modifiers.shift {
            label.push_str("Shift+");
        }
        label.push_str(&key_label(self.key));
        label
    }
}

fn key_label(key: Key) -> String {
    match key {
        Key::Backtick => "`".to_string(),
        Key::Num0 => "0".to_string(),
        Key::Num1 => "1".to_string(),
        Key::Num2 => "2".to_string(),
        Key::Num3 => "3".to_string(),
        Key::Num4 => "4".to_string(),
        Key::Num5 => "5".to_string(),
        Key::Num6 => "6".to_string(),
        other => format!("{:?}", other),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Style Templates
// ─────────────────────────────────────────────────────────────────────────────

/// Palette slot a style takes its color from. Themes map slots to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Heading,
    Link,
    Code,
    CodeBackground,
    Highlight,
    Blockquote,
    ListMarker,
    Rule,
}

/// Theme-independent attributes for one range of an element.
///
/// `false` and `None` leave the underlying attribute alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StyleTemplate {
    pub foreground: Option<ColorRole>,
    pub background: Option<ColorRole>,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub monospace: bool,
    /// Multiplier on the base font size
    pub font_scale: Option<f32>,
}

impl StyleTemplate {
    pub fn foreground(mut self, role: ColorRole) -> Self {
        self.foreground = Some(role);
        self
    }

    pub fn background(mut self, role: ColorRole) -> Self {
        self.background = Some(role);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.font_scale = Some(scale);
        self
    }
}

/// Font scale for a heading level.
pub fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 1.8,
        2 => 1.5,
        3 => 1.3,
        4 => 1.15,
        5 => 1.05,
        _ => 1.0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Variant Records
// ─────────────────────────────────────────────────────────────────────────────

/// Every per-variant property in one record.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSpec {
    pub variant: SyntaxVariant,
    pub kind: SyntaxKind,
    pub boundary: BoundaryKind,
    /// Opening marker (`**`, `#`, `[`)
    pub leading: Option<String>,
    /// Closing marker (`**`, `]()`)
    pub trailing: Option<String>,
    /// Whitespace required between a leading-only marker and its content
    pub separator: &'static str,
    pub pattern: String,
    /// Capture group whose span is the element (0 = whole match)
    pub span_group: usize,
    /// A match may not start right after this character, unless that
    /// character closed the previous match
    pub not_after: Option<char>,
    pub options: MatchOptions,
    pub shortcut: Option<Shortcut>,
    /// Attributes of the content range
    pub content_style: StyleTemplate,
    /// Attributes of the leading and trailing markers
    pub marker_style: StyleTemplate,
}

impl VariantSpec {
    fn enclosed(
        variant: SyntaxVariant,
        marker: &str,
        pattern: &str,
        shortcut: Option<Shortcut>,
    ) -> Self {
        Self {
            variant,
            kind: SyntaxKind::Inline,
            boundary: BoundaryKind::EnclosedSymmetrical,
            leading: Some(marker.to_string()),
            trailing: Some(marker.to_string()),
            separator: "",
            pattern: pattern.to_string(),
            span_group: 0,
            not_after: None,
            options: MatchOptions::default(),
            shortcut,
            content_style: StyleTemplate::default(),
            marker_style: StyleTemplate::default(),
        }
    }

    fn line_prefix(variant: SyntaxVariant, marker: &str, pattern: String) -> Self {
        Self {
            kind: SyntaxKind::Block,
            boundary: BoundaryKind::LeadingOnly,
            trailing: None,
            separator: " ",
            pattern,
            options: MatchOptions::lines(),
            ..Self::enclosed(variant, marker, "", None)
        }
    }

    fn with_group(mut self, group: usize) -> Self {
        self.span_group = group;
        self
    }

    fn not_after(mut self, guard: char) -> Self {
        self.not_after = Some(guard);
        self
    }

    fn asymmetrical(mut self, trailing: &str) -> Self {
        self.boundary = BoundaryKind::EnclosedAsymmetrical;
        self.trailing = Some(trailing.to_string());
        self
    }

    fn styled(mut self, content: StyleTemplate, marker: StyleTemplate) -> Self {
        self.content_style = content;
        self.marker_style = marker;
        self
    }

    /// The built-in record for a variant.
    pub fn builtin(variant: SyntaxVariant) -> Self {
        use ColorRole as C;
        use SyntaxVariant as V;
        let plain = StyleTemplate::default();
        let code = plain
            .monospace()
            .foreground(C::Code)
            .background(C::CodeBackground);
        let code_marker = plain.monospace().background(C::CodeBackground);

        match variant {
            V::Heading(level) => {
                let level = level.clamp(1, 6);
                let scale = heading_scale(level);
                Self::line_prefix(
                    V::Heading(level),
                    &"#".repeat(level as usize),
                    format!(r"^#{{{}}}[ \t]+[^\n]*$", level),
                )
                .styled(
                    plain.bold().foreground(C::Heading).scaled(scale),
                    plain.scaled(scale),
                )
            }
            V::Bold => Self::enclosed(
                V::Bold,
                "**",
                r"\*\*[^*\n]+\*\*",
                Some(Shortcut::command(Key::B)),
            )
            .not_after('*')
            .styled(plain.bold(), plain),
            V::Italic => Self::enclosed(
                V::Italic,
                "*",
                r"\*[^*\n]+\*",
                Some(Shortcut::command(Key::I)),
            )
            .not_after('*')
            .styled(plain.italic(), plain),
            V::BoldItalic => Self::enclosed(V::BoldItalic, "***", r"\*\*\*[^*\n]+\*\*\*", None)
                .styled(plain.bold().italic(), plain),
            V::Strikethrough => Self::enclosed(
                V::Strikethrough,
                "~~",
                r"~~[^~\n]+~~",
                Some(Shortcut::command_shift(Key::S)),
            )
            .styled(plain.strikethrough(), plain),
            V::Highlight => Self::enclosed(
                V::Highlight,
                "==",
                r"==[^=\n]+==",
                Some(Shortcut::command_shift(Key::H)),
            )
            .styled(plain.background(C::Highlight), plain),
            V::InlineCode => Self::enclosed(
                V::InlineCode,
                "`",
                r"`[^`\n]+`",
                Some(Shortcut::command(Key::Backtick)),
            )
            .styled(code, code_marker),
            V::List => Self::line_prefix(V::List, "-", r"^[ \t]*([-*+][ \t]+[^\n]*)$".to_string())
                .with_group(1)
                .styled(plain, plain.bold().foreground(C::ListMarker)),
            V::HorizontalRule => Self {
                boundary: BoundaryKind::None,
                separator: "",
                ..Self::line_prefix(
                    V::HorizontalRule,
                    "---",
                    r"^[ \t]*(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$".to_string(),
                )
            }
            .styled(plain, plain.foreground(C::Rule)),
            V::CodeBlock => Self {
                kind: SyntaxKind::Block,
                options: MatchOptions {
                    multi_line: true,
                    dot_matches_new_line: true,
                    case_insensitive: false,
                },
                ..Self::enclosed(
                    V::CodeBlock,
                    "```",
                    r"^```[^\n]*\n.*?^```",
                    Some(Shortcut::command_shift(Key::C)),
                )
            }
            .styled(code, code_marker),
            V::QuoteBlock => Self::line_prefix(V::QuoteBlock, ">", r"^>[^\n]*$".to_string())
                .styled(plain.italic().foreground(C::Blockquote), plain),
            V::Link => Self::enclosed(
                V::Link,
                "[",
                r"\[[^\]\n]*\]\([^)\n]*\)",
                Some(Shortcut::command(Key::K)),
            )
            .asymmetrical("]()")
            .not_after('!')
            .styled(plain.underline().foreground(C::Link), plain),
            V::Image => Self::enclosed(
                V::Image,
                "![",
                r"!\[[^\]\n]*\]\([^)\n]*\)",
                Some(Shortcut::command_shift(Key::K)),
            )
            .asymmetrical("]()")
            .styled(plain.italic().foreground(C::Link), plain),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog Entries
// ─────────────────────────────────────────────────────────────────────────────

/// A variant record with its compiled pattern.
#[derive(Debug, Clone)]
pub struct SyntaxRule {
    spec: VariantSpec,
    /// `None` when the pattern failed to compile
    regex: Option<Regex>,
    enabled: bool,
}

impl SyntaxRule {
    fn compile(spec: VariantSpec) -> Self {
        let regex = RegexBuilder::new(&spec.pattern)
            .multi_line(spec.options.multi_line)
            .dot_matches_new_line(spec.options.dot_matches_new_line)
            .case_insensitive(spec.options.case_insensitive)
            .build();

        let regex = match regex {
            Ok(regex) => Some(regex),
            Err(e) => {
                let err = SpanError::PatternCompileFailure {
                    variant: spec.variant.name().to_string(),
                    message: e.to_string(),
                };
                warn!("{}; variant disabled", err);
                None
            }
        };

        Self {
            spec,
            regex,
            enabled: true,
        }
    }

    pub fn spec(&self) -> &VariantSpec {
        &self.spec
    }

    pub fn variant(&self) -> SyntaxVariant {
        self.spec.variant
    }

    pub fn kind(&self) -> SyntaxKind {
        self.spec.kind
    }

    pub fn boundary(&self) -> BoundaryKind {
        self.spec.boundary
    }

    pub fn leading_marker(&self) -> Option<&str> {
        self.spec.leading.as_deref()
    }

    /// Length of the leading marker in characters (0 without a marker).
    pub fn leading_count(&self) -> usize {
        self.spec.leading.as_ref().map_or(0, |m| m.chars().count())
    }

    pub fn trailing_marker(&self) -> Option<&str> {
        self.spec.trailing.as_deref()
    }

    /// Length of the trailing marker in characters (0 without a marker).
    pub fn trailing_count(&self) -> usize {
        self.spec.trailing.as_ref().map_or(0, |m| m.chars().count())
    }

    pub fn separator(&self) -> &str {
        self.spec.separator
    }

    pub fn span_group(&self) -> usize {
        self.spec.span_group
    }

    pub fn not_after(&self) -> Option<char> {
        self.spec.not_after
    }

    pub fn content_style(&self) -> &StyleTemplate {
        &self.spec.content_style
    }

    pub fn marker_style(&self) -> &StyleTemplate {
        &self.spec.marker_style
    }

    /// The compiled pattern; `None` for disabled or uncompilable variants.
    pub fn regex(&self) -> Option<&Regex> {
        if self.enabled {
            self.regex.as_ref()
        } else {
            None
        }
    }

    pub fn shortcut(&self) -> Option<Shortcut> {
        if self.enabled {
            self.spec.shortcut
        } else {
            None
        }
    }

    /// Whether the variant participates in detection.
    pub fn is_active(&self) -> bool {
        self.enabled && self.regex.is_some()
    }

    /// Tooltip text, e.g. `Bold (Ctrl+B)`.
    pub fn tooltip(&self) -> String {
        match self.shortcut() {
            Some(shortcut) => format!("{} ({})", self.variant().display_name(), shortcut.label()),
            None => self.variant().display_name().to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// The table of all variants, in declaration order.
///
/// Read-only once built; share it with `Arc`.
#[derive(Debug, Clone)]
pub struct SyntaxCatalog {
    rules: Vec<SyntaxRule>,
}

impl Default for SyntaxCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxCatalog {
    /// Build the catalog from the built-in records.
    pub fn new() -> Self {
        Self::with_overrides(Vec::new())
    }

    /// Build the catalog, replacing the built-in record of every variant
    /// that appears in `overrides`.
    pub fn with_overrides(overrides: Vec<VariantSpec>) -> Self {
        let rules: Vec<SyntaxRule> = SyntaxVariant::ALL
            .iter()
            .map(|&variant| {
                let spec = overrides
                    .iter()
                    .rev()
                    .find(|s| s.variant == variant)
                    .cloned()
                    .unwrap_or_else(|| VariantSpec::builtin(variant));
                SyntaxRule::compile(spec)
            })
            .collect();

        debug!(
            "Built syntax catalog: {} of {} variants active",
            rules.iter().filter(|r| r.is_active()).count(),
            rules.len()
        );
        Self { rules }
    }

    /// Build the catalog with the variants disabled in `settings` switched off.
    pub fn with_settings(settings: &Settings) -> Self {
        let mut catalog = Self::new();
        for rule in &mut catalog.rules {
            if settings.is_disabled(rule.variant()) {
                debug!("Variant {} disabled by settings", rule.variant());
                rule.enabled = false;
            }
        }
        catalog
    }

    /// The record of a variant. Total: every variant has a record.
    pub fn lookup(&self, variant: SyntaxVariant) -> &SyntaxRule {
        &self.rules[variant.ordinal()]
    }

    /// Declaration-order position of a variant.
    pub fn position(&self, variant: SyntaxVariant) -> usize {
        variant.ordinal()
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &SyntaxRule> {
        self.rules.iter()
    }

    /// First variant bound to the given key and modifiers.
    pub fn find_by_shortcut(&self, key: Key, modifiers: Modifiers) -> Option<SyntaxVariant> {
        self.rules
            .iter()
            .find(|rule| {
                rule.shortcut()
                    .is_some_and(|shortcut| shortcut.matches(key, modifiers))
            })
            .map(SyntaxRule::variant)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
