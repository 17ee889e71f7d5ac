//! Theme System
//!
//! Turns the style templates of catalog rules into text attributes for the
//! content and marker ranges of detected elements.
//!
//! # Architecture
//!
//! Each `VariantSpec` carries theme-independent `StyleTemplate`s whose colors
//! are `ColorRole`s. `SpanColors` maps those roles to colors; `light.rs` and
//! `dark.rs` supply the two built-in palettes. The `Theme` enum in
//! `config::settings` selects which one a `StyleTheme` uses.
//!
//! # Usage
//!
//! ```ignore
//! use ferrite_spans::theme::StyleTheme;
//! use ferrite_spans::markdown::{SyntaxCatalog, SyntaxVariant};
//!
//! let theme = StyleTheme::from_settings(&settings);
//! let catalog = SyntaxCatalog::with_settings(&settings);
//! let attrs = theme.content_attributes(catalog.lookup(SyntaxVariant::Bold));
//! assert_eq!(attrs.bold, Some(true));
//! ```

mod applier;
pub mod dark;
pub mod light;

pub use applier::{AttributedText, StyleApplier, StyleRun, StyledBuffer};

use crate::config::{Settings, Theme};
use crate::markdown::{ColorRole, StyleTemplate, SyntaxRule};
use egui::Color32;

// ─────────────────────────────────────────────────────────────────────────────
// Text Attributes
// ─────────────────────────────────────────────────────────────────────────────

/// A set of optional text attributes.
///
/// `None` means "leave as is"; merging two sets keeps every key of the first
/// that the second does not set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextAttributes {
    pub foreground: Option<Color32>,
    pub background: Option<Color32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub strikethrough: Option<bool>,
    pub underline: Option<bool>,
    pub monospace: Option<bool>,
    /// Multiplier on the base font size
    pub font_scale: Option<f32>,
}

impl TextAttributes {
    /// Overlay `other` on `self`; keys set in `other` win.
    pub fn merge(&self, other: &TextAttributes) -> TextAttributes {
        TextAttributes {
            foreground: other.foreground.or(self.foreground),
            background: other.background.or(self.background),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            strikethrough: other.strikethrough.or(self.strikethrough),
            underline: other.underline.or(self.underline),
            monospace: other.monospace.or(self.monospace),
            font_scale: other.font_scale.or(self.font_scale),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TextAttributes::default()
    }

    pub fn with_foreground(mut self, color: Color32) -> Self {
        self.foreground = Some(color);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Span Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors used when styling markdown spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanColors {
    /// Regular document text
    pub text: Color32,
    /// Dimmed syntax markers
    pub muted: Color32,
    pub heading: Color32,
    pub link: Color32,
    pub code: Color32,
    pub code_bg: Color32,
    pub highlight_bg: Color32,
    pub blockquote: Color32,
    pub list_marker: Color32,
    pub horizontal_rule: Color32,
}

impl SpanColors {
    /// The palette color for a role.
    pub fn role(&self, role: ColorRole) -> Color32 {
        match role {
            ColorRole::Heading => self.heading,
            ColorRole::Link => self.link,
            ColorRole::Code => self.code,
            ColorRole::CodeBackground => self.code_bg,
            ColorRole::Highlight => self.highlight_bg,
            ColorRole::Blockquote => self.blockquote,
            ColorRole::ListMarker => self.list_marker,
            ColorRole::Rule => self.horizontal_rule,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Style Theme
// ─────────────────────────────────────────────────────────────────────────────

/// Attribute sets per variant for one palette.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTheme {
    theme: Theme,
    colors: SpanColors,
    dim_markers: bool,
}

impl Default for StyleTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl StyleTheme {
    pub fn light() -> Self {
        Self {
            theme: Theme::Light,
            colors: light::span_colors(),
            dim_markers: true,
        }
    }

    pub fn dark() -> Self {
        Self {
            theme: Theme::Dark,
            colors: dark::span_colors(),
            dim_markers: true,
        }
    }

    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::light(),
            Theme::Dark => Self::dark(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_theme(settings.theme).with_dim_markers(settings.dim_markers)
    }

    pub fn with_dim_markers(mut self, dim: bool) -> Self {
        self.dim_markers = dim;
        self
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn colors(&self) -> &SpanColors {
        &self.colors
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    /// Attributes of unstyled text. Every key is set, so a restyled range
    /// starts from a known state.
    pub fn base_attributes(&self) -> TextAttributes {
        TextAttributes {
            foreground: Some(self.colors.text),
            background: None,
            bold: Some(false),
            italic: Some(false),
            strikethrough: Some(false),
            underline: Some(false),
            monospace: Some(false),
            font_scale: Some(1.0),
        }
    }

    /// Resolve a template against this palette. Unset flags stay `None`.
    pub fn resolve(&self, template: &StyleTemplate) -> TextAttributes {
        let flag = |on: bool| on.then_some(true);
        TextAttributes {
            foreground: template.foreground.map(|role| self.colors.role(role)),
            background: template.background.map(|role| self.colors.role(role)),
            bold: flag(template.bold),
            italic: flag(template.italic),
            strikethrough: flag(template.strikethrough),
            underline: flag(template.underline),
            monospace: flag(template.monospace),
            font_scale: template.font_scale,
        }
    }

    /// Attributes for the content range of a rule's elements.
    pub fn content_attributes(&self, rule: &SyntaxRule) -> TextAttributes {
        self.resolve(rule.content_style())
    }

    /// Attributes for the leading and trailing markers of a rule's elements.
    /// Markers without a color of their own are dimmed when enabled.
    pub fn marker_attributes(&self, rule: &SyntaxRule) -> TextAttributes {
        let template = rule.marker_style();
        let attrs = self.resolve(template);
        if self.dim_markers && template.foreground.is_none() {
            attrs.with_foreground(self.colors.muted)
        } else {
            attrs
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{SyntaxCatalog, SyntaxVariant, VariantSpec};

    #[test]
    fn test_merge_later_wins_per_key() {
        let first = TextAttributes {
            bold: Some(true),
            ..Default::default()
        }
        .with_foreground(Color32::RED);
        let second = TextAttributes::default().with_foreground(Color32::BLUE);
        let merged = first.merge(&second);
        assert_eq!(merged.foreground, Some(Color32::BLUE));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.italic, None);
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let attrs = TextAttributes {
            italic: Some(true),
            font_scale: Some(1.5),
            ..Default::default()
        };
        assert_eq!(attrs.merge(&TextAttributes::default()), attrs);
        assert_eq!(TextAttributes::default().merge(&attrs), attrs);
        assert!(TextAttributes::default().is_empty());
    }

    #[test]
    fn test_base_sets_every_key() {
        let base = StyleTheme::light().base_attributes();
        assert!(base.foreground.is_some());
        assert_eq!(base.bold, Some(false));
        assert_eq!(base.font_scale, Some(1.0));
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(StyleTheme::light().colors(), StyleTheme::dark().colors());
        assert!(StyleTheme::dark().is_dark());
        assert!(!StyleTheme::light().is_dark());
    }

    #[test]
    fn test_content_attributes() {
        let theme = StyleTheme::light();
        let catalog = SyntaxCatalog::new();
        let content = |variant| theme.content_attributes(catalog.lookup(variant));
        assert_eq!(content(SyntaxVariant::Bold).bold, Some(true));
        assert_eq!(content(SyntaxVariant::Bold).italic, None);
        assert_eq!(content(SyntaxVariant::Italic).italic, Some(true));
        let h1 = content(SyntaxVariant::Heading(1));
        let h3 = content(SyntaxVariant::Heading(3));
        assert!(h1.font_scale > h3.font_scale);
        assert_eq!(h1.foreground, Some(theme.colors().heading));
        let code = content(SyntaxVariant::InlineCode);
        assert_eq!(code.monospace, Some(true));
        assert_eq!(code.background, Some(theme.colors().code_bg));
    }

    #[test]
    fn test_roles_follow_palette() {
        let catalog = SyntaxCatalog::new();
        let link = catalog.lookup(SyntaxVariant::Link);
        assert_eq!(
            StyleTheme::light().content_attributes(link).foreground,
            Some(StyleTheme::light().colors().link)
        );
        assert_eq!(
            StyleTheme::dark().content_attributes(link).foreground,
            Some(StyleTheme::dark().colors().link)
        );
    }

    #[test]
    fn test_template_override_restyles_variant() {
        let custom = VariantSpec {
            content_style: StyleTemplate::default().underline().foreground(ColorRole::Highlight),
            ..VariantSpec::builtin(SyntaxVariant::Bold)
        };
        let catalog = SyntaxCatalog::with_overrides(vec![custom]);
        let theme = StyleTheme::light();
        let attrs = theme.content_attributes(catalog.lookup(SyntaxVariant::Bold));
        assert_eq!(attrs.bold, None);
        assert_eq!(attrs.underline, Some(true));
        assert_eq!(attrs.foreground, Some(theme.colors().highlight_bg));
    }

    #[test]
    fn test_dim_markers_setting() {
        let catalog = SyntaxCatalog::new();
        let bold = catalog.lookup(SyntaxVariant::Bold);
        let list = catalog.lookup(SyntaxVariant::List);
        let settings = Settings {
            theme: Theme::Dark,
            dim_markers: false,
            ..Default::default()
        };
        let theme = StyleTheme::from_settings(&settings);
        assert!(theme.is_dark());
        assert_eq!(theme.marker_attributes(bold).foreground, None);

        let dimmed = StyleTheme::dark();
        assert_eq!(
            dimmed.marker_attributes(bold).foreground,
            Some(dimmed.colors().muted)
        );
        // Colored markers keep their color
        assert_eq!(
            dimmed.marker_attributes(list).foreground,
            Some(dimmed.colors().list_marker)
        );
    }
}
