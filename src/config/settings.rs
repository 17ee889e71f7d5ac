//! User settings for the span engine
//!
//! This module defines the `Settings` struct that holds the user-configurable
//! options of the engine, with serde support for JSON persistence.

use crate::markdown::SyntaxVariant;
use log::warn;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Color palette used for syntax attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Engine preferences.
///
/// All fields have defaults via the `Default` trait and `#[serde(default)]`,
/// so partial files load cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Palette for content and marker attributes
    pub theme: Theme,

    /// Verify the characters removed by unwrap are the variant's markers
    pub strict_unwrap: bool,

    /// Render markers in a muted color instead of the content color
    pub dim_markers: bool,

    /// Variant names (e.g. "highlight", "heading6") that are switched off
    pub disabled_variants: Vec<String>,

    /// Suggested delay between an edit and the re-parse it triggers.
    /// The engine itself does not debounce; hosts read this value.
    pub reparse_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            strict_unwrap: true,
            dim_markers: true,
            disabled_variants: Vec::new(),
            reparse_debounce_ms: 150,
        }
    }
}

impl Settings {
    /// Maximum allowed debounce.
    pub const MAX_DEBOUNCE_MS: u64 = 5_000;

    /// Sanitize settings after loading a possibly hand-edited file.
    ///
    /// Clamps the debounce, drops disabled-variant names that do not name a
    /// variant, and rewrites the rest to their canonical lowercase names.
    pub fn sanitize(&mut self) {
        self.reparse_debounce_ms = self.reparse_debounce_ms.min(Self::MAX_DEBOUNCE_MS);

        self.disabled_variants = std::mem::take(&mut self.disabled_variants)
            .into_iter()
            .filter_map(|name| match name.parse::<SyntaxVariant>() {
                Ok(variant) => Some(variant.name().to_string()),
                Err(_) => {
                    warn!("Ignoring unknown syntax variant '{}' in settings", name);
                    None
                }
            })
            .collect();
        self.disabled_variants.sort();
        self.disabled_variants.dedup();
    }

    /// Deserialize and then sanitize.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Whether the given variant is switched off.
    pub fn is_disabled(&self, variant: SyntaxVariant) -> bool {
        let name = variant.name();
        self.disabled_variants.iter().any(|n| n == name)
    }

    /// Switch a variant on or off.
    pub fn set_disabled(&mut self, variant: SyntaxVariant, disabled: bool) {
        let name = variant.name();
        self.disabled_variants.retain(|n| n != name);
        if disabled {
            self.disabled_variants.push(name.to_string());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
