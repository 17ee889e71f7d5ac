//! Light Theme Configuration
//!
//! Span colors for the light palette.
//!
//! # Design Principles
//!
//! - Dark text on white, markers a step lighter than body text
//! - Code on a cool gray background
//! - Blue for headings and links

use egui::Color32;

use super::SpanColors;

/// The light palette.
pub fn span_colors() -> SpanColors {
    SpanColors {
        text: Color32::from_rgb(30, 30, 30),
        muted: Color32::from_rgb(160, 160, 160),
        heading: Color32::from_rgb(0, 100, 180),
        link: Color32::from_rgb(0, 100, 180),
        code: Color32::from_rgb(80, 80, 80),
        code_bg: Color32::from_rgb(233, 236, 239),
        highlight_bg: Color32::from_rgb(255, 240, 140),
        blockquote: Color32::from_rgb(100, 100, 100),
        list_marker: Color32::from_rgb(100, 100, 100),
        horizontal_rule: Color32::from_rgb(200, 200, 200),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_text_is_dark() {
        let colors = span_colors();
        assert!(colors.text.r() < 128);
        assert!(colors.code_bg.r() > 200);
    }

    #[test]
    fn test_markers_lighter_than_text() {
        let colors = span_colors();
        assert!(colors.muted.r() > colors.text.r());
    }
}
