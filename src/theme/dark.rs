//! Dark Theme Configuration
//!
//! Span colors for the dark palette.

use egui::Color32;

use super::SpanColors;

/// The dark palette.
pub fn span_colors() -> SpanColors {
    SpanColors {
        text: Color32::from_rgb(220, 220, 220),
        muted: Color32::from_rgb(100, 100, 100),
        heading: Color32::from_rgb(100, 180, 255),
        link: Color32::from_rgb(100, 180, 255),
        code: Color32::from_rgb(200, 200, 150),
        code_bg: Color32::from_rgb(35, 39, 46),
        highlight_bg: Color32::from_rgb(90, 80, 30),
        blockquote: Color32::from_rgb(180, 180, 180),
        list_marker: Color32::from_rgb(150, 150, 150),
        horizontal_rule: Color32::from_rgb(80, 80, 80),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_text_is_light() {
        let colors = span_colors();
        assert!(colors.text.r() > 128);
        assert!(colors.code_bg.r() < 64);
    }
}
