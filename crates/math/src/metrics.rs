//! Math font metrics used to size delimiters

use crate::model::ParenthesisStyle;
use serde::{Deserialize, Serialize};

/// Math font metrics used for layout calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathFontMetrics {
    /// Base font size in points
    pub font_size: f64,
    /// Ascent above baseline
    pub ascent: f64,
    /// Descent below baseline
    pub descent: f64,
    /// Width of a typical character
    pub char_width: f64,
    /// Height of the math axis above the baseline
    pub axis_height: f64,
    /// Stroke thickness of delimiter glyphs
    pub delimiter_rule_thickness: f64,
    /// How much of the content height a delimiter must cover before it grows wider
    pub delimiter_factor: f64,
}

impl Default for MathFontMetrics {
    fn default() -> Self {
        Self::for_size(11.0)
    }
}

impl MathFontMetrics {
    /// Create metrics for a given font size
    pub fn for_size(font_size: f64) -> Self {
        // These are approximate values based on typical math fonts
        let em = font_size;
        Self {
            font_size,
            ascent: em * 0.8,
            descent: em * 0.2,
            char_width: em * 0.5,
            axis_height: em * 0.25,
            delimiter_rule_thickness: em * 0.04,
            delimiter_factor: 0.9,
        }
    }

    /// Metrics for content rendered at `relative_scale` times the base size
    pub fn scaled(&self, relative_scale: f64) -> Self {
        Self::for_size(self.font_size * relative_scale)
    }

    /// Height of a single unstretched line of text
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent
    }

    /// Natural (one line tall) width of a delimiter glyph
    pub fn delimiter_base_width(&self, style: ParenthesisStyle) -> f64 {
        let factor = match style {
            ParenthesisStyle::Parenthesis => 0.5,
            ParenthesisStyle::Brackets => 0.45,
            ParenthesisStyle::Braces => 0.6,
            ParenthesisStyle::AbsoluteValue => 0.3,
            ParenthesisStyle::Floor | ParenthesisStyle::Ceiling => 0.45,
        };
        self.char_width * factor + self.delimiter_rule_thickness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_scaling() {
        let metrics = MathFontMetrics::for_size(12.0);
        let half = metrics.scaled(0.5);
        assert!((half.font_size - 6.0).abs() < 1e-9);
        assert!(half.char_width < metrics.char_width);
    }

    #[test]
    fn test_delimiter_widths_positive() {
        let metrics = MathFontMetrics::default();
        for style in ParenthesisStyle::ALL {
            assert!(metrics.delimiter_base_width(style) > 0.0);
        }
        assert!(
            metrics.delimiter_base_width(ParenthesisStyle::AbsoluteValue)
                < metrics.delimiter_base_width(ParenthesisStyle::Braces)
        );
    }

    #[test]
    fn test_line_height() {
        let metrics = MathFontMetrics::for_size(10.0);
        assert!((metrics.line_height() - 10.0).abs() < 1e-9);
    }
}
