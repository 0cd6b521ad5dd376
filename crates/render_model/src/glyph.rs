//! Delimiter glyph factory
//!
//! Layout only knows a glyph's bounding geometry. The factory is asked for a
//! glyph of an exact height and ascent and reports back the width it chose.

use crate::{DelimiterGlyph, Size};
use math::{DelimiterSide, MathFontMetrics, ParenthesisStyle};

/// Creates delimiter glyphs sized to enclosed content
pub trait GlyphFactory {
    /// Create a glyph whose height and ascent equal the requested values
    fn delimiter(
        &self,
        style: ParenthesisStyle,
        side: DelimiterSide,
        height: f64,
        ascent: f64,
        relative_scale: f64,
    ) -> DelimiterGlyph;
}

/// Glyph factory that derives widths from math font metrics
#[derive(Debug, Clone, Default)]
pub struct MetricGlyphFactory {
    metrics: MathFontMetrics,
}

impl MetricGlyphFactory {
    /// Upper bound on how much taller delimiters widen
    const MAX_GROWTH: f64 = 2.0;

    pub fn new(metrics: MathFontMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &MathFontMetrics {
        &self.metrics
    }

    fn width_for(&self, style: ParenthesisStyle, height: f64, relative_scale: f64) -> f64 {
        let metrics = self.metrics.scaled(relative_scale);
        let line_height = metrics.line_height();
        let growth = if line_height > 0.0 {
            let covered = height * metrics.delimiter_factor / line_height;
            (1.0 + 0.1 * (covered - 1.0).max(0.0)).min(Self::MAX_GROWTH)
        } else {
            1.0
        };
        metrics.delimiter_base_width(style) * growth
    }
}

impl GlyphFactory for MetricGlyphFactory {
    fn delimiter(
        &self,
        style: ParenthesisStyle,
        side: DelimiterSide,
        height: f64,
        ascent: f64,
        relative_scale: f64,
    ) -> DelimiterGlyph {
        DelimiterGlyph {
            style,
            side,
            glyph: style.glyph(side),
            size: Size::new(self.width_for(style, height, relative_scale), height),
            ascent,
        }
    }
}
