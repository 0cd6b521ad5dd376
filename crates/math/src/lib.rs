//! Math Crate - Grouping operator support for the technical document editor
//!
//! This crate provides the pieces of math support that layout depends on:
//! - The closed catalog of grouping operators and delimiter styles
//! - Format records and the lookup used to read style attributes
//! - The pure delimiter style selection function
//! - Math font metrics used to size delimiter glyphs

pub mod delimiters;
pub mod error;
pub mod format;
pub mod metrics;
pub mod model;

pub use delimiters::{delimiter_styles, resolve_delimiters, DelimiterPair};
pub use error::*;
pub use format::{
    Format, FormatCategory, FormatHandle, FormatLookup, FormatTable, PARENTHESIS_STYLE_ATTRIBUTE,
};
pub use metrics::MathFontMetrics;
pub use model::{DelimiterSide, GroupingKind, ParenthesisStyle, StyleRequest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_to_delimiters_pipeline() {
        let mut formats = FormatTable::new();
        let handle = formats.insert(
            Format::grouping().with_attribute(PARENTHESIS_STYLE_ATTRIBUTE, "braces"),
        );

        let pair = resolve_delimiters(GroupingKind::Parenthesis, Some(handle), &formats);
        assert_eq!(pair.left.glyph(DelimiterSide::Left), '{');
        assert_eq!(pair.right.glyph(DelimiterSide::Right), '}');
    }

    #[test]
    fn test_every_kind_has_glyphs() {
        for kind in GroupingKind::ALL {
            let pair = delimiter_styles(kind, StyleRequest::Default);
            assert_ne!(pair.left.glyph(DelimiterSide::Left), ' ');
            assert_ne!(pair.right.glyph(DelimiterSide::Right), ' ');
        }
    }
}
