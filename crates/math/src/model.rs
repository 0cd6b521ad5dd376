//! Grouping operator model
//!
//! This module defines the closed set of grouping operators (parenthesis,
//! brackets, braces, absolute value, floor, ceiling, nearest integer) and the
//! delimiter styles used to draw them.

use crate::error::{MathError, MathResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Parenthesis Style
// =============================================================================

/// Style of a single delimiter glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParenthesisStyle {
    /// Round parenthesis: ( )
    #[default]
    Parenthesis,
    /// Square brackets: [ ]
    Brackets,
    /// Curly braces: { }
    Braces,
    /// Vertical bars: | |
    AbsoluteValue,
    /// Floor half-brackets: ⌊ ⌋
    Floor,
    /// Ceiling half-brackets: ⌈ ⌉
    Ceiling,
}

/// Which side of the enclosed content a delimiter sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelimiterSide {
    /// Opening delimiter, drawn before the content
    Left,
    /// Closing delimiter, drawn after the content
    Right,
}

impl ParenthesisStyle {
    /// All styles, in catalog order
    pub const ALL: [ParenthesisStyle; 6] = [
        ParenthesisStyle::Parenthesis,
        ParenthesisStyle::Brackets,
        ParenthesisStyle::Braces,
        ParenthesisStyle::AbsoluteValue,
        ParenthesisStyle::Floor,
        ParenthesisStyle::Ceiling,
    ];

    /// The code point drawn for this style on the given side
    pub fn glyph(self, side: DelimiterSide) -> char {
        match (self, side) {
            (ParenthesisStyle::Parenthesis, DelimiterSide::Left) => '(',
            (ParenthesisStyle::Parenthesis, DelimiterSide::Right) => ')',
            (ParenthesisStyle::Brackets, DelimiterSide::Left) => '[',
            (ParenthesisStyle::Brackets, DelimiterSide::Right) => ']',
            (ParenthesisStyle::Braces, DelimiterSide::Left) => '{',
            (ParenthesisStyle::Braces, DelimiterSide::Right) => '}',
            (ParenthesisStyle::AbsoluteValue, _) => '|',
            (ParenthesisStyle::Floor, DelimiterSide::Left) => '\u{230A}',
            (ParenthesisStyle::Floor, DelimiterSide::Right) => '\u{230B}',
            (ParenthesisStyle::Ceiling, DelimiterSide::Left) => '\u{2308}',
            (ParenthesisStyle::Ceiling, DelimiterSide::Right) => '\u{2309}',
        }
    }

    /// Name used in format attributes
    pub fn name(self) -> &'static str {
        match self {
            ParenthesisStyle::Parenthesis => "parenthesis",
            ParenthesisStyle::Brackets => "brackets",
            ParenthesisStyle::Braces => "braces",
            ParenthesisStyle::AbsoluteValue => "absolute_value",
            ParenthesisStyle::Floor => "floor",
            ParenthesisStyle::Ceiling => "ceiling",
        }
    }
}

impl fmt::Display for ParenthesisStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParenthesisStyle {
    type Err = MathError;

    fn from_str(s: &str) -> MathResult<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        ParenthesisStyle::ALL
            .into_iter()
            .find(|style| style.name() == normalized)
            .ok_or_else(|| MathError::UnknownParenthesisStyle(s.to_string()))
    }
}

// =============================================================================
// Style Request
// =============================================================================

/// The parenthesis style a format asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StyleRequest {
    /// Use whatever the grouping operator draws by default
    #[default]
    Default,
    /// Use an explicit style
    Explicit(ParenthesisStyle),
}

impl FromStr for StyleRequest {
    type Err = MathError;

    fn from_str(s: &str) -> MathResult<Self> {
        if s.trim().eq_ignore_ascii_case("default") {
            Ok(StyleRequest::Default)
        } else {
            s.parse().map(StyleRequest::Explicit)
        }
    }
}

// =============================================================================
// Grouping Kind
// =============================================================================

/// Grouping operators that enclose a single sub-expression in sized delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKind {
    /// |x|
    AbsoluteValue,
    /// ⌊x⌋
    Floor,
    /// ⌈x⌉
    Ceiling,
    /// ⌊x⌉
    NearestInteger,
    /// (x), style overridable by format
    Parenthesis,
    /// [x], style overridable by format
    Brackets,
    /// {x}, style overridable by format
    Braces,
}

impl GroupingKind {
    /// All grouping kinds, in catalog order
    pub const ALL: [GroupingKind; 7] = [
        GroupingKind::AbsoluteValue,
        GroupingKind::Floor,
        GroupingKind::Ceiling,
        GroupingKind::NearestInteger,
        GroupingKind::Parenthesis,
        GroupingKind::Brackets,
        GroupingKind::Braces,
    ];

    /// Whether the attached format may change the delimiter style
    pub fn honors_format(self) -> bool {
        matches!(
            self,
            GroupingKind::Parenthesis | GroupingKind::Brackets | GroupingKind::Braces
        )
    }

    /// Style used when the format asks for the default
    pub fn default_style(self) -> ParenthesisStyle {
        match self {
            GroupingKind::AbsoluteValue => ParenthesisStyle::AbsoluteValue,
            GroupingKind::Floor => ParenthesisStyle::Floor,
            GroupingKind::Ceiling => ParenthesisStyle::Ceiling,
            GroupingKind::NearestInteger => ParenthesisStyle::Floor,
            GroupingKind::Parenthesis => ParenthesisStyle::Parenthesis,
            GroupingKind::Brackets => ParenthesisStyle::Brackets,
            GroupingKind::Braces => ParenthesisStyle::Braces,
        }
    }

    /// Name used in serialized documents
    pub fn name(self) -> &'static str {
        match self {
            GroupingKind::AbsoluteValue => "absolute_value",
            GroupingKind::Floor => "floor",
            GroupingKind::Ceiling => "ceiling",
            GroupingKind::NearestInteger => "nearest_integer",
            GroupingKind::Parenthesis => "parenthesis",
            GroupingKind::Brackets => "brackets",
            GroupingKind::Braces => "braces",
        }
    }
}

impl fmt::Display for GroupingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GroupingKind {
    type Err = MathError;

    fn from_str(s: &str) -> MathResult<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        GroupingKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| MathError::UnknownGroupingKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_per_side() {
        assert_eq!(ParenthesisStyle::Parenthesis.glyph(DelimiterSide::Left), '(');
        assert_eq!(ParenthesisStyle::Parenthesis.glyph(DelimiterSide::Right), ')');
        assert_eq!(ParenthesisStyle::Floor.glyph(DelimiterSide::Left), '⌊');
        assert_eq!(ParenthesisStyle::Floor.glyph(DelimiterSide::Right), '⌋');
        assert_eq!(ParenthesisStyle::Ceiling.glyph(DelimiterSide::Right), '⌉');
        assert_eq!(
            ParenthesisStyle::AbsoluteValue.glyph(DelimiterSide::Left),
            ParenthesisStyle::AbsoluteValue.glyph(DelimiterSide::Right)
        );
    }

    #[test]
    fn test_style_names_parse_back() {
        for style in ParenthesisStyle::ALL {
            assert_eq!(style.name().parse::<ParenthesisStyle>().unwrap(), style);
        }
        assert_eq!(" Brackets ".parse::<ParenthesisStyle>().unwrap(), ParenthesisStyle::Brackets);
        assert!("chevron".parse::<ParenthesisStyle>().is_err());
    }

    #[test]
    fn test_style_request_parse() {
        assert_eq!("default".parse::<StyleRequest>().unwrap(), StyleRequest::Default);
        assert_eq!("DEFAULT".parse::<StyleRequest>().unwrap(), StyleRequest::Default);
        assert_eq!(
            "braces".parse::<StyleRequest>().unwrap(),
            StyleRequest::Explicit(ParenthesisStyle::Braces)
        );
        assert!("".parse::<StyleRequest>().is_err());
    }

    #[test]
    fn test_grouping_kind_defaults() {
        assert_eq!(GroupingKind::Parenthesis.default_style(), ParenthesisStyle::Parenthesis);
        assert_eq!(GroupingKind::Brackets.default_style(), ParenthesisStyle::Brackets);
        assert_eq!(GroupingKind::Braces.default_style(), ParenthesisStyle::Braces);
        assert!(GroupingKind::Braces.honors_format());
        assert!(!GroupingKind::NearestInteger.honors_format());
    }

    #[test]
    fn test_grouping_kind_serde() {
        let json = serde_json::to_string(&GroupingKind::NearestInteger).unwrap();
        assert_eq!(json, "\"nearest_integer\"");
        let kind: GroupingKind = serde_json::from_str("\"absolute_value\"").unwrap();
        assert_eq!(kind, GroupingKind::AbsoluteValue);
        assert_eq!("ceiling".parse::<GroupingKind>().unwrap(), GroupingKind::Ceiling);
    }
}
