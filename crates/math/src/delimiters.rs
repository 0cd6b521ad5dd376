//! Delimiter style selection
//!
//! A single pure function maps a grouping kind and the style its format asks
//! for onto the left and right delimiter styles.

use crate::format::{FormatHandle, FormatLookup};
use crate::model::{DelimiterSide, GroupingKind, ParenthesisStyle, StyleRequest};
use serde::{Deserialize, Serialize};

/// Left and right delimiter styles of a grouping operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterPair {
    pub left: ParenthesisStyle,
    pub right: ParenthesisStyle,
}

impl DelimiterPair {
    /// Same style on both sides
    pub fn symmetric(style: ParenthesisStyle) -> Self {
        Self {
            left: style,
            right: style,
        }
    }

    /// Style on the given side
    pub fn style(&self, side: DelimiterSide) -> ParenthesisStyle {
        match side {
            DelimiterSide::Left => self.left,
            DelimiterSide::Right => self.right,
        }
    }

    /// Whether both sides use the same style
    pub fn is_symmetric(&self) -> bool {
        self.left == self.right
    }
}

/// Select delimiter styles for a grouping kind.
///
/// Absolute value, floor and ceiling ignore the request. Nearest integer always
/// pairs a floor-style opening with a ceiling-style closing delimiter.
pub fn delimiter_styles(kind: GroupingKind, request: StyleRequest) -> DelimiterPair {
    match (kind, request) {
        (GroupingKind::NearestInteger, _) => DelimiterPair {
            left: ParenthesisStyle::Floor,
            right: ParenthesisStyle::Ceiling,
        },
        (kind, StyleRequest::Explicit(style)) if kind.honors_format() => DelimiterPair::symmetric(style),
        (kind, _) => DelimiterPair::symmetric(kind.default_style()),
    }
}

/// Resolve the delimiter styles of an element through its format handle
pub fn resolve_delimiters<L: FormatLookup + ?Sized>(
    kind: GroupingKind,
    format: Option<FormatHandle>,
    lookup: &L,
) -> DelimiterPair {
    let request = format
        .map(|handle| lookup.style_request(handle))
        .unwrap_or_default();
    delimiter_styles(kind, request)
}
