//! Format records attached to document elements
//!
//! Formats are opaque to the layout code: an element carries a [`FormatHandle`]
//! and asks a [`FormatLookup`] for the delimiter style it should use.

use crate::error::MathResult;
use crate::model::StyleRequest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Attribute key holding the requested parenthesis style
pub const PARENTHESIS_STYLE_ATTRIBUTE: &str = "parenthesis_style";

/// Opaque handle to a format record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatHandle(pub u32);

/// Capability set a format record was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormatCategory {
    /// Grouping operators; the only category carrying a parenthesis style
    Grouping,
    /// Character formatting for text runs
    #[default]
    Character,
    /// Numeric value display formatting
    Value,
    /// Plot formatting
    Plot,
}

/// A format record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Format {
    /// Which capability this format provides
    pub category: FormatCategory,
    /// Free-form string attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Format {
    /// Create a grouping format with no attributes
    pub fn grouping() -> Self {
        Self {
            category: FormatCategory::Grouping,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a format of the given category
    pub fn with_category(category: FormatCategory) -> Self {
        Self {
            category,
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Decode a format record from JSON
    pub fn from_json(json: &str) -> MathResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether this record carries the grouping-style capability
    pub fn supports_grouping(&self) -> bool {
        self.category == FormatCategory::Grouping
    }

    /// The parenthesis style this format asks for.
    ///
    /// Formats without the grouping capability, without the attribute, or with an
    /// unparseable value all yield [`StyleRequest::Default`].
    pub fn style_request(&self) -> StyleRequest {
        if !self.supports_grouping() {
            tracing::debug!(category = ?self.category, "format lacks grouping style, using default");
            return StyleRequest::Default;
        }

        match self.attributes.get(PARENTHESIS_STYLE_ATTRIBUTE) {
            None => StyleRequest::Default,
            Some(value) => match value.parse() {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!(%value, error = %e, "malformed parenthesis style, using default");
                    StyleRequest::Default
                }
            },
        }
    }
}

/// Resolves format handles to format records
pub trait FormatLookup {
    /// Get the format record for a handle
    fn format(&self, handle: FormatHandle) -> Option<&Format>;

    /// Get the style a handle asks for, falling back to the default
    fn style_request(&self, handle: FormatHandle) -> StyleRequest {
        self.format(handle)
            .map(Format::style_request)
            .unwrap_or_default()
    }
}

/// In-memory table of formats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatTable {
    formats: HashMap<FormatHandle, Format>,
    next_handle: u32,
}

impl FormatTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a format and return its handle
    pub fn insert(&mut self, format: Format) -> FormatHandle {
        let handle = FormatHandle(self.next_handle);
        self.next_handle += 1;
        self.formats.insert(handle, format);
        handle
    }

    /// Replace the format behind an existing handle
    pub fn update(&mut self, handle: FormatHandle, format: Format) -> Option<Format> {
        self.formats.insert(handle, format)
    }

    /// Number of stored formats
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl FormatLookup for FormatTable {
    fn format(&self, handle: FormatHandle) -> Option<&Format> {
        self.formats.get(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParenthesisStyle;

    #[test]
    fn test_style_request_from_attribute() {
        let format = Format::grouping().with_attribute(PARENTHESIS_STYLE_ATTRIBUTE, "braces");
        assert_eq!(
            format.style_request(),
            StyleRequest::Explicit(ParenthesisStyle::Braces)
        );
    }

    #[test]
    fn test_missing_attribute_is_default() {
        assert_eq!(Format::grouping().style_request(), StyleRequest::Default);
    }

    #[test]
    fn test_malformed_attribute_is_default() {
        let format = Format::grouping().with_attribute(PARENTHESIS_STYLE_ATTRIBUTE, "chevron");
        assert_eq!(format.style_request(), StyleRequest::Default);
    }

    #[test]
    fn test_non_grouping_format_is_default() {
        let format = Format::with_category(FormatCategory::Value)
            .with_attribute(PARENTHESIS_STYLE_ATTRIBUTE, "brackets");
        assert_eq!(format.style_request(), StyleRequest::Default);
    }

    #[test]
    fn test_table_lookup() {
        let mut table = FormatTable::new();
        let handle = table.insert(
            Format::grouping().with_attribute(PARENTHESIS_STYLE_ATTRIBUTE, "brackets"),
        );
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.style_request(handle),
            StyleRequest::Explicit(ParenthesisStyle::Brackets)
        );
        assert_eq!(table.style_request(FormatHandle(99)), StyleRequest::Default);
    }

    #[test]
    fn test_table_update_replaces_style() {
        let mut table = FormatTable::new();
        let handle = table.insert(Format::grouping());
        let previous = table.update(
            handle,
            Format::grouping().with_attribute(PARENTHESIS_STYLE_ATTRIBUTE, "parenthesis"),
        );
        assert!(previous.is_some());
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.style_request(handle),
            StyleRequest::Explicit(ParenthesisStyle::Parenthesis)
        );
    }

    #[test]
    fn test_format_from_json() {
        let format = Format::from_json(
            r#"{"category":"grouping","attributes":{"parenthesis_style":"default"}}"#,
        )
        .unwrap();
        assert!(format.supports_grouping());
        assert_eq!(format.style_request(), StyleRequest::Default);
        assert!(Format::from_json("{").is_err());
    }
}
