//! Error types for the math crate

use thiserror::Error;

/// Errors that can occur in math operations
#[derive(Error, Debug)]
pub enum MathError {
    /// A parenthesis style name that no delimiter glyph pair exists for
    #[error("Unknown parenthesis style: {0}")]
    UnknownParenthesisStyle(String),

    /// A grouping operator name that is not part of the catalog
    #[error("Unknown grouping kind: {0}")]
    UnknownGroupingKind(String),

    /// Format data could not be decoded
    #[error("Format decoding error: {0}")]
    FormatDecode(#[from] serde_json::Error),
}

/// Result type for math operations
pub type MathResult<T> = Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::UnknownParenthesisStyle("chevron".to_string());
        assert_eq!(err.to_string(), "Unknown parenthesis style: chevron");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let math_err: MathError = json_err.into();
        assert!(matches!(math_err, MathError::FormatDecode(_)));
    }
}
