//! Error types for render model

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Delimiter glyph mismatch: expected height {expected_height} ascent {expected_ascent}, got height {height} ascent {ascent}")]
    GlyphMismatch {
        expected_height: f64,
        expected_ascent: f64,
        height: f64,
        ascent: f64,
    },
}

pub type Result<T> = std::result::Result<T, RenderError>;
