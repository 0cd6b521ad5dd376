//! Render Model - Scene-side types for placed content
//!
//! This crate holds the value types that placement produces and the
//! collaborator contracts it consumes: geometry, composite graphics items,
//! delimiter glyphs and the factory that sizes them, scene transforms, and
//! diagnostic border styling.

mod diagnostic;
mod error;
mod geometry;
mod glyph;
mod render_item;
mod transform;

pub use diagnostic::*;
pub use error::*;
pub use geometry::*;
pub use glyph::*;
pub use render_item::*;
pub use transform::*;
