//! Graphics items produced by placement

use crate::{Point, Rect, SceneTransform, Size, Translation};
use math::{DelimiterSide, ParenthesisStyle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a presentation node in the document-element arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a presentation area within one node, dense and zero-based
pub type AreaId = usize;

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> crate::Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || crate::RenderError::InvalidColor(hex.to_string());
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Border drawn around a graphics item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: Color,
    pub width: f64,
}

/// A delimiter glyph sized to the content it encloses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelimiterGlyph {
    /// Style the glyph was drawn in
    pub style: ParenthesisStyle,
    /// Opening or closing side
    pub side: DelimiterSide,
    /// Code point drawn
    pub glyph: char,
    /// Bounding size; the height always matches the requested height
    pub size: Size,
    /// Distance from the top of the glyph to the baseline
    pub ascent: f64,
}

impl DelimiterGlyph {
    /// Check the glyph against the height and ascent it was requested for
    pub fn verify(&self, height: f64, ascent: f64, tolerance: f64) -> crate::Result<()> {
        if (self.size.height - height).abs() > tolerance || (self.ascent - ascent).abs() > tolerance
        {
            return Err(crate::RenderError::GlyphMismatch {
                expected_height: height,
                expected_ascent: ascent,
                height: self.size.height,
                ascent: self.ascent,
            });
        }
        Ok(())
    }
}

/// A child of a graphics item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphicsChild {
    /// A delimiter glyph owned by the item
    Delimiter { glyph: DelimiterGlyph, origin: Point },
    /// Another node's area, placed at `bounds` in item-local coordinates.
    /// The referenced item is owned by that node, not by this item.
    Content {
        node: NodeId,
        area_id: AreaId,
        bounds: Rect,
    },
}

/// A graphics item exposed for one presentation area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsItem {
    /// Size of the item
    pub size: Size,
    /// Distance from the top of the item to its baseline
    pub ascent: f64,
    /// Owned delimiters and referenced content
    pub children: Vec<GraphicsChild>,
    /// Diagnostic border, if any
    pub border: Option<Border>,
    /// Item-local to scene mapping
    pub transform: Translation,
}

impl GraphicsItem {
    /// Create an empty item
    pub fn new(size: Size, ascent: f64) -> Self {
        Self {
            size,
            ascent,
            children: Vec::new(),
            border: None,
            transform: Translation::identity(),
        }
    }

    /// Local bounds (origin at the item's top-left corner)
    pub fn local_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::origin(), self.size)
    }

    /// Bounds in scene coordinates
    pub fn scene_bounds(&self) -> Rect {
        self.transform.map_rect(self.local_bounds())
    }

    /// Move the item's top-left corner to `origin` in scene coordinates
    pub fn set_scene_origin(&mut self, origin: Point) {
        self.transform = Translation::new(origin.x, origin.y);
    }

    pub fn push_delimiter(&mut self, glyph: DelimiterGlyph, origin: Point) {
        self.children.push(GraphicsChild::Delimiter { glyph, origin });
    }

    pub fn push_content(&mut self, node: NodeId, area_id: AreaId, bounds: Rect) {
        self.children.push(GraphicsChild::Content { node, area_id, bounds });
    }

    /// Owned delimiter glyphs, in insertion order
    pub fn delimiters(&self) -> impl Iterator<Item = (&DelimiterGlyph, Point)> {
        self.children.iter().filter_map(|child| match child {
            GraphicsChild::Delimiter { glyph, origin } => Some((glyph, *origin)),
            GraphicsChild::Content { .. } => None,
        })
    }

    /// Local bounds of a referenced content area
    pub fn content_bounds(&self, node: NodeId, area_id: AreaId) -> Option<Rect> {
        self.children.iter().find_map(|child| match child {
            GraphicsChild::Content {
                node: n,
                area_id: a,
                bounds,
            } if *n == node && *a == area_id => Some(*bounds),
            _ => None,
        })
    }

    /// All referenced content areas
    pub fn contents(&self) -> impl Iterator<Item = (NodeId, AreaId, Rect)> + '_ {
        self.children.iter().filter_map(|child| match child {
            GraphicsChild::Content { node, area_id, bounds } => Some((*node, *area_id, *bounds)),
            GraphicsChild::Delimiter { .. } => None,
        })
    }

    pub fn set_border(&mut self, border: Border) {
        self.border = Some(border);
    }

    pub fn clear_border(&mut self) {
        self.border = None;
    }

    /// Flatten the parts this item owns into scene-space render items
    pub fn render_items(&self) -> Vec<RenderItem> {
        let mut items: Vec<RenderItem> = self
            .delimiters()
            .map(|(glyph, origin)| RenderItem::Delimiter {
                glyph: glyph.glyph,
                bounds: self
                    .transform
                    .map_rect(Rect::from_origin_size(origin, glyph.size)),
            })
            .collect();

        if let Some(border) = self.border {
            items.push(RenderItem::Rectangle {
                bounds: self.scene_bounds(),
                fill: None,
                stroke: Some(border.color),
                stroke_width: border.width,
            });
        }

        items
    }
}

/// A drawable primitive in scene coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderItem {
    /// A delimiter glyph stretched to `bounds`
    Delimiter { glyph: char, bounds: Rect },
    /// A rectangle
    Rectangle {
        bounds: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(height: f64) -> DelimiterGlyph {
        DelimiterGlyph {
            style: ParenthesisStyle::Parenthesis,
            side: DelimiterSide::Left,
            glyph: '(',
            size: Size::new(4.0, height),
            ascent: height * 0.8,
        }
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(Color::from_hex("00000080").unwrap(), Color::rgba(0, 0, 0, 128));
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn test_glyph_verify() {
        let g = glyph(10.0);
        assert!(g.verify(10.0, 8.0, 1e-9).is_ok());
        assert!(matches!(
            g.verify(12.0, 8.0, 1e-9),
            Err(crate::RenderError::GlyphMismatch { .. })
        ));
    }

    #[test]
    fn test_item_children() {
        let mut item = GraphicsItem::new(Size::new(48.0, 10.0), 8.0);
        item.push_delimiter(glyph(10.0), Point::origin());
        item.push_content(NodeId(3), 0, Rect::new(4.0, 0.0, 40.0, 10.0));

        assert_eq!(item.delimiters().count(), 1);
        assert_eq!(item.content_bounds(NodeId(3), 0), Some(Rect::new(4.0, 0.0, 40.0, 10.0)));
        assert_eq!(item.content_bounds(NodeId(3), 1), None);
        assert_eq!(item.contents().count(), 1);
    }

    #[test]
    fn test_render_items_in_scene_space() {
        let mut item = GraphicsItem::new(Size::new(48.0, 10.0), 8.0);
        item.push_delimiter(glyph(10.0), Point::origin());
        item.set_scene_origin(Point::new(100.0, 50.0));
        item.set_border(Border {
            color: Color::rgb(255, 0, 0),
            width: 1.0,
        });

        let items = item.render_items();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            RenderItem::Delimiter {
                glyph: '(',
                bounds: Rect::new(100.0, 50.0, 4.0, 10.0)
            }
        );
        assert!(matches!(items[1], RenderItem::Rectangle { stroke: Some(_), .. }));

        item.clear_border();
        assert_eq!(item.render_items().len(), 1);
    }
}
