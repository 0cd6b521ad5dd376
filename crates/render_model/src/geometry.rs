//! Geometry value types in scene coordinates

use serde::{Deserialize, Serialize};

/// A position in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A size with width and height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative size {width}x{height}");
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Multiply both dimensions by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Whether both dimensions fit within `other`
    pub fn fits_within(&self, other: &Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Compare with a tolerance on both dimensions
    pub fn approx_eq(&self, other: &Size, epsilon: f64) -> bool {
        (self.width - other.width).abs() <= epsilon && (self.height - other.height).abs() <= epsilon
    }
}

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Rect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_operations() {
        let p = Point::new(10.0, 20.0);
        let q = p.offset(5.0, -5.0);
        assert_eq!(q, Point::new(15.0, 15.0));
        assert_eq!(Point::origin(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_size_operations() {
        let size = Size::new(40.0, 10.0);
        assert!(size.fits_within(&Size::new(60.0, 12.0)));
        assert!(!size.fits_within(&Size::new(39.0, 12.0)));
        assert!(size.scaled(0.5).approx_eq(&Size::new(20.0, 5.0), 1e-9));
        assert!(Size::zero().is_empty());
    }

    #[test]
    fn test_rect_operations() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert!(rect.contains(50.0, 30.0));
        assert!(!rect.contains(110.0, 30.0));
        assert_eq!(rect.translate(5.0, 5.0).origin(), Point::new(15.0, 25.0));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 5.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, -5.0, 25.0, 15.0));
    }

    fn any_rect() -> impl Strategy<Value = Rect> {
        (-100.0f64..100.0, -100.0f64..100.0, 0.0f64..50.0, 0.0f64..50.0)
            .prop_map(|(x, y, width, height)| Rect::new(x, y, width, height))
    }

    proptest! {
        #[test]
        fn prop_union_covers_both(a in any_rect(), b in any_rect()) {
            let u = a.union(&b);
            for r in [a, b] {
                prop_assert!(u.x <= r.x && u.y <= r.y);
                prop_assert!(u.right() >= r.right() - 1e-9 && u.bottom() >= r.bottom() - 1e-9);
            }
        }
    }
}
