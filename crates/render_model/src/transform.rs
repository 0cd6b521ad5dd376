//! Mapping from item-local to scene coordinates

use crate::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Maps node-local geometry to ambient scene coordinates
pub trait SceneTransform {
    /// Map a local point into the scene
    fn map_point(&self, local: Point) -> Point;

    /// Map a local rectangle into the scene
    fn map_rect(&self, local: Rect) -> Rect {
        let origin = self.map_point(local.origin());
        Rect::from_origin_size(origin, local.size())
    }
}

/// A pure translation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation {
    pub dx: f64,
    pub dy: f64,
}

impl Translation {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn identity() -> Self {
        Self::default()
    }
}

impl SceneTransform for Translation {
    fn map_point(&self, local: Point) -> Point {
        local.offset(self.dx, self.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_noop() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Translation::identity().map_rect(rect), rect);
    }

    #[test]
    fn test_translation_maps_rect() {
        let translation = Translation::new(104.0, 20.0);
        assert_eq!(
            translation.map_rect(Rect::new(0.0, 0.0, 10.0, 10.0)),
            Rect::new(104.0, 20.0, 10.0, 10.0)
        );
        assert_eq!(translation.map_point(Point::origin()), Point::new(104.0, 20.0));
    }
}
