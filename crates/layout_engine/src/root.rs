//! Document root negotiator
//!
//! The [`RootNegotiator`] is the ultimate ancestor of every placement: it fills
//! fixed-width lines with the areas of the top-level presentations, then stacks
//! the lines and hands each area its final scene position. Content that still
//! overflows after its own retries is placed again at the minimum scale with
//! every allocation granted, so nothing is ever dropped from the document.

use crate::arena::PresentationArena;
use crate::negotiator::{
    AreaGrant, AreaRequest, ChildId, PlacementNegotiator, PlacementRequest, PlacementStatus,
    SpaceQualifier, WIDTH_EPSILON,
};
use crate::{PlacementError, Result};
use render_model::{AreaId, NodeId, Point, Size};
use serde::{Deserialize, Serialize};

/// Configuration for the root line layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Width of every line
    pub line_width: f64,
    /// Multiplier applied to each line's natural height
    pub line_spacing: f64,
    /// Scene position of the top-left corner of the first line
    pub origin: Point,
    /// Scale overflowing content is forced to
    pub minimum_relative_scale: f64,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            line_width: 500.0,
            line_spacing: 1.0,
            origin: Point::origin(),
            minimum_relative_scale: 0.5,
        }
    }
}

impl RootConfig {
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_minimum_relative_scale(mut self, scale: f64) -> Self {
        self.minimum_relative_scale = scale;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.line_width > 0.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "line_width must be positive, got {}",
                self.line_width
            )));
        }
        if !(self.line_spacing > 0.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "line_spacing must be positive, got {}",
                self.line_spacing
            )));
        }
        if !(self.minimum_relative_scale > 0.0) {
            return Err(PlacementError::InvalidConfig(format!(
                "minimum_relative_scale must be positive, got {}",
                self.minimum_relative_scale
            )));
        }
        Ok(())
    }
}

/// An area granted by the root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedArea {
    /// Index of the top-level presentation
    pub child_id: ChildId,
    pub area_id: AreaId,
    pub size: Size,
    pub ascent: f64,
    pub line: usize,
    /// Offset from the start of the line
    pub x: f64,
    /// Final scene position, set once all lines are known
    pub origin: Point,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    placements: usize,
    line: usize,
    line_used: f64,
    line_areas: usize,
}

/// Lays top-level presentations out on lines of fixed width
#[derive(Debug, Clone, Default)]
pub struct RootNegotiator {
    config: RootConfig,
    placements: Vec<PlacedArea>,
    line: usize,
    line_used: f64,
    line_areas: usize,
    accept_all: bool,
    line_tops: Vec<f64>,
    content_height: f64,
}

impl RootNegotiator {
    pub fn new(config: RootConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Areas granted by the last layout, in allocation order
    pub fn placements(&self) -> &[PlacedArea] {
        &self.placements
    }

    /// Number of lines holding at least one area
    pub fn line_count(&self) -> usize {
        self.placements.iter().map(|p| p.line + 1).max().unwrap_or(0)
    }

    /// Scene y of the top of each line
    pub fn line_tops(&self) -> &[f64] {
        &self.line_tops
    }

    /// Total height of all lines
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Place `roots` from scratch at `relative_scale`.
    ///
    /// One status is returned per root. An `Overflow` status means the root was
    /// placed at the minimum scale instead.
    pub fn layout(
        &mut self,
        arena: &mut PresentationArena,
        roots: &[NodeId],
        relative_scale: f64,
    ) -> Result<Vec<PlacementStatus>> {
        self.run(arena, roots, relative_scale, false)
    }

    /// Place `roots` again, replaying known geometry where the nodes allow it
    pub fn relayout(
        &mut self,
        arena: &mut PresentationArena,
        roots: &[NodeId],
        relative_scale: f64,
    ) -> Result<Vec<PlacementStatus>> {
        self.run(arena, roots, relative_scale, true)
    }

    fn run(
        &mut self,
        arena: &mut PresentationArena,
        roots: &[NodeId],
        relative_scale: f64,
        replay: bool,
    ) -> Result<Vec<PlacementStatus>> {
        self.clear();
        tracing::debug!(roots = roots.len(), relative_scale, replay, "root layout");

        let mut statuses = Vec::with_capacity(roots.len());
        for (child_id, &node) in roots.iter().enumerate() {
            let request = PlacementRequest::new(child_id)
                .with_next_sibling(roots.get(child_id + 1).copied())
                .with_line_spacing(self.config.line_spacing)
                .with_relative_scale(relative_scale);

            let checkpoint = self.checkpoint();
            let status = if replay {
                arena.redo_placement(node, self, &request.redo(0))?
            } else {
                arena.recalculate_placement(node, self, &request)?
            };

            if let PlacementStatus::Overflow { required, available } = status {
                let scale = self.config.minimum_relative_scale.min(relative_scale);
                tracing::warn!(node = %node, ?required, ?available, scale, "overflowing content forced onto the page");
                self.restore(checkpoint);
                self.accept_all = true;
                let forced = arena.recalculate_placement(node, self, &request.with_relative_scale(scale));
                self.accept_all = false;
                forced?;
            }
            statuses.push(status);
        }

        self.finish(arena, roots)?;
        Ok(statuses)
    }

    fn clear(&mut self) {
        self.placements.clear();
        self.line = 0;
        self.line_used = 0.0;
        self.line_areas = 0;
        self.accept_all = false;
        self.line_tops.clear();
        self.content_height = 0.0;
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            placements: self.placements.len(),
            line: self.line,
            line_used: self.line_used,
            line_areas: self.line_areas,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.placements.truncate(checkpoint.placements);
        self.line = checkpoint.line;
        self.line_used = checkpoint.line_used;
        self.line_areas = checkpoint.line_areas;
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.line_used = 0.0;
        self.line_areas = 0;
    }

    fn remaining(&self) -> f64 {
        (self.config.line_width - self.line_used).max(0.0)
    }

    /// Stack the lines and position every granted area
    fn finish(&mut self, arena: &mut PresentationArena, roots: &[NodeId]) -> Result<()> {
        let line_count = self.line_count();
        let mut extents = vec![(0.0f64, 0.0f64); line_count];
        for placed in &self.placements {
            let (ascent, descent) = &mut extents[placed.line];
            *ascent = ascent.max(placed.ascent);
            *descent = descent.max((placed.size.height - placed.ascent).max(0.0));
        }

        let mut y = self.config.origin.y;
        self.line_tops = Vec::with_capacity(line_count);
        for (ascent, descent) in &extents {
            self.line_tops.push(y);
            y += (ascent + descent) * self.config.line_spacing;
        }
        self.content_height = y - self.config.origin.y;

        for placed in &mut self.placements {
            let line_ascent = extents[placed.line].0;
            placed.origin = Point::new(
                self.config.origin.x + placed.x,
                self.line_tops[placed.line] + line_ascent - placed.ascent,
            );
        }

        for placed in &self.placements {
            let Some(&node) = roots.get(placed.child_id) else {
                tracing::warn!(child_id = placed.child_id, "area from unknown root child");
                continue;
            };
            arena.position_area(node, placed.area_id, placed.origin)?;
        }
        Ok(())
    }
}

impl PlacementNegotiator for RootNegotiator {
    fn request_area(&mut self, _child_id: ChildId) -> AreaRequest {
        let qualifier = if self.line_areas == 0 {
            SpaceQualifier::MaximumWidth
        } else {
            SpaceQualifier::CurrentAvailable
        };
        AreaRequest::new(Size::new(self.remaining(), f64::INFINITY), qualifier)
    }

    fn allocate_area(
        &mut self,
        child_id: ChildId,
        area_id: AreaId,
        size: Size,
        ascent: f64,
        _can_stretch: bool,
    ) -> AreaGrant {
        let fits = size.width <= self.remaining() + WIDTH_EPSILON;
        if !fits {
            if !self.accept_all {
                return AreaGrant::Insufficient {
                    available: Size::new(self.remaining(), f64::INFINITY),
                };
            }
            if self.line_areas > 0 {
                self.new_line();
            }
        }

        self.placements.push(PlacedArea {
            child_id,
            area_id,
            size,
            ascent,
            line: self.line,
            x: self.line_used,
            origin: Point::origin(),
        });
        self.line_used += size.width;
        self.line_areas += 1;
        AreaGrant::Granted
    }

    fn area_insufficient(&mut self, _child_id: ChildId, _size: Size) {
        if self.line_areas > 0 {
            self.new_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{Fragment, FragmentPresentation};

    #[test]
    fn test_config_validation() {
        assert!(RootConfig::default().validate().is_ok());
        assert!(RootConfig::from_json(r#"{"line_width": 0}"#).is_err());
        let config = RootConfig::from_json(r#"{"line_width": 120, "origin": {"x": 10, "y": 20}}"#).unwrap();
        assert_eq!(config.origin, Point::new(10.0, 20.0));
        assert_eq!(config.line_spacing, 1.0);
    }

    #[test]
    fn test_request_qualifiers() {
        let mut root = RootNegotiator::new(RootConfig::default().with_line_width(100.0));
        assert_eq!(root.request_area(0).qualifier, SpaceQualifier::MaximumWidth);

        root.allocate_area(0, 0, Size::new(40.0, 10.0), 8.0, false);
        let offered = root.request_area(0);
        assert_eq!(offered.qualifier, SpaceQualifier::CurrentAvailable);
        assert_eq!(offered.available.width, 60.0);

        assert!(matches!(
            root.allocate_area(0, 1, Size::new(70.0, 10.0), 8.0, false),
            AreaGrant::Insufficient { .. }
        ));
        root.area_insufficient(0, Size::new(70.0, 10.0));
        assert_eq!(root.request_area(0).available.width, 100.0);
    }

    #[test]
    fn test_layout_positions_lines() {
        let mut arena = PresentationArena::new();
        let a = arena.insert(FragmentPresentation::new(vec![Fragment::new(60.0, 10.0, 8.0)]));
        let b = arena.insert(FragmentPresentation::new(vec![Fragment::new(60.0, 12.0, 9.0)]));
        let mut root = RootNegotiator::new(
            RootConfig::default()
                .with_line_width(100.0)
                .with_origin(Point::new(5.0, 5.0)),
        );

        let statuses = root.layout(&mut arena, &[a, b], 1.0).unwrap();
        assert!(statuses.iter().all(PlacementStatus::is_placed));
        assert_eq!(root.line_count(), 2);
        assert_eq!(root.line_tops(), &[5.0, 15.0]);
        assert_eq!(root.content_height(), 22.0);
        assert_eq!(
            arena.graphics_item(b, 0).unwrap().scene_bounds().origin(),
            Point::new(5.0, 15.0)
        );
    }

    #[test]
    fn test_line_baselines_align() {
        let mut arena = PresentationArena::new();
        let small = arena.insert(FragmentPresentation::new(vec![Fragment::new(10.0, 10.0, 8.0)]));
        let tall = arena.insert(FragmentPresentation::new(vec![Fragment::new(10.0, 20.0, 16.0)]));
        let mut root = RootNegotiator::new(RootConfig::default());

        root.layout(&mut arena, &[small, tall], 1.0).unwrap();
        let placements = root.placements();
        assert_eq!(placements[0].origin, Point::new(0.0, 8.0));
        assert_eq!(placements[1].origin, Point::new(10.0, 0.0));
    }
}
