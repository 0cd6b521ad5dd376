//! Leaf content
//!
//! A [`FragmentPresentation`] holds a run of pre-measured fragments (glyph
//! clusters, numbers, small images) and places them greedily, one area per
//! fragment, moving to a new line whenever the room left on the current one is
//! too small.

use crate::arena::PresentationArena;
use crate::negotiator::{
    AreaGrant, CursorPosition, PlacementNegotiator, PlacementRequest, PlacementState,
    PlacementStatus, Presentation, RedoRequest, SpaceQualifier,
};
use render_model::{AreaId, Border, DiagnosticKind, DiagnosticPalette, GraphicsItem, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// A measured piece of content at relative scale 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub width: f64,
    pub height: f64,
    /// Distance from the top to the baseline, 0 for non-text content
    pub ascent: f64,
    #[serde(default)]
    pub can_stretch: bool,
}

impl Fragment {
    pub fn new(width: f64, height: f64, ascent: f64) -> Self {
        Self {
            width,
            height,
            ascent,
            can_stretch: false,
        }
    }

    /// Allow justification to widen this fragment
    pub fn stretchable(mut self) -> Self {
        self.can_stretch = true;
        self
    }

    pub fn size_at(&self, relative_scale: f64) -> Size {
        Size::new(self.width * relative_scale, self.height * relative_scale)
    }
}

#[derive(Debug, Clone)]
struct PlacedFragment {
    item: GraphicsItem,
    natural_width: f64,
    can_stretch: bool,
    /// The fragment was moved to a fresh line before allocation
    breaks_before: bool,
}

/// Leaf presentation made of measured fragments
#[derive(Debug, Clone, Default)]
pub struct FragmentPresentation {
    fragments: Vec<Fragment>,
    areas: Vec<PlacedFragment>,
    state: PlacementState,
    last_scale: Option<f64>,
    border: Option<Border>,
}

impl FragmentPresentation {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self {
            fragments,
            ..Self::default()
        }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Replace the content; the node must be placed again
    pub fn set_fragments(&mut self, fragments: Vec<Fragment>) {
        self.fragments = fragments;
        self.areas.clear();
        self.last_scale = None;
        if self.state != PlacementState::Detached {
            self.state = PlacementState::Unplaced;
        }
    }

    /// Number of areas granted by the last placement
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Whether the area was moved to a fresh line
    pub fn breaks_before(&self, area_id: AreaId) -> bool {
        self.areas.get(area_id).is_some_and(|area| area.breaks_before)
    }

    fn push_area(&mut self, size: Size, ascent: f64, can_stretch: bool, breaks_before: bool) {
        let mut item = GraphicsItem::new(size, ascent);
        if let Some(border) = self.border {
            item.set_border(border);
        }
        self.areas.push(PlacedFragment {
            item,
            natural_width: size.width,
            can_stretch,
            breaks_before,
        });
    }
}

impl Presentation for FragmentPresentation {
    fn recalculate_placement(
        &mut self,
        _arena: &mut PresentationArena,
        parent: &mut dyn PlacementNegotiator,
        request: &PlacementRequest,
    ) -> PlacementStatus {
        if self.state == PlacementState::Detached {
            return PlacementStatus::Detached;
        }

        self.areas.clear();
        self.state = PlacementState::Measuring;
        self.last_scale = Some(request.relative_scale);

        for index in 0..self.fragments.len() {
            let fragment = self.fragments[index];
            let size = fragment.size_at(request.relative_scale);
            let ascent = fragment.ascent * request.relative_scale;

            let mut offered = parent.request_area(request.child_id);
            let mut breaks_before = false;
            if !offered.fits(&size) && offered.qualifier == SpaceQualifier::CurrentAvailable {
                parent.area_insufficient(request.child_id, size);
                breaks_before = true;
                offered = parent.request_area(request.child_id);
            }
            if !offered.fits(&size) {
                tracing::trace!(area_id = index, width = size.width, available = offered.available.width, "fragment wider than a line");
            }

            match parent.allocate_area(request.child_id, index, size, ascent, fragment.can_stretch) {
                AreaGrant::Granted => self.push_area(size, ascent, fragment.can_stretch, breaks_before),
                AreaGrant::Insufficient { available } => {
                    self.state = PlacementState::Rejected;
                    tracing::debug!(area_id = index, ?size, ?available, "fragment rejected");
                    return PlacementStatus::Overflow {
                        required: size,
                        available,
                    };
                }
            }
        }

        self.state = PlacementState::Placed;
        PlacementStatus::Placed
    }

    fn redo_placement(
        &mut self,
        arena: &mut PresentationArena,
        parent: &mut dyn PlacementNegotiator,
        request: &RedoRequest,
    ) -> PlacementStatus {
        if self.state == PlacementState::Detached {
            return PlacementStatus::Detached;
        }
        if self.state != PlacementState::Placed
            || self.last_scale != Some(request.relative_scale)
            || request.first_area_id > self.areas.len()
        {
            return self.recalculate_placement(arena, parent, &request.to_full());
        }

        for area_id in request.first_area_id..self.areas.len() {
            let area = &self.areas[area_id];
            let size = Size::new(area.natural_width, area.item.size.height);
            let ascent = area.item.ascent;

            parent.request_area(request.child_id);
            if area.breaks_before {
                parent.area_insufficient(request.child_id, size);
                parent.request_area(request.child_id);
            }
            if let AreaGrant::Insufficient { available } =
                parent.allocate_area(request.child_id, area_id, size, ascent, area.can_stretch)
            {
                self.state = PlacementState::Rejected;
                return PlacementStatus::Overflow {
                    required: size,
                    available,
                };
            }
        }
        PlacementStatus::Placed
    }

    fn apply_stretch(&mut self, _arena: &mut PresentationArena, area_id: AreaId, stretch_factor: f64) {
        match self.areas.get_mut(area_id) {
            Some(area) if area.can_stretch => {
                area.item.size.width = area.natural_width * (1.0 + stretch_factor);
            }
            Some(_) => {}
            None => tracing::debug!(area_id, "no such fragment area"),
        }
    }

    fn graphics_item(&self, area_id: AreaId) -> Option<&GraphicsItem> {
        self.areas.get(area_id).map(|area| &area.item)
    }

    fn position_area(&mut self, _arena: &mut PresentationArena, area_id: AreaId, scene_origin: Point) {
        if let Some(area) = self.areas.get_mut(area_id) {
            area.item.set_scene_origin(scene_origin);
        }
    }

    fn reset_placement(&mut self, _arena: &mut PresentationArena) {
        self.areas.clear();
        self.last_scale = None;
        if self.state != PlacementState::Detached {
            self.state = PlacementState::Unplaced;
        }
    }

    fn remove_from_scene(&mut self, _arena: &mut PresentationArena) {
        self.areas.clear();
        self.border = None;
        self.state = PlacementState::Detached;
    }

    /// Offsets are fragment indices; the range covers `[start, end)` in either order
    fn cursor_range_to_scene(&self, end: CursorPosition, start: CursorPosition) -> Vec<Rect> {
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        let to = to.offset.min(self.areas.len());
        self.areas
            .get(from.offset..to)
            .unwrap_or_default()
            .iter()
            .map(|area| area.item.scene_bounds())
            .collect()
    }

    fn process_diagnostic(&mut self, kind: DiagnosticKind, palette: &DiagnosticPalette) -> bool {
        if self.state == PlacementState::Detached {
            return false;
        }
        let border = palette.border(kind);
        self.border = Some(border);
        for area in &mut self.areas {
            area.item.set_border(border);
        }
        true
    }

    fn clear_diagnostic_display(&mut self) -> bool {
        self.border = None;
        for area in &mut self.areas {
            area.item.clear_border();
        }
        self.state != PlacementState::Detached
    }

    fn placement_state(&self) -> PlacementState {
        self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiator::{AreaRequest, ChildId};

    /// Parent offering fixed-width lines and recording every call
    #[derive(Default)]
    struct Lines {
        width: f64,
        used: f64,
        calls: Vec<String>,
    }

    impl PlacementNegotiator for Lines {
        fn request_area(&mut self, _child_id: ChildId) -> AreaRequest {
            self.calls.push("request".into());
            let qualifier = if self.used > 0.0 {
                SpaceQualifier::CurrentAvailable
            } else {
                SpaceQualifier::MaximumWidth
            };
            AreaRequest::new(Size::new(self.width - self.used, f64::INFINITY), qualifier)
        }

        fn allocate_area(&mut self, _child_id: ChildId, area_id: AreaId, size: Size, _ascent: f64, _can_stretch: bool) -> AreaGrant {
            self.calls.push(format!("allocate {area_id} {}", size.width));
            self.used += size.width;
            AreaGrant::Granted
        }

        fn area_insufficient(&mut self, _child_id: ChildId, _size: Size) {
            self.calls.push("break".into());
            self.used = 0.0;
        }
    }

    fn lines(width: f64) -> Lines {
        Lines {
            width,
            ..Lines::default()
        }
    }

    fn fragments() -> FragmentPresentation {
        FragmentPresentation::new(vec![
            Fragment::new(30.0, 10.0, 8.0),
            Fragment::new(30.0, 10.0, 8.0),
            Fragment::new(30.0, 10.0, 8.0).stretchable(),
        ])
    }

    #[test]
    fn test_greedy_line_filling() {
        let mut arena = PresentationArena::new();
        let mut node = fragments();
        let mut parent = lines(70.0);

        let status = node.recalculate_placement(&mut arena, &mut parent, &PlacementRequest::new(0));
        assert_eq!(status, PlacementStatus::Placed);
        assert_eq!(node.area_count(), 3);
        assert!(!node.breaks_before(1));
        assert!(node.breaks_before(2));
        assert_eq!(
            parent.calls,
            vec!["request", "allocate 0 30", "request", "allocate 1 30", "request", "break", "request", "allocate 2 30"]
        );
    }

    #[test]
    fn test_redo_repeats_calls() {
        let mut arena = PresentationArena::new();
        let mut node = fragments();
        let mut first = lines(70.0);
        node.recalculate_placement(&mut arena, &mut first, &PlacementRequest::new(0));

        let mut second = lines(70.0);
        let status = node.redo_placement(&mut arena, &mut second, &PlacementRequest::new(0).redo(0));
        assert_eq!(status, PlacementStatus::Placed);
        assert_eq!(first.calls, second.calls);
    }

    #[test]
    fn test_scale_applies_to_geometry() {
        let mut arena = PresentationArena::new();
        let mut node = fragments();
        let mut parent = lines(1000.0);
        node.recalculate_placement(&mut arena, &mut parent, &PlacementRequest::new(0).with_relative_scale(0.5));

        let item = node.graphics_item(0).unwrap();
        assert_eq!(item.size, Size::new(15.0, 5.0));
        assert_eq!(item.ascent, 4.0);
    }

    #[test]
    fn test_stretch_only_widens_stretchable_areas() {
        let mut arena = PresentationArena::new();
        let mut node = fragments();
        let mut parent = lines(1000.0);
        node.recalculate_placement(&mut arena, &mut parent, &PlacementRequest::new(0));

        node.apply_stretch(&mut arena, 0, 0.5);
        node.apply_stretch(&mut arena, 2, 0.5);
        assert_eq!(node.graphics_item(0).unwrap().size.width, 30.0);
        assert_eq!(node.graphics_item(2).unwrap().size.width, 45.0);
    }

    #[test]
    fn test_cursor_range() {
        let mut arena = PresentationArena::new();
        let mut node = fragments();
        let mut parent = lines(1000.0);
        assert!(node
            .cursor_range_to_scene(CursorPosition::new(2), CursorPosition::new(0))
            .is_empty());

        node.recalculate_placement(&mut arena, &mut parent, &PlacementRequest::new(0));
        node.position_area(&mut arena, 1, Point::new(30.0, 0.0));

        let rects = node.cursor_range_to_scene(CursorPosition::new(2), CursorPosition::new(1));
        assert_eq!(rects, vec![Rect::new(30.0, 0.0, 30.0, 10.0)]);
        assert_eq!(node.cursor_range_to_scene(CursorPosition::new(0), CursorPosition::new(9)).len(), 3);
    }

    #[test]
    fn test_reset_and_detach() {
        let mut arena = PresentationArena::new();
        let mut node = fragments();
        let mut parent = lines(1000.0);
        node.recalculate_placement(&mut arena, &mut parent, &PlacementRequest::new(0));

        node.reset_placement(&mut arena);
        assert_eq!(node.area_count(), 0);
        assert_eq!(node.placement_state(), PlacementState::Unplaced);

        node.remove_from_scene(&mut arena);
        assert!(!node.process_diagnostic(DiagnosticKind::Warning, &DiagnosticPalette::default()));
        assert_eq!(
            node.recalculate_placement(&mut arena, &mut parent, &PlacementRequest::new(0)),
            PlacementStatus::Detached
        );
    }
}
