//! Placement negotiation protocol
//!
//! Layout space is acquired through a cooperative request/allocate/reject
//! protocol between a node and its ambient parent:
//!
//! 1. The parent asks the node to place itself ([`Presentation::recalculate_placement`]).
//! 2. The node asks the parent how much room is left ([`PlacementNegotiator::request_area`]).
//! 3. The node either claims an area ([`PlacementNegotiator::allocate_area`]) or
//!    reports that the offered room is not enough ([`PlacementNegotiator::area_insufficient`]),
//!    after which the parent moves on to a fresh line.
//!
//! Steps 2 and 3 repeat once per fragment the node needs. Area ids reach the
//! parent in strictly increasing order, and a node never requests a new area
//! before its previous one was allocated or rejected. All calls run
//! synchronously on the layout thread.

use crate::arena::PresentationArena;
use render_model::{AreaId, DiagnosticKind, DiagnosticPalette, GraphicsItem, NodeId, Point, Rect, Size};
use std::any::Any;

/// Identifier a child echoes back to its parent on every negotiation call
pub type ChildId = usize;

/// Describes the room returned by [`PlacementNegotiator::request_area`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceQualifier {
    /// What remains on a partly used line; reporting it insufficient yields a fresh line
    CurrentAvailable,
    /// A fresh line; asking again will not yield more room
    MaximumWidth,
    /// No horizontal limit
    Unbounded,
}

/// Room offered by a parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaRequest {
    pub available: Size,
    pub qualifier: SpaceQualifier,
}

impl AreaRequest {
    pub fn new(available: Size, qualifier: SpaceQualifier) -> Self {
        Self { available, qualifier }
    }

    /// Whether `size` fits horizontally into the offered room
    pub fn fits(&self, size: &Size) -> bool {
        self.qualifier == SpaceQualifier::Unbounded || size.width <= self.available.width + WIDTH_EPSILON
    }
}

/// Slack allowed when comparing widths
pub const WIDTH_EPSILON: f64 = 1e-9;

/// Parent's answer to an allocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaGrant {
    /// The area is placed
    Granted,
    /// The parent cannot place an area this large
    Insufficient { available: Size },
}

/// Outcome of a placement pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementStatus {
    /// All areas were granted
    Placed,
    /// Space ran out after all permitted retries; the caller must place the
    /// content some other way, never drop it
    Overflow { required: Size, available: Size },
    /// The node was removed from the scene and takes no part in layout
    Detached,
}

impl PlacementStatus {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlacementStatus::Placed)
    }
}

/// Per-node placement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementState {
    #[default]
    Unplaced,
    Measuring,
    Rejected,
    Placed,
    Detached,
}

/// Hints passed down with a full placement request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    /// Identifier the node must echo back to its parent
    pub child_id: ChildId,
    /// Following sibling in the parent, if any
    pub next_sibling: Option<NodeId>,
    /// Whether whitespace at the start of a line is kept
    pub honor_leading_whitespace: bool,
    /// Minimum spacing above the first line
    pub minimum_top_spacing: f64,
    /// Line spacing multiplier
    pub line_spacing: f64,
    /// Size multiplier, 1.0 is normal
    pub relative_scale: f64,
}

impl PlacementRequest {
    pub fn new(child_id: ChildId) -> Self {
        Self {
            child_id,
            next_sibling: None,
            honor_leading_whitespace: false,
            minimum_top_spacing: 0.0,
            line_spacing: 1.0,
            relative_scale: 1.0,
        }
    }

    pub fn with_next_sibling(mut self, next_sibling: Option<NodeId>) -> Self {
        self.next_sibling = next_sibling;
        self
    }

    pub fn with_leading_whitespace(mut self, honor: bool) -> Self {
        self.honor_leading_whitespace = honor;
        self
    }

    pub fn with_minimum_top_spacing(mut self, spacing: f64) -> Self {
        self.minimum_top_spacing = spacing;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_relative_scale(mut self, relative_scale: f64) -> Self {
        self.relative_scale = relative_scale;
        self
    }

    /// The matching fast-path request
    pub fn redo(&self, first_area_id: AreaId) -> RedoRequest {
        RedoRequest {
            child_id: self.child_id,
            first_area_id,
            next_sibling: self.next_sibling,
            honor_leading_whitespace: self.honor_leading_whitespace,
            minimum_top_spacing: self.minimum_top_spacing,
            line_spacing: self.line_spacing,
            relative_scale: self.relative_scale,
        }
    }
}

/// Hints passed down when geometry is already known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedoRequest {
    pub child_id: ChildId,
    /// First of the node's own areas to replay; earlier areas stay where they are
    pub first_area_id: AreaId,
    pub next_sibling: Option<NodeId>,
    pub honor_leading_whitespace: bool,
    pub minimum_top_spacing: f64,
    pub line_spacing: f64,
    pub relative_scale: f64,
}

impl RedoRequest {
    /// The equivalent full request, used when cached geometry cannot be replayed
    pub fn to_full(&self) -> PlacementRequest {
        PlacementRequest::new(self.child_id)
            .with_next_sibling(self.next_sibling)
            .with_leading_whitespace(self.honor_leading_whitespace)
            .with_minimum_top_spacing(self.minimum_top_spacing)
            .with_line_spacing(self.line_spacing)
            .with_relative_scale(self.relative_scale)
    }
}

/// A logical content position inside a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CursorPosition {
    pub offset: usize,
}

impl CursorPosition {
    pub fn new(offset: usize) -> Self {
        Self { offset }
    }
}

/// Parent side of the negotiation: what a node calls while placing itself
pub trait PlacementNegotiator {
    /// Room available for the next area of `child_id`
    fn request_area(&mut self, child_id: ChildId) -> AreaRequest;

    /// Claim an area
    fn allocate_area(
        &mut self,
        child_id: ChildId,
        area_id: AreaId,
        size: Size,
        ascent: f64,
        can_stretch: bool,
    ) -> AreaGrant;

    /// Report that the room last offered cannot hold an area of `size`
    fn area_insufficient(&mut self, child_id: ChildId, size: Size);
}

/// Node side of the negotiation: implemented by everything that takes part in layout
pub trait Presentation {
    /// Measure and place this node through `parent`
    fn recalculate_placement(
        &mut self,
        arena: &mut PresentationArena,
        parent: &mut dyn PlacementNegotiator,
        request: &PlacementRequest,
    ) -> PlacementStatus;

    /// Replay known geometry to `parent` without measuring again
    fn redo_placement(
        &mut self,
        arena: &mut PresentationArena,
        parent: &mut dyn PlacementNegotiator,
        request: &RedoRequest,
    ) -> PlacementStatus;

    /// Widen a stretchable area after placement
    fn apply_stretch(&mut self, arena: &mut PresentationArena, area_id: AreaId, stretch_factor: f64);

    /// Graphics item shown for an area
    fn graphics_item(&self, area_id: AreaId) -> Option<&GraphicsItem>;

    /// Move an area's item to its final scene position
    fn position_area(&mut self, arena: &mut PresentationArena, area_id: AreaId, scene_origin: Point);

    /// Forget all cached placement
    fn reset_placement(&mut self, arena: &mut PresentationArena);

    /// Detach and release the node's graphics items
    fn remove_from_scene(&mut self, arena: &mut PresentationArena);

    /// Scene rectangles covering the content between two cursor positions
    fn cursor_range_to_scene(&self, end: CursorPosition, start: CursorPosition) -> Vec<Rect>;

    /// Outline the node's items for a diagnostic. Returns `false` when the node
    /// is detached and the diagnostic was dropped.
    fn process_diagnostic(&mut self, _kind: DiagnosticKind, _palette: &DiagnosticPalette) -> bool {
        false
    }

    /// Remove any diagnostic outline; returns whether the node is attached
    fn clear_diagnostic_display(&mut self) -> bool {
        false
    }

    /// Current placement state
    fn placement_state(&self) -> PlacementState;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fits() {
        let request = AreaRequest::new(Size::new(50.0, 100.0), SpaceQualifier::CurrentAvailable);
        assert!(request.fits(&Size::new(50.0, 10.0)));
        assert!(!request.fits(&Size::new(50.1, 10.0)));

        let unbounded = AreaRequest::new(Size::zero(), SpaceQualifier::Unbounded);
        assert!(unbounded.fits(&Size::new(1e6, 10.0)));
    }

    #[test]
    fn test_redo_round_trips_hints() {
        let request = PlacementRequest::new(3)
            .with_line_spacing(1.5)
            .with_minimum_top_spacing(2.0)
            .with_relative_scale(0.7);
        let redo = request.redo(0);
        assert_eq!(redo.child_id, 3);
        assert_eq!(redo.to_full().relative_scale, 0.7);
        assert_eq!(redo.to_full().line_spacing, 1.5);
    }

    #[test]
    fn test_redo_fallback_keeps_every_hint() {
        let request = PlacementRequest::new(1)
            .with_next_sibling(Some(NodeId(9)))
            .with_leading_whitespace(true)
            .with_minimum_top_spacing(3.0)
            .with_relative_scale(0.8);
        assert_eq!(request.redo(2).to_full(), request);
    }

    #[test]
    fn test_status_helpers() {
        assert!(PlacementStatus::Placed.is_placed());
        assert!(!PlacementStatus::Detached.is_placed());
        assert_eq!(PlacementState::default(), PlacementState::Unplaced);
    }
}
