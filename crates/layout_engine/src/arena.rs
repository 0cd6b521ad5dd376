//! Arena of presentation nodes
//!
//! Nodes refer to each other by [`NodeId`] only, so parent/child links never
//! form ownership cycles. While one of a node's operations runs, the node is
//! checked out of its slot: its own placement call is on the stack, and any
//! attempt to reset or detach it from deeper in the recursion is rejected with
//! [`PlacementError::NodeBusy`].

use crate::negotiator::{
    CursorPosition, PlacementNegotiator, PlacementRequest, PlacementState, PlacementStatus,
    Presentation, RedoRequest,
};
use crate::{PlacementError, Result};
use render_model::{AreaId, DiagnosticKind, DiagnosticPalette, GraphicsItem, NodeId, Point, Rect};

enum Slot {
    Present(Box<dyn Presentation>),
    Busy,
    Vacant,
}

/// Storage for every presentation node of a document
#[derive(Default)]
pub struct PresentationArena {
    slots: Vec<Slot>,
}

impl PresentationArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node and return its id
    pub fn insert<P: Presentation + 'static>(&mut self, node: P) -> NodeId {
        self.insert_boxed(Box::new(node))
    }

    /// Store a boxed node and return its id
    pub fn insert_boxed(&mut self, node: Box<dyn Presentation>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot::Present(node));
        id
    }

    /// Drop a node from the arena. Ids are never reused.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Present(_)) => {
                self.slots[id.0] = Slot::Vacant;
                Ok(())
            }
            Some(Slot::Busy) => Err(PlacementError::NodeBusy(id)),
            Some(Slot::Vacant) | None => Err(PlacementError::UnknownNode(id)),
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !matches!(slot, Slot::Vacant))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the node exists, checked out or not
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0), Some(Slot::Present(_) | Slot::Busy))
    }

    /// Whether one of the node's operations is on the call stack
    pub fn is_busy(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0), Some(Slot::Busy))
    }

    /// Whether any negotiation is in progress
    pub fn is_negotiating(&self) -> bool {
        self.slots.iter().any(|slot| matches!(slot, Slot::Busy))
    }

    /// Borrow a node as its concrete type
    pub fn get<T: Presentation + 'static>(&self, id: NodeId) -> Option<&T> {
        self.node(id)?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow a node as its concrete type
    pub fn get_mut<T: Presentation + 'static>(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Present(node)) => node.as_any_mut().downcast_mut::<T>(),
            _ => None,
        }
    }

    /// Borrow a node through the presentation interface
    pub fn node(&self, id: NodeId) -> Option<&dyn Presentation> {
        match self.slots.get(id.0) {
            Some(Slot::Present(node)) => Some(node.as_ref()),
            _ => None,
        }
    }

    /// Placement state of a node
    pub fn placement_state(&self, id: NodeId) -> Option<PlacementState> {
        self.node(id).map(|node| node.placement_state())
    }

    /// Graphics item a node shows for an area
    pub fn graphics_item(&self, id: NodeId, area_id: AreaId) -> Option<&GraphicsItem> {
        self.node(id)?.graphics_item(area_id)
    }

    /// Run `f` with the node checked out of its slot
    pub fn with_node<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Presentation, &mut PresentationArena) -> R,
    ) -> Result<R> {
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or(PlacementError::UnknownNode(id))?;

        let mut node = match std::mem::replace(slot, Slot::Busy) {
            Slot::Present(node) => node,
            Slot::Busy => return Err(PlacementError::NodeBusy(id)),
            Slot::Vacant => {
                *slot = Slot::Vacant;
                return Err(PlacementError::UnknownNode(id));
            }
        };

        let result = f(node.as_mut(), self);
        self.slots[id.0] = Slot::Present(node);
        Ok(result)
    }

    pub fn recalculate_placement(
        &mut self,
        id: NodeId,
        parent: &mut dyn PlacementNegotiator,
        request: &PlacementRequest,
    ) -> Result<PlacementStatus> {
        let _span = tracing::debug_span!("recalculate_placement", node = %id, scale = request.relative_scale).entered();
        self.with_node(id, |node, arena| node.recalculate_placement(arena, parent, request))
    }

    pub fn redo_placement(
        &mut self,
        id: NodeId,
        parent: &mut dyn PlacementNegotiator,
        request: &RedoRequest,
    ) -> Result<PlacementStatus> {
        let _span = tracing::debug_span!("redo_placement", node = %id).entered();
        self.with_node(id, |node, arena| node.redo_placement(arena, parent, request))
    }

    pub fn apply_stretch(&mut self, id: NodeId, area_id: AreaId, stretch_factor: f64) -> Result<()> {
        self.with_node(id, |node, arena| node.apply_stretch(arena, area_id, stretch_factor))
    }

    pub fn position_area(&mut self, id: NodeId, area_id: AreaId, scene_origin: Point) -> Result<()> {
        self.with_node(id, |node, arena| node.position_area(arena, area_id, scene_origin))
    }

    /// Reset a node's cached placement, rejecting nodes whose placement is on the stack
    pub fn reset_placement(&mut self, id: NodeId) -> Result<()> {
        tracing::debug!(node = %id, "reset placement");
        self.with_node(id, |node, arena| node.reset_placement(arena))
    }

    pub fn remove_from_scene(&mut self, id: NodeId) -> Result<()> {
        tracing::debug!(node = %id, "remove from scene");
        self.with_node(id, |node, arena| node.remove_from_scene(arena))
    }

    pub fn cursor_range_to_scene(
        &self,
        id: NodeId,
        end: CursorPosition,
        start: CursorPosition,
    ) -> Result<Vec<Rect>> {
        match self.slots.get(id.0) {
            Some(Slot::Present(node)) => Ok(node.cursor_range_to_scene(end, start)),
            Some(Slot::Busy) => Err(PlacementError::NodeBusy(id)),
            Some(Slot::Vacant) | None => Err(PlacementError::UnknownNode(id)),
        }
    }

    pub fn process_diagnostic(
        &mut self,
        id: NodeId,
        kind: DiagnosticKind,
        palette: &DiagnosticPalette,
    ) -> Result<bool> {
        self.with_node(id, |node, _| node.process_diagnostic(kind, palette))
    }

    pub fn clear_diagnostic_display(&mut self, id: NodeId) -> Result<bool> {
        self.with_node(id, |node, _| node.clear_diagnostic_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{Fragment, FragmentPresentation};

    #[test]
    fn test_insert_and_get() {
        let mut arena = PresentationArena::new();
        let id = arena.insert(FragmentPresentation::new(vec![Fragment::new(10.0, 5.0, 4.0)]));
        assert_eq!(id, NodeId(0));
        assert_eq!(arena.len(), 1);
        assert!(arena.contains(id));
        assert!(arena.get::<FragmentPresentation>(id).is_some());
        assert_eq!(arena.placement_state(id), Some(PlacementState::Unplaced));
    }

    #[test]
    fn test_remove_leaves_vacant_slot() {
        let mut arena = PresentationArena::new();
        let a = arena.insert(FragmentPresentation::new(Vec::new()));
        let b = arena.insert(FragmentPresentation::new(Vec::new()));
        arena.remove(a).unwrap();

        assert!(!arena.contains(a));
        assert!(arena.contains(b));
        assert_eq!(arena.len(), 1);
        assert!(matches!(arena.remove(a), Err(PlacementError::UnknownNode(_))));
        assert!(matches!(arena.reset_placement(a), Err(PlacementError::UnknownNode(_))));
    }

    #[test]
    fn test_with_node_marks_busy() {
        let mut arena = PresentationArena::new();
        let id = arena.insert(FragmentPresentation::new(Vec::new()));

        let inner = arena
            .with_node(id, |_, arena| {
                assert!(arena.is_busy(id));
                assert!(arena.is_negotiating());
                arena.reset_placement(id)
            })
            .unwrap();

        assert!(matches!(inner, Err(PlacementError::NodeBusy(_))));
        assert!(!arena.is_busy(id));
        assert!(!arena.is_negotiating());
    }

    #[test]
    fn test_unknown_node() {
        let mut arena = PresentationArena::new();
        assert!(matches!(
            arena.cursor_range_to_scene(NodeId(4), CursorPosition::new(1), CursorPosition::new(0)),
            Err(PlacementError::UnknownNode(_))
        ));
        assert!(arena.graphics_item(NodeId(4), 0).is_none());
    }
}
