//! Grouping wrapper
//!
//! A [`GroupingPresentation`] encloses the complete, possibly multi-line output
//! of exactly one child inside a pair of delimiter glyphs. Placement runs in
//! two phases:
//!
//! 1. The child places itself against a [`GroupingNegotiator`] that the wrapper
//!    lends it as its parent. The proxy relays line breaks to the real parent and
//!    records every area the child allocates, tagged with its line.
//! 2. The wrapper measures the recorded areas, sizes both delimiters to the
//!    measured height and ascent, and offers the composite to its own parent as a
//!    single area. When the parent rejects it, the child is measured again at a
//!    smaller relative scale until the retry policy is exhausted.

use crate::area::PresentationAreaTracker;
use crate::arena::PresentationArena;
use crate::config::PlacementConfig;
use crate::negotiator::{
    AreaGrant, AreaRequest, ChildId, CursorPosition, PlacementNegotiator, PlacementRequest,
    PlacementState, PlacementStatus, Presentation, RedoRequest, SpaceQualifier,
};
use math::{
    delimiter_styles, resolve_delimiters, DelimiterPair, DelimiterSide, FormatHandle, FormatLookup,
    GroupingKind, StyleRequest,
};
use render_model::{
    AreaId, Border, DelimiterGlyph, DiagnosticKind, DiagnosticPalette, GlyphFactory, GraphicsItem,
    NodeId, Point, Rect, SceneTransform, Size,
};
use std::any::Any;
use std::sync::Arc;

/// The only identifier the wrapper's child may use
pub const CHILD_ID: ChildId = 0;

/// The single area a wrapper exposes to its parent
pub const COMPOSITE_AREA: AreaId = 0;

/// Ascent of an empty grouping relative to its height
const EMPTY_ASCENT_RATIO: f64 = 0.8;

/// Extent of one line of child content
#[derive(Debug, Clone, Copy, Default)]
struct LineMetrics {
    width: f64,
    ascent: f64,
    descent: f64,
}

impl LineMetrics {
    fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

fn line_metrics(tracker: &PresentationAreaTracker) -> Vec<LineMetrics> {
    (0..tracker.line_count())
        .map(|line| {
            tracker.line(line).fold(LineMetrics::default(), |metrics, record| LineMetrics {
                width: metrics.width + record.stretched_width(),
                ascent: metrics.ascent.max(record.ascent),
                descent: metrics.descent.max(record.descent()),
            })
        })
        .collect()
}

/// Parent negotiator the wrapper lends to its child
struct GroupingNegotiator<'a> {
    tracker: &'a mut PresentationAreaTracker,
    parent: &'a mut dyn PlacementNegotiator,
    /// Identifier the wrapper itself uses towards `parent`
    parent_child_id: ChildId,
    line: usize,
    line_width: f64,
    line_areas: usize,
}

impl<'a> GroupingNegotiator<'a> {
    fn new(
        tracker: &'a mut PresentationAreaTracker,
        parent: &'a mut dyn PlacementNegotiator,
        parent_child_id: ChildId,
    ) -> Self {
        Self {
            tracker,
            parent,
            parent_child_id,
            line: 0,
            line_width: 0.0,
            line_areas: 0,
        }
    }

    fn is_child(&self, child_id: ChildId) -> bool {
        debug_assert_eq!(child_id, CHILD_ID, "a grouping has a single child");
        if child_id != CHILD_ID {
            tracing::warn!(child_id, "unknown child identifier");
            return false;
        }
        true
    }
}

impl PlacementNegotiator for GroupingNegotiator<'_> {
    fn request_area(&mut self, child_id: ChildId) -> AreaRequest {
        if !self.is_child(child_id) {
            return AreaRequest::new(Size::zero(), SpaceQualifier::MaximumWidth);
        }

        let offered = self.parent.request_area(self.parent_child_id);
        let qualifier = match offered.qualifier {
            SpaceQualifier::Unbounded => SpaceQualifier::Unbounded,
            _ if self.line_areas > 0 => SpaceQualifier::CurrentAvailable,
            qualifier => qualifier,
        };
        let width = (offered.available.width - self.line_width).max(0.0);
        AreaRequest::new(Size::new(width, offered.available.height), qualifier)
    }

    fn allocate_area(
        &mut self,
        child_id: ChildId,
        area_id: AreaId,
        size: Size,
        ascent: f64,
        can_stretch: bool,
    ) -> AreaGrant {
        if !self.is_child(child_id) {
            return AreaGrant::Insufficient {
                available: Size::zero(),
            };
        }

        if area_id < self.tracker.count() {
            self.tracker.replace(area_id, size, ascent, can_stretch, self.line);
        } else {
            debug_assert_eq!(area_id, self.tracker.count(), "child area ids must be dense");
            self.tracker.append_on_line(size, ascent, can_stretch, self.line);
        }
        self.line_width += size.width;
        self.line_areas += 1;

        tracing::trace!(area_id, line = self.line, width = size.width, "child area recorded");
        AreaGrant::Granted
    }

    fn area_insufficient(&mut self, child_id: ChildId, size: Size) {
        if !self.is_child(child_id) {
            return;
        }

        self.parent.area_insufficient(self.parent_child_id, size);
        if self.line_areas > 0 {
            self.line += 1;
            self.line_width = 0.0;
            self.line_areas = 0;
        }
    }
}

/// A node that wraps one child's output in a pair of sized delimiters
pub struct GroupingPresentation {
    kind: GroupingKind,
    delimiters: DelimiterPair,
    child: NodeId,
    glyphs: Arc<dyn GlyphFactory>,
    config: PlacementConfig,
    tracker: PresentationAreaTracker,
    required_size: Size,
    required_ascent: f64,
    can_stretch: bool,
    item: Option<GraphicsItem>,
    state: PlacementState,
    /// Requested scale of the last full placement
    requested_scale: Option<f64>,
    /// Scale the current geometry was measured at
    effective_scale: f64,
    scale_retries: u32,
    border: Option<Border>,
    scene_origin: Option<Point>,
}

impl GroupingPresentation {
    /// Create a wrapper around `child` using the kind's default delimiters
    pub fn new(kind: GroupingKind, child: NodeId, glyphs: Arc<dyn GlyphFactory>) -> Self {
        Self {
            kind,
            delimiters: delimiter_styles(kind, StyleRequest::Default),
            child,
            glyphs,
            config: PlacementConfig::default(),
            tracker: PresentationAreaTracker::new(),
            required_size: Size::zero(),
            required_ascent: 0.0,
            can_stretch: false,
            item: None,
            state: PlacementState::Unplaced,
            requested_scale: None,
            effective_scale: 1.0,
            scale_retries: 0,
            border: None,
            scene_origin: None,
        }
    }

    /// Pick delimiters from the element's format
    pub fn with_format<L: FormatLookup + ?Sized>(mut self, lookup: &L, format: FormatHandle) -> Self {
        self.delimiters = resolve_delimiters(self.kind, Some(format), lookup);
        self
    }

    pub fn with_config(mut self, config: PlacementConfig) -> Self {
        self.config = config;
        self
    }

    /// Re-read the delimiters after the element's format changed.
    ///
    /// Placed geometry is rebuilt with the new glyphs; the parent has to place
    /// the wrapper again since the glyph widths may differ.
    pub fn set_format<L: FormatLookup + ?Sized>(&mut self, lookup: &L, format: Option<FormatHandle>) {
        let delimiters = resolve_delimiters(self.kind, format, lookup);
        if delimiters == self.delimiters {
            return;
        }
        tracing::debug!(kind = self.kind.name(), left = %delimiters.left, right = %delimiters.right, "delimiters changed");
        self.delimiters = delimiters;
        if self.item.is_some() {
            self.rebuild(self.effective_scale);
        }
    }

    pub fn kind(&self) -> GroupingKind {
        self.kind
    }

    pub fn delimiters(&self) -> DelimiterPair {
        self.delimiters
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Areas the child allocated during the last placement
    pub fn tracker(&self) -> &PresentationAreaTracker {
        &self.tracker
    }

    /// Size of the composite including delimiters
    pub fn required_size(&self) -> Size {
        self.required_size
    }

    pub fn required_ascent(&self) -> f64 {
        self.required_ascent
    }

    /// Scale the current geometry was measured at
    pub fn effective_scale(&self) -> f64 {
        self.effective_scale
    }

    /// Number of scale retries the last placement needed
    pub fn scale_retries(&self) -> u32 {
        self.scale_retries
    }

    /// Diagnostic border currently requested for the composite
    pub fn diagnostic_border(&self) -> Option<Border> {
        self.border
    }

    fn child_request(&self, request: &PlacementRequest, relative_scale: f64) -> PlacementRequest {
        PlacementRequest::new(CHILD_ID)
            .with_leading_whitespace(request.honor_leading_whitespace)
            .with_minimum_top_spacing(request.minimum_top_spacing)
            .with_line_spacing(request.line_spacing)
            .with_relative_scale(relative_scale)
    }

    /// Let the child place itself through the proxy, then rebuild the composite
    fn measure(
        &mut self,
        arena: &mut PresentationArena,
        parent: &mut dyn PlacementNegotiator,
        request: &PlacementRequest,
        relative_scale: f64,
    ) {
        self.state = PlacementState::Measuring;
        self.tracker.clear();
        self.tracker.set_child(self.child);

        let child = self.child;
        let child_request = self.child_request(request, relative_scale);
        let mut proxy = GroupingNegotiator::new(&mut self.tracker, parent, request.child_id);
        let status = arena.recalculate_placement(child, &mut proxy, &child_request);

        match status {
            Ok(PlacementStatus::Placed) => {}
            Ok(PlacementStatus::Detached) => {
                tracing::debug!(child = %child, "child is detached, grouping is empty");
            }
            Ok(PlacementStatus::Overflow { required, available }) => {
                tracing::warn!(child = %child, ?required, ?available, "child overflowed inside grouping");
            }
            Err(err) => {
                tracing::warn!(child = %child, error = %err, "child placement failed, grouping is empty");
                self.tracker.truncate(0);
            }
        }

        self.rebuild(relative_scale);
    }

    /// Recompute the composite geometry and item from the recorded child areas
    fn rebuild(&mut self, relative_scale: f64) {
        let lines = line_metrics(&self.tracker);

        let (content_width, height, ascent) = match lines.as_slice() {
            [] => {
                let height = self.config.empty_content_height * relative_scale;
                (0.0, height, height * EMPTY_ASCENT_RATIO)
            }
            [line] => (line.width, line.height(), line.ascent),
            _ => {
                // The baseline is the baseline of the middle line
                let middle = (lines.len() - 1) / 2;
                let above: f64 = lines[..middle].iter().map(LineMetrics::height).sum();
                (
                    lines.iter().map(|line| line.width).fold(0.0, f64::max),
                    lines.iter().map(LineMetrics::height).sum(),
                    above + lines[middle].ascent,
                )
            }
        };

        let left = self.glyphs.delimiter(
            self.delimiters.left,
            DelimiterSide::Left,
            height,
            ascent,
            relative_scale,
        );
        let right = self.glyphs.delimiter(
            self.delimiters.right,
            DelimiterSide::Right,
            height,
            ascent,
            relative_scale,
        );
        self.check_glyph(&left, height, ascent);
        self.check_glyph(&right, height, ascent);

        self.required_size = Size::new(left.size.width + content_width + right.size.width, height);
        self.required_ascent = ascent;
        self.can_stretch = self.tracker.can_stretch();
        self.effective_scale = relative_scale;

        let mut item = GraphicsItem::new(self.required_size, ascent);
        item.push_delimiter(left, Point::origin());

        let mut y = 0.0;
        for (index, line) in lines.iter().enumerate() {
            let mut x = left.size.width;
            for record in self.tracker.line(index) {
                let width = record.stretched_width();
                let bounds = Rect::new(x, y + line.ascent - record.ascent, width, record.size.height);
                item.push_content(self.child, record.area_id, bounds);
                x += width;
            }
            y += line.height();
        }

        item.push_delimiter(right, Point::new(left.size.width + content_width, 0.0));
        if let Some(border) = self.border {
            item.set_border(border);
        }
        if let Some(origin) = self.scene_origin {
            item.set_scene_origin(origin);
        }
        self.item = Some(item);
    }

    /// Move the child's areas to where the composite holds them
    fn position_contents(&self, arena: &mut PresentationArena, scene_origin: Point) {
        let Some(item) = self.item.as_ref() else {
            return;
        };
        for (node, child_area, bounds) in item.contents() {
            let origin = scene_origin.offset(bounds.x, bounds.y);
            if let Err(err) = arena.position_area(node, child_area, origin) {
                tracing::warn!(child = %node, area_id = child_area, error = %err, "child area not positioned");
            }
        }
    }

    fn check_glyph(&self, glyph: &DelimiterGlyph, height: f64, ascent: f64) {
        let result = glyph.verify(height, ascent, self.config.height_tolerance);
        if let Err(err) = &result {
            tracing::warn!(side = ?glyph.side, error = %err, "delimiter glyph does not match content");
        }
        debug_assert!(result.is_ok(), "delimiter glyph does not match content: {result:?}");
    }

    /// Offer the composite to the parent. `Err` carries the room the parent had.
    ///
    /// Without `force` the area is only allocated when the offered room holds it.
    fn offer(&self, parent: &mut dyn PlacementNegotiator, child_id: ChildId, force: bool) -> Result<(), Size> {
        let mut offered = parent.request_area(child_id);
        if !offered.fits(&self.required_size) && offered.qualifier == SpaceQualifier::CurrentAvailable {
            parent.area_insufficient(child_id, self.required_size);
            offered = parent.request_area(child_id);
        }

        if !offered.fits(&self.required_size) && !force {
            return Err(offered.available);
        }

        match parent.allocate_area(
            child_id,
            COMPOSITE_AREA,
            self.required_size,
            self.required_ascent,
            self.can_stretch,
        ) {
            AreaGrant::Granted => Ok(()),
            AreaGrant::Insufficient { available } => Err(available),
        }
    }

    fn overflow(&self, available: Size) -> PlacementStatus {
        PlacementStatus::Overflow {
            required: self.required_size,
            available,
        }
    }
}

impl Presentation for GroupingPresentation {
    fn recalculate_placement(
        &mut self,
        arena: &mut PresentationArena,
        parent: &mut dyn PlacementNegotiator,
        request: &PlacementRequest,
    ) -> PlacementStatus {
        if self.state == PlacementState::Detached {
            tracing::debug!("detached grouping skipped");
            return PlacementStatus::Detached;
        }

        self.requested_scale = Some(request.relative_scale);
        let mut scale = request.relative_scale;
        let mut retries = 0;

        loop {
            self.measure(arena, parent, request, scale);
            let next = self.config.next_scale(scale, retries);

            match self.offer(parent, request.child_id, next.is_none()) {
                Ok(()) => {
                    self.state = PlacementState::Placed;
                    self.scale_retries = retries;
                    tracing::trace!(
                        kind = self.kind.name(),
                        width = self.required_size.width,
                        height = self.required_size.height,
                        scale,
                        "grouping placed"
                    );
                    return PlacementStatus::Placed;
                }
                Err(available) => {
                    self.state = PlacementState::Rejected;
                    self.scale_retries = retries;
                    match next {
                        Some(next) => {
                            tracing::debug!(scale, next, retries, "composite rejected, measuring smaller");
                            scale = next;
                            retries += 1;
                        }
                        None => {
                            tracing::warn!(
                                required = ?self.required_size,
                                ?available,
                                scale,
                                "grouping does not fit after all retries"
                            );
                            return self.overflow(available);
                        }
                    }
                }
            }
        }
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

        let replayable = self.state == PlacementState::Placed
            && self.requested_scale == Some(request.relative_scale);
        if !replayable {
            tracing::debug!(state = ?self.state, "no replayable geometry, measuring again");
            return self.recalculate_placement(arena, parent, &request.to_full());
        }
        if request.first_area_id > COMPOSITE_AREA {
            return PlacementStatus::Placed;
        }

        let child = self.child;
        let child_request = RedoRequest {
            child_id: CHILD_ID,
            first_area_id: 0,
            next_sibling: None,
            honor_leading_whitespace: request.honor_leading_whitespace,
            minimum_top_spacing: request.minimum_top_spacing,
            line_spacing: request.line_spacing,
            relative_scale: self.effective_scale,
        };
        let mut proxy = GroupingNegotiator::new(&mut self.tracker, parent, request.child_id);
        let status = arena.redo_placement(child, &mut proxy, &child_request);
        if !matches!(status, Ok(PlacementStatus::Placed)) {
            tracing::debug!(?status, "child could not replay, measuring again");
            return self.recalculate_placement(arena, parent, &request.to_full());
        }

        self.rebuild(self.effective_scale);
        match self.offer(parent, request.child_id, true) {
            Ok(()) => PlacementStatus::Placed,
            Err(available) => {
                self.state = PlacementState::Rejected;
                self.overflow(available)
            }
        }
    }

    fn apply_stretch(&mut self, arena: &mut PresentationArena, area_id: AreaId, stretch_factor: f64) {
        if area_id != COMPOSITE_AREA || self.item.is_none() {
            tracing::debug!(area_id, "no composite area to stretch");
            return;
        }

        // Delimiters keep their width; only stretchable child areas grow
        for index in 0..self.tracker.count() {
            if !self.tracker.at(index).is_some_and(|record| record.can_stretch) {
                continue;
            }
            if let Err(err) = arena.apply_stretch(self.child, index, stretch_factor) {
                tracing::warn!(child = %self.child, error = %err, "stretch not forwarded");
                continue;
            }
            // The child decides how much of its area actually widens
            let width = arena.graphics_item(self.child, index).map(|item| item.size.width);
            if let Some(record) = self.tracker.at_mut(index) {
                record.stretched = width;
            }
        }
        self.rebuild(self.effective_scale);
        if let Some(origin) = self.scene_origin {
            self.position_contents(arena, origin);
        }
    }

    fn graphics_item(&self, area_id: AreaId) -> Option<&GraphicsItem> {
        if area_id != COMPOSITE_AREA {
            tracing::debug!(area_id, "grouping exposes only its composite area");
            return None;
        }
        self.item.as_ref()
    }

    fn position_area(&mut self, arena: &mut PresentationArena, area_id: AreaId, scene_origin: Point) {
        if area_id != COMPOSITE_AREA {
            tracing::debug!(area_id, "grouping exposes only its composite area");
            return;
        }
        let Some(item) = self.item.as_mut() else {
            return;
        };

        self.scene_origin = Some(scene_origin);
        item.set_scene_origin(scene_origin);
        self.position_contents(arena, scene_origin);
    }

    fn reset_placement(&mut self, arena: &mut PresentationArena) {
        self.tracker.clear();
        self.item = None;
        self.required_size = Size::zero();
        self.required_ascent = 0.0;
        self.can_stretch = false;
        self.requested_scale = None;
        self.scale_retries = 0;
        self.scene_origin = None;
        if self.state != PlacementState::Detached {
            self.state = PlacementState::Unplaced;
        }

        if let Err(err) = arena.reset_placement(self.child) {
            tracing::warn!(child = %self.child, error = %err, "child placement not reset");
        }
    }

    fn remove_from_scene(&mut self, arena: &mut PresentationArena) {
        self.tracker.clear();
        self.item = None;
        self.border = None;
        self.scene_origin = None;
        self.state = PlacementState::Detached;

        if let Err(err) = arena.remove_from_scene(self.child) {
            tracing::warn!(child = %self.child, error = %err, "child not detached");
        }
    }

    fn cursor_range_to_scene(&self, end: CursorPosition, start: CursorPosition) -> Vec<Rect> {
        let Some(item) = self.item.as_ref() else {
            return Vec::new();
        };
        // Either order describes the same range
        if end == start {
            return Vec::new();
        }
        if self.tracker.is_empty() {
            return vec![item.scene_bounds()];
        }
        item.contents()
            .map(|(_, _, bounds)| item.transform.map_rect(bounds))
            .collect()
    }

    fn process_diagnostic(&mut self, kind: DiagnosticKind, palette: &DiagnosticPalette) -> bool {
        if self.state == PlacementState::Detached {
            return false;
        }
        let border = palette.border(kind);
        self.border = Some(border);
        if let Some(item) = self.item.as_mut() {
            item.set_border(border);
        }
        true
    }

    fn clear_diagnostic_display(&mut self) -> bool {
        self.border = None;
        if let Some(item) = self.item.as_mut() {
            item.clear_border();
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
