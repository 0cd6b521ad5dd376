//! Presentation area records
//!
//! A presentation area is one contiguous, independently positioned fragment
//! of a node's output, typically one line of wrapped content. A grouping
//! wrapper keeps the areas its child allocated in a [`PresentationAreaTracker`]
//! so the composite can be measured and replayed without asking the child again.

use render_model::{AreaId, NodeId, Size};

/// Geometry of one area a child allocated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationAreaRecord {
    /// Dense, zero-based index assigned on allocation
    pub area_id: AreaId,
    /// Natural size of the area
    pub size: Size,
    /// Distance from the top of the area to its baseline, 0 for non-text areas
    pub ascent: f64,
    /// Whether justification may widen this area
    pub can_stretch: bool,
    /// Line of the child's content this area sits on
    pub line: usize,
    /// Width the child reports after justification widened the area
    pub stretched: Option<f64>,
}

impl PresentationAreaRecord {
    /// Distance from the baseline to the bottom of the area
    pub fn descent(&self) -> f64 {
        (self.size.height - self.ascent).max(0.0)
    }

    /// Width including any applied stretch
    pub fn stretched_width(&self) -> f64 {
        self.stretched.unwrap_or(self.size.width)
    }
}

/// Ordered cache of the areas a single child allocated
#[derive(Debug, Clone, Default)]
pub struct PresentationAreaTracker {
    records: Vec<PresentationAreaRecord>,
    child: Option<NodeId>,
}

impl PresentationAreaTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record on the first line and return its area id
    pub fn append(&mut self, size: Size, ascent: f64, can_stretch: bool) -> AreaId {
        self.append_on_line(size, ascent, can_stretch, 0)
    }

    /// Add a record on the given line and return its area id
    pub fn append_on_line(
        &mut self,
        size: Size,
        ascent: f64,
        can_stretch: bool,
        line: usize,
    ) -> AreaId {
        let area_id = self.records.len();
        self.records.push(PresentationAreaRecord {
            area_id,
            size,
            ascent,
            can_stretch,
            line,
            stretched: None,
        });
        area_id
    }

    /// Replace the geometry of an existing record, keeping its id.
    ///
    /// Returns `false` when `area_id` is not recorded.
    pub fn replace(
        &mut self,
        area_id: AreaId,
        size: Size,
        ascent: f64,
        can_stretch: bool,
        line: usize,
    ) -> bool {
        match self.records.get_mut(area_id) {
            Some(record) => {
                *record = PresentationAreaRecord {
                    area_id,
                    size,
                    ascent,
                    can_stretch,
                    line,
                    stretched: None,
                };
                true
            }
            None => false,
        }
    }

    /// Get a record by area id
    pub fn at(&self, area_id: AreaId) -> Option<&PresentationAreaRecord> {
        self.records.get(area_id)
    }

    /// Get a mutable record by area id
    pub fn at_mut(&mut self, area_id: AreaId) -> Option<&mut PresentationAreaRecord> {
        self.records.get_mut(area_id)
    }

    /// Drop all records beyond the first `count`
    pub fn truncate(&mut self, count: usize) {
        self.records.truncate(count);
    }

    /// Remove every record and forget the child
    pub fn clear(&mut self) {
        self.records.clear();
        self.child = None;
    }

    /// Number of records
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in area id order
    pub fn records(&self) -> &[PresentationAreaRecord] {
        &self.records
    }

    /// Child whose areas are recorded
    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    pub fn set_child(&mut self, child: NodeId) {
        self.child = Some(child);
    }

    /// Number of distinct lines the records span
    pub fn line_count(&self) -> usize {
        self.records.last().map_or(0, |record| record.line + 1)
    }

    /// Records on one line, in area id order
    pub fn line(&self, line: usize) -> impl Iterator<Item = &PresentationAreaRecord> {
        self.records.iter().filter(move |record| record.line == line)
    }

    /// Whether any record may be stretched
    pub fn can_stretch(&self) -> bool {
        self.records.iter().any(|record| record.can_stretch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_dense_ids() {
        let mut tracker = PresentationAreaTracker::new();
        assert_eq!(tracker.append(Size::new(10.0, 5.0), 4.0, false), 0);
        assert_eq!(tracker.append(Size::new(12.0, 5.0), 4.0, true), 1);
        assert_eq!(tracker.append_on_line(Size::new(8.0, 6.0), 5.0, false, 1), 2);

        assert_eq!(tracker.count(), 3);
        assert_eq!(tracker.line_count(), 2);
        assert_eq!(tracker.line(0).count(), 2);
        assert!(tracker.can_stretch());
    }

    #[test]
    fn test_at_out_of_range() {
        let mut tracker = PresentationAreaTracker::new();
        tracker.append(Size::new(10.0, 5.0), 4.0, false);
        assert!(tracker.at(0).is_some());
        assert!(tracker.at(1).is_none());
    }

    #[test]
    fn test_replace_keeps_id() {
        let mut tracker = PresentationAreaTracker::new();
        tracker.append(Size::new(10.0, 5.0), 4.0, false);
        assert!(tracker.replace(0, Size::new(20.0, 6.0), 5.0, false, 0));
        assert!(!tracker.replace(3, Size::new(1.0, 1.0), 1.0, false, 0));

        let record = tracker.at(0).unwrap();
        assert_eq!(record.area_id, 0);
        assert_eq!(record.size, Size::new(20.0, 6.0));
    }

    #[test]
    fn test_clear_drops_child() {
        let mut tracker = PresentationAreaTracker::new();
        tracker.set_child(NodeId(7));
        tracker.append(Size::new(10.0, 5.0), 4.0, false);
        tracker.clear();
        assert_eq!(tracker.count(), 0);
        assert_eq!(tracker.child(), None);
        assert_eq!(tracker.line_count(), 0);
    }

    #[test]
    fn test_record_metrics() {
        let mut tracker = PresentationAreaTracker::new();
        tracker.append(Size::new(10.0, 12.0), 9.0, true);
        tracker.append(Size::new(10.0, 12.0), 9.0, false);
        tracker.at_mut(0).unwrap().stretched = Some(13.5);

        assert_eq!(tracker.at(0).unwrap().descent(), 3.0);
        assert_eq!(tracker.at(0).unwrap().stretched_width(), 13.5);
        assert_eq!(tracker.at(1).unwrap().stretched_width(), 10.0);

        tracker.replace(0, Size::new(10.0, 12.0), 9.0, true, 0);
        assert_eq!(tracker.at(0).unwrap().stretched_width(), 10.0);
    }
}
