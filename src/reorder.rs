//! In-memory model behind the drag-and-drop itinerary widget.
//!
//! The board owns the current activity order of every day. The browser only
//! renders it: drag events are translated into [`ReorderBoard`] calls and the
//! list is redrawn from [`ReorderBoard::days`]. `static/js/itinerary.js` runs
//! the same algorithm client side.

use serde::Serialize;
use thiserror::Error;

use crate::models::itinerary::{DayOrder, ItineraryDay};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    #[error("day {0} is not part of this itinerary")]
    UnknownDay(i64),
    #[error("day {day} has no activity at position {index}")]
    IndexOutOfRange { day: i64, index: usize },
    #[error("layout has {actual} boxes but day {day} has {expected} activities")]
    LayoutMismatch {
        day: i64,
        expected: usize,
        actual: usize,
    },
}

/// Vertical extent of a rendered activity, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBox {
    pub top: f64,
    pub height: f64,
}

impl ItemBox {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Index of the item the dragged one should be inserted before, or `None` to append.
///
/// Picks the item whose midpoint is below `pointer_y` with the smallest
/// distance to it. The item at `dragged` is skipped.
pub fn insertion_point(pointer_y: f64, layout: &[ItemBox], dragged: Option<usize>) -> Option<usize> {
    let mut closest: Option<(usize, f64)> = None;
    for (index, item) in layout.iter().enumerate() {
        if Some(index) == dragged {
            continue;
        }
        let offset = pointer_y - item.midpoint();
        if offset < 0.0 && closest.map_or(true, |(_, best)| offset > best) {
            closest = Some((index, offset));
        }
    }
    closest.map(|(index, _)| index)
}

/// True when `candidate` holds exactly the same activities as `original`, in any order.
pub fn is_permutation(original: &[String], candidate: &[String]) -> bool {
    if original.len() != candidate.len() {
        return false;
    }
    let mut left: Vec<&str> = original.iter().map(String::as_str).collect();
    let mut right: Vec<&str> = candidate.iter().map(String::as_str).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayList {
    pub day_number: i64,
    pub location: String,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragSource {
    day: usize,
    index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReorderBoard {
    days: Vec<DayList>,
    dragging: Option<DragSource>,
}

impl ReorderBoard {
    pub fn new(itinerary: Vec<ItineraryDay>) -> Self {
        let days = itinerary
            .into_iter()
            .map(|day| DayList {
                day_number: day.day_number,
                location: day.location,
                activities: day.activities,
            })
            .collect();
        Self {
            days,
            dragging: None,
        }
    }

    pub fn days(&self) -> &[DayList] {
        &self.days
    }

    pub fn drag_start(&mut self, day_number: i64, index: usize) -> Result<(), ReorderError> {
        let day = self.position(day_number)?;
        if index >= self.days[day].activities.len() {
            return Err(ReorderError::IndexOutOfRange {
                day: day_number,
                index,
            });
        }
        self.dragging = Some(DragSource { day, index });
        Ok(())
    }

    /// Whether the activity is currently marked as in motion.
    pub fn is_dragging(&self, day_number: i64, index: usize) -> bool {
        match (self.dragging, self.position(day_number)) {
            (Some(source), Ok(day)) => source.day == day && source.index == index,
            _ => false,
        }
    }

    /// Drag-over check: a day's list only takes drops of its own activities.
    pub fn accepts_drop(&self, day_number: i64) -> bool {
        match (self.dragging, self.position(day_number)) {
            (Some(source), Ok(day)) => source.day == day,
            _ => false,
        }
    }

    /// Drops the dragged activity into `day_number` at the pointer position.
    ///
    /// `layout` holds one box per activity of that day, in current order.
    /// Returns the activity's new index, or `None` when nothing moved because
    /// no drag is active or the list does not accept it.
    pub fn drop_at(
        &mut self,
        day_number: i64,
        pointer_y: f64,
        layout: &[ItemBox],
    ) -> Result<Option<usize>, ReorderError> {
        let day = self.position(day_number)?;
        let Some(source) = self.dragging.filter(|source| source.day == day) else {
            return Ok(None);
        };

        let activities = &mut self.days[day].activities;
        if layout.len() != activities.len() {
            return Err(ReorderError::LayoutMismatch {
                day: day_number,
                expected: activities.len(),
                actual: layout.len(),
            });
        }

        let item = activities.remove(source.index);
        let target = match insertion_point(pointer_y, layout, Some(source.index)) {
            Some(before) if before > source.index => before - 1,
            Some(before) => before,
            None => activities.len(),
        };
        activities.insert(target, item);
        self.dragging = Some(DragSource { day, index: target });
        Ok(Some(target))
    }

    /// Ends the drag whether or not it was dropped.
    pub fn drag_end(&mut self) {
        self.dragging = None;
    }

    /// Current order of every day, ready to submit.
    pub fn snapshot(&self) -> Vec<DayOrder> {
        self.days
            .iter()
            .map(|day| DayOrder {
                day_number: day.day_number,
                location: Some(day.location.clone()),
                activities: day.activities.clone(),
            })
            .collect()
    }

    fn position(&self, day_number: i64) -> Result<usize, ReorderError> {
        self.days
            .iter()
            .position(|day| day.day_number == day_number)
            .ok_or(ReorderError::UnknownDay(day_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn board() -> ReorderBoard {
        ReorderBoard::new(vec![
            ItineraryDay {
                trip_id: 1,
                day_number: 1,
                location: "Munnar".into(),
                activities: strings(&["A", "B", "C", "D"]),
            },
            ItineraryDay {
                trip_id: 1,
                day_number: 2,
                location: "Alleppey".into(),
                activities: strings(&["X", "Y"]),
            },
        ])
    }

    /// Four 20px rows starting at y=0; midpoints at 10, 30, 50, 70.
    fn layout(count: usize) -> Vec<ItemBox> {
        (0..count)
            .map(|i| ItemBox::new(i as f64 * 20.0, 20.0))
            .collect()
    }

    #[test]
    fn insertion_point_between_midpoints() {
        let boxes = layout(4);
        // Below midpoint of item 1 (30) and above midpoint of item 2 (50).
        assert_eq!(insertion_point(40.0, &boxes, None), Some(2));
        assert_eq!(insertion_point(0.0, &boxes, None), Some(0));
    }

    #[test]
    fn insertion_point_past_last_midpoint_appends() {
        assert_eq!(insertion_point(75.0, &layout(4), None), None);
        assert_eq!(insertion_point(5.0, &[], None), None);
    }

    #[test]
    fn insertion_point_skips_dragged_item() {
        // Pointer sits above the dragged item's own midpoint; next candidate wins.
        assert_eq!(insertion_point(25.0, &layout(4), Some(1)), Some(2));
    }

    #[test]
    fn drop_moves_item_down_before_target() {
        let mut board = board();
        board.drag_start(1, 0).unwrap();
        assert!(board.is_dragging(1, 0));
        let moved = board.drop_at(1, 60.0, &layout(4)).unwrap();
        board.drag_end();

        assert_eq!(moved, Some(2));
        assert_eq!(board.days()[0].activities, strings(&["B", "C", "A", "D"]));
        assert!(!board.is_dragging(1, 2));
    }

    #[test]
    fn drop_moves_item_up() {
        let mut board = board();
        board.drag_start(1, 3).unwrap();
        let moved = board.drop_at(1, 15.0, &layout(4)).unwrap();

        assert_eq!(moved, Some(1));
        assert_eq!(board.days()[0].activities, strings(&["A", "D", "B", "C"]));
    }

    #[test]
    fn drop_below_everything_appends() {
        let mut board = board();
        board.drag_start(1, 1).unwrap();
        board.drop_at(1, 500.0, &layout(4)).unwrap();
        assert_eq!(board.days()[0].activities, strings(&["A", "C", "D", "B"]));
    }

    #[test]
    fn drop_on_other_day_is_ignored() {
        let mut board = board();
        board.drag_start(1, 0).unwrap();
        assert!(board.accepts_drop(1));
        assert!(!board.accepts_drop(2));
        assert_eq!(board.drop_at(2, 0.0, &layout(2)).unwrap(), None);
        assert_eq!(board.days()[1].activities, strings(&["X", "Y"]));
    }

    #[test]
    fn drop_without_drag_is_ignored() {
        let mut board = board();
        assert_eq!(board.drop_at(1, 0.0, &layout(4)).unwrap(), None);
        assert_eq!(board.days()[0].activities, strings(&["A", "B", "C", "D"]));
    }

    #[test]
    fn cancelled_drag_clears_marking() {
        let mut board = board();
        board.drag_start(2, 1).unwrap();
        board.drag_end();
        assert!(!board.is_dragging(2, 1));
        assert!(!board.accepts_drop(2));
    }

    #[test]
    fn drag_start_rejects_bad_positions() {
        let mut board = board();
        assert_eq!(board.drag_start(9, 0), Err(ReorderError::UnknownDay(9)));
        assert_eq!(
            board.drag_start(2, 5),
            Err(ReorderError::IndexOutOfRange { day: 2, index: 5 })
        );
        assert!(!board.accepts_drop(2));
    }

    #[test]
    fn layout_must_match_list() {
        let mut board = board();
        board.drag_start(1, 0).unwrap();
        assert_eq!(
            board.drop_at(1, 0.0, &layout(3)),
            Err(ReorderError::LayoutMismatch {
                day: 1,
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn reordering_only_permutes() {
        let mut board = board();
        let before = board.days()[0].activities.clone();
        for (start, y) in [(0, 45.0), (3, 0.0), (2, 100.0), (1, 22.0)] {
            board.drag_start(1, start).unwrap();
            board.drop_at(1, y, &layout(4)).unwrap();
            board.drag_end();
        }
        assert!(is_permutation(&before, &board.days()[0].activities));
    }

    #[test]
    fn snapshot_reflects_current_order() {
        let mut board = board();
        board.drag_start(2, 0).unwrap();
        board.drop_at(2, 100.0, &layout(2)).unwrap();
        board.drag_end();

        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].day_number, 2);
        assert_eq!(snapshot[1].location.as_deref(), Some("Alleppey"));
        assert_eq!(snapshot[1].activities, strings(&["Y", "X"]));
    }

    #[test]
    fn permutation_check() {
        let original = strings(&["A", "B", "C"]);
        assert!(is_permutation(&original, &strings(&["C", "A", "B"])));
        assert!(!is_permutation(&original, &strings(&["A", "B"])));
        assert!(!is_permutation(&original, &strings(&["A", "B", "B"])));
    }
}
