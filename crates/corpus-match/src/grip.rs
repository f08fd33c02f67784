//! Boundary (grip) dragging.
//!
//! A [`DragSession`] is the transient state of dragging one endpoint of one interval. Its legal
//! range is computed once when the drag begins:
//!
//! - a start endpoint may move from one past the previous interval's end (or the buffer's first
//!   position) up to its own interval's end
//! - an end endpoint may move from its own interval's start up to one before the next interval's
//!   start (or the buffer's last position)
//!
//! The host subscribes to platform pointer events and forwards coordinates to
//! [`DragSession::pointer_move`]; the session only computes candidate positions and never mutates
//! the list itself.

use crate::buffer::TextBuffer;
use crate::error::IntervalError;
use crate::intervals::{Endpoint, IntervalId, IntervalList};
use crate::layout::CoordinateMapper;
use crate::position::{Position, first_position, last_position, predecessor, successor};
use serde::{Deserialize, Serialize};

/// Drag behaviour knobs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DragOptions {
    /// Snap the pointer to the current row's centre while it stays within
    /// `sticky_factor * line_height` of it. `None` disables snapping.
    pub sticky_factor: Option<f32>,
}

/// Editor focus captured when a drag begins and handed back when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusState {
    /// Whether the text widget had keyboard focus.
    pub focused: bool,
    /// Text cursor location at drag start.
    pub cursor: Option<Position>,
}

/// Inclusive range an endpoint may be dragged within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragBounds {
    /// Smallest legal position.
    pub lower: Position,
    /// Largest legal position.
    pub upper: Position,
}

impl DragBounds {
    /// Clamp `p` into `[lower, upper]`.
    pub fn clamp(&self, p: Position) -> Position {
        if p < self.lower {
            self.lower
        } else if p > self.upper {
            self.upper
        } else {
            p
        }
    }

    /// Returns `true` if `lower <= p <= upper`.
    pub fn contains(&self, p: &Position) -> bool {
        self.lower <= *p && *p <= self.upper
    }
}

/// Legal drag range for `endpoint` of interval `id`.
///
/// Neighbour steps that would cross a buffer extreme fall back to that extreme.
pub fn drag_bounds<B: TextBuffer + ?Sized>(
    buffer: &B,
    list: &IntervalList,
    id: IntervalId,
    endpoint: Endpoint,
) -> Result<DragBounds, IntervalError> {
    let interval = list.get(id).ok_or(IntervalError::Stale(id))?;
    let neighbors = list.neighbors(id).ok_or(IntervalError::Stale(id))?;

    let bounds = match endpoint {
        Endpoint::Start => {
            let lower = neighbors
                .prev
                .and_then(|prev| list.get(prev))
                .map(|prev| {
                    successor(buffer, &prev.end).unwrap_or_else(|_| last_position(buffer))
                })
                .unwrap_or_else(|| first_position(buffer));
            DragBounds {
                lower,
                upper: interval.end,
            }
        }
        Endpoint::End => {
            let upper = neighbors
                .next
                .and_then(|next| list.get(next))
                .map(|next| {
                    predecessor(buffer, &next.start).unwrap_or_else(|_| first_position(buffer))
                })
                .unwrap_or_else(|| last_position(buffer));
            DragBounds {
                lower: interval.start,
                upper,
            }
        }
    };
    Ok(bounds)
}

/// State of one in-progress boundary drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    interval: IntervalId,
    endpoint: Endpoint,
    bounds: DragBounds,
    current: Position,
    focus: FocusState,
    options: DragOptions,
}

impl DragSession {
    /// Start dragging `endpoint` of interval `id`.
    pub fn begin<B: TextBuffer + ?Sized>(
        buffer: &B,
        list: &IntervalList,
        id: IntervalId,
        endpoint: Endpoint,
        focus: FocusState,
        options: DragOptions,
    ) -> Result<Self, IntervalError> {
        let bounds = drag_bounds(buffer, list, id, endpoint)?;
        let current = list
            .get(id)
            .map(|i| i.endpoint(endpoint))
            .ok_or(IntervalError::Stale(id))?;
        log::debug!(
            "drag begin {:?} {:?} at {} within {}..={}",
            id,
            endpoint,
            current,
            bounds.lower,
            bounds.upper
        );

        Ok(Self {
            interval: id,
            endpoint,
            bounds,
            current,
            focus,
            options,
        })
    }

    /// The interval being edited.
    pub fn interval(&self) -> IntervalId {
        self.interval
    }

    /// Which endpoint is being dragged.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Bounds captured at drag start.
    pub fn bounds(&self) -> DragBounds {
        self.bounds
    }

    /// The endpoint's position as of the last accepted move.
    pub fn current(&self) -> Position {
        self.current
    }

    /// Map a pointer location to a legal endpoint position.
    ///
    /// Returns `Some(position)` only if it differs from the current position, in which case the
    /// session adopts it; the caller then applies it to the list.
    pub fn pointer_move<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &B,
        mapper: &CoordinateMapper,
        x: f32,
        y: f32,
    ) -> Option<Position> {
        let y = self.snap_y(buffer, mapper, y);
        let naive = mapper.position_from_pixel(buffer, x, y);
        let candidate = self.bounds.clamp(naive);
        if candidate == self.current {
            return None;
        }
        self.current = candidate;
        Some(candidate)
    }

    fn snap_y<B: TextBuffer + ?Sized>(&self, buffer: &B, mapper: &CoordinateMapper, y: f32) -> f32 {
        let Some(factor) = self.options.sticky_factor else {
            return y;
        };
        let center = mapper.char_rect(buffer, &self.current).center_y();
        if (y - center).abs() < factor * mapper.line_height() {
            center
        } else {
            y
        }
    }

    /// Finish the drag, handing back the focus state captured at its start.
    pub fn end(self) -> FocusState {
        log::debug!(
            "drag end {:?} {:?} at {}",
            self.interval,
            self.endpoint,
            self.current
        );
        self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RopeBuffer;
    use crate::intervals::{ColorTag, Interval};
    use crate::layout::GridMetrics;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(GridMetrics {
            char_width: 10.0,
            line_height: 20.0,
            wrap_columns: None,
        })
    }

    fn insert(
        list: &mut IntervalList,
        buffer: &RopeBuffer,
        start: usize,
        end: usize,
    ) -> IntervalId {
        let interval = Interval::new(
            buffer.position_from_index(start),
            buffer.position_from_index(end),
            ColorTag::default(),
        );
        list.insert(interval).unwrap()
    }

    #[test]
    fn test_bounds_from_neighbors() {
        let buffer = RopeBuffer::from_text("0123456789");
        let mut list = IntervalList::new();
        let a = insert(&mut list, &buffer, 0, 2);
        let b = insert(&mut list, &buffer, 5, 7);

        let end_a = drag_bounds(&buffer, &list, a, Endpoint::End).unwrap();
        assert_eq!((end_a.lower.index, end_a.upper.index), (0, 4));
        let start_b = drag_bounds(&buffer, &list, b, Endpoint::Start).unwrap();
        assert_eq!((start_b.lower.index, start_b.upper.index), (3, 7));
        let start_a = drag_bounds(&buffer, &list, a, Endpoint::Start).unwrap();
        assert_eq!(start_a.lower.index, 0);
        let end_b = drag_bounds(&buffer, &list, b, Endpoint::End).unwrap();
        assert_eq!(end_b.upper.index, 9);
    }

    #[test]
    fn test_pointer_move_reports_only_changes() {
        let buffer = RopeBuffer::from_text("0123456789");
        let mut list = IntervalList::new();
        let a = insert(&mut list, &buffer, 0, 2);
        let m = mapper();
        let mut session = DragSession::begin(
            &buffer,
            &list,
            a,
            Endpoint::End,
            FocusState::default(),
            DragOptions::default(),
        )
        .unwrap();

        assert_eq!(session.pointer_move(&buffer, &m, 25.0, 5.0), None);
        let moved = session.pointer_move(&buffer, &m, 45.0, 5.0).unwrap();
        assert_eq!(moved.index, 4);
        assert_eq!(session.pointer_move(&buffer, &m, 49.0, 5.0), None);
    }

    #[test]
    fn test_sticky_snapping_keeps_row() {
        let buffer = RopeBuffer::from_text("abcdef\nghijkl");
        let mut list = IntervalList::new();
        let a = insert(&mut list, &buffer, 0, 2);
        let m = mapper();
        let options = DragOptions {
            sticky_factor: Some(1.0),
        };
        let mut sticky =
            DragSession::begin(&buffer, &list, a, Endpoint::End, FocusState::default(), options)
                .unwrap();
        // y = 25 is on row 1, but within one line height of row 0's centre (10).
        let p = sticky.pointer_move(&buffer, &m, 45.0, 25.0).unwrap();
        assert_eq!((p.line, p.column), (0, 4));

        let mut loose = DragSession::begin(
            &buffer,
            &list,
            a,
            Endpoint::End,
            FocusState::default(),
            DragOptions::default(),
        )
        .unwrap();
        let p = loose.pointer_move(&buffer, &m, 45.0, 25.0).unwrap();
        assert_eq!((p.line, p.column), (1, 4));
    }

    #[test]
    fn test_end_returns_focus() {
        let buffer = RopeBuffer::from_text("abc");
        let mut list = IntervalList::new();
        let a = insert(&mut list, &buffer, 0, 0);
        let focus = FocusState {
            focused: true,
            cursor: Some(buffer.position(0, 2)),
        };
        let session = DragSession::begin(
            &buffer,
            &list,
            a,
            Endpoint::Start,
            focus,
            DragOptions::default(),
        )
        .unwrap();
        assert_eq!(session.end(), focus);
    }
}
