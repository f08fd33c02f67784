//! Match engine: the surface the view layer talks to.
//!
//! [`MatchEngine`] owns the interval list, the active pattern and at most one drag session. The
//! host forwards buffer/pattern changes and pointer events into it and learns about the results
//! through subscribed callbacks ([`EngineEvent`]). Rendering stays with the host.
//!
//! # Example
//!
//! ```rust
//! use corpus_match::{EngineConfig, MatchEngine, MatchStatus, RopeBuffer};
//!
//! let mut engine = MatchEngine::new(RopeBuffer::from_text("abc def"), EngineConfig::default());
//! engine.subscribe(|event| println!("{:?}", event));
//!
//! assert_eq!(engine.set_pattern(r"\w+").unwrap(), MatchStatus::Matches(2));
//! assert_eq!(engine.match_ranges(), vec![0..3, 4..7]);
//! assert_eq!(engine.status().to_string(), "2");
//! ```

use crate::buffer::{RopeBuffer, TextBuffer};
use crate::config::EngineConfig;
use crate::error::{EngineError, PatternError};
use crate::grip::{DragOptions, DragSession, FocusState};
use crate::intervals::{Endpoint, Interval, IntervalId, IntervalList, Palette};
use crate::layout::{CoordinateMapper, GridMetrics, Rect};
use crate::position::{Position, is_legal};
use crate::scanner::{CompiledPattern, ScanOptions, ScanOutcome, scan};
use std::fmt;
use std::ops::Range;

/// Notification sent to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The interval set was rebuilt or an interval was added/removed.
    MatchesChanged {
        /// Snapshot of all intervals in order.
        intervals: Vec<(IntervalId, Interval)>,
    },
    /// The pattern produces non-advancing zero-length matches; no intervals are kept.
    ///
    /// Preceded by an empty `MatchesChanged`, as is `InvalidPattern`.
    InfiniteMatches,
    /// The pattern failed to compile.
    InvalidPattern {
        /// Compiler message.
        message: String,
    },
    /// A boundary moved (by drag or by command).
    BoundaryMoved {
        /// The interval that changed.
        id: IntervalId,
        /// New start.
        start: Position,
        /// New end.
        end: Position,
    },
    /// A drag began; the buffer is read-only until it ends.
    EditingSuspended,
    /// A drag ended; the host should restore `focus`.
    EditingRestored {
        /// Focus state captured when the drag began.
        focus: FocusState,
    },
}

/// Subscriber callback type.
pub type EngineEventCallback = Box<dyn FnMut(&EngineEvent) + Send>;

/// Status shown next to the pattern input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// No pattern is active.
    Idle,
    /// The pattern produced this many matches.
    Matches(usize),
    /// The pattern matches the empty string without advancing.
    Infinite,
    /// The pattern does not compile.
    Error,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Idle => Ok(()),
            MatchStatus::Matches(count) => write!(f, "{}", count),
            MatchStatus::Infinite => write!(f, "Infinite"),
            MatchStatus::Error => write!(f, "Error"),
        }
    }
}

/// Headless match-interval engine over a [`TextBuffer`].
pub struct MatchEngine<B: TextBuffer> {
    buffer: B,
    mapper: CoordinateMapper,
    scan_options: ScanOptions,
    drag_options: DragOptions,
    pattern: Option<CompiledPattern>,
    intervals: IntervalList,
    palette: Palette,
    drag: Option<DragSession>,
    status: MatchStatus,
    callbacks: Vec<EngineEventCallback>,
}

impl MatchEngine<RopeBuffer> {
    /// Create an engine over a [`RopeBuffer`] holding `text`.
    pub fn from_text(text: &str, config: EngineConfig) -> Self {
        Self::new(RopeBuffer::from_text(text), config)
    }
}

impl<B: TextBuffer> MatchEngine<B> {
    /// Create an engine with no active pattern.
    pub fn new(buffer: B, config: EngineConfig) -> Self {
        Self {
            mapper: CoordinateMapper::indexed(config.grid, &buffer),
            buffer,
            scan_options: config.scan,
            drag_options: config.drag,
            pattern: None,
            intervals: IntervalList::new(),
            palette: config.build_palette(),
            drag: None,
            status: MatchStatus::Idle,
            callbacks: Vec::new(),
        }
    }

    /// Register a callback for [`EngineEvent`]s.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&EngineEvent) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// The buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// The interval list.
    pub fn intervals(&self) -> &IntervalList {
        &self.intervals
    }

    /// Current status.
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Active pattern, if any.
    pub fn pattern(&self) -> Option<&CompiledPattern> {
        self.pattern.as_ref()
    }

    /// Coordinate mapper used for pointer and rendering geometry.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Active drag session, if any.
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Returns `true` while a boundary drag holds the buffer read-only.
    pub fn is_read_only(&self) -> bool {
        self.drag.is_some()
    }

    /// Half-open character ranges of all intervals, in order.
    pub fn match_ranges(&self) -> Vec<Range<usize>> {
        self.intervals.iter().map(|(_, i)| i.char_range()).collect()
    }

    /// Text covered by an interval.
    pub fn interval_text(&self, id: IntervalId) -> Option<String> {
        let interval = self.intervals.get(id)?;
        Some(self.buffer.text_between(interval.char_range()))
    }

    /// Pixel rectangles of an interval's start and end characters.
    pub fn interval_rects(&self, id: IntervalId) -> Option<(Rect, Rect)> {
        let interval = self.intervals.get(id)?;
        Some((
            self.mapper.pixel_from_position(&self.buffer, &interval.start),
            self.mapper.pixel_from_position(&self.buffer, &interval.end),
        ))
    }

    /// Highlight rectangles of an interval, one per visual row.
    pub fn interval_span_rects(&self, id: IntervalId) -> Option<Vec<Rect>> {
        let interval = self.intervals.get(id)?;
        Some(self.mapper.span_rects(&self.buffer, interval))
    }

    /// Replace the grid metrics (font or viewport change). Intervals are unaffected.
    pub fn set_metrics(&mut self, metrics: GridMetrics) {
        self.mapper.set_metrics(metrics);
        self.mapper.reindex(&self.buffer);
    }

    /// Edit the buffer, then rescan.
    ///
    /// Fails with [`EngineError::BufferLocked`] while a boundary is being dragged.
    pub fn edit_buffer<F, R>(&mut self, edit: F) -> Result<R, EngineError>
    where
        F: FnOnce(&mut B) -> R,
    {
        if self.drag.is_some() {
            return Err(EngineError::BufferLocked);
        }
        let result = edit(&mut self.buffer);
        self.on_buffer_changed();
        Ok(result)
    }

    /// The buffer changed outside [`edit_buffer`](Self::edit_buffer): drop all intervals and
    /// rescan if a pattern is active.
    pub fn on_buffer_changed(&mut self) {
        if self.drag.is_some() {
            log::warn!("buffer changed during a boundary drag; cancelling the drag");
            self.cancel_drag();
        }
        self.mapper.reindex(&self.buffer);
        self.rescan();
    }

    /// Compile `raw` and rescan.
    ///
    /// An empty pattern clears the matches. A pattern that fails to compile clears the matches,
    /// sets [`MatchStatus::Error`], notifies subscribers and is returned as an error.
    pub fn set_pattern(&mut self, raw: &str) -> Result<MatchStatus, EngineError> {
        if raw.is_empty() {
            self.clear_pattern();
            return Ok(self.status);
        }

        match CompiledPattern::compile(raw, self.scan_options) {
            Ok(pattern) => {
                self.pattern = Some(pattern);
                self.cancel_drag();
                self.rescan();
                Ok(self.status)
            }
            Err(err) => {
                self.fail_pattern(&err);
                Err(err.into())
            }
        }
    }

    /// Drop the active pattern and all intervals.
    pub fn clear_pattern(&mut self) {
        self.pattern = None;
        self.cancel_drag();
        self.rescan();
    }

    /// Change scan options, recompiling the active pattern.
    pub fn set_scan_options(&mut self, options: ScanOptions) -> Result<MatchStatus, EngineError> {
        self.scan_options = options;
        match self.pattern.as_ref().map(|p| p.as_str().to_string()) {
            Some(raw) => self.set_pattern(&raw),
            None => Ok(self.status),
        }
    }

    /// Add a user-drawn interval covering the half-open character range `range`.
    ///
    /// Fails with an overlap error if it collides with an existing interval.
    pub fn add_interval(&mut self, range: Range<usize>) -> Result<IntervalId, EngineError> {
        self.ensure_idle()?;
        if range.start >= range.end || range.end > self.buffer.char_count() {
            return Err(EngineError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }

        let start = self.buffer.position_from_index(range.start);
        let end = self.buffer.position_from_index(range.end - 1);
        let id = self
            .intervals
            .insert(Interval::new(start, end, self.palette.next_color()))?;
        self.intervals.recolor(&mut self.palette);
        self.status = MatchStatus::Matches(self.intervals.len());
        self.notify_matches_changed();
        Ok(id)
    }

    /// Remove an interval (e.g. the user deleted a match).
    pub fn remove_interval(&mut self, id: IntervalId) -> Result<Interval, EngineError> {
        self.ensure_idle()?;
        let removed = self.intervals.remove(id)?;
        self.intervals.recolor(&mut self.palette);
        self.status = MatchStatus::Matches(self.intervals.len());
        self.notify_matches_changed();
        Ok(removed)
    }

    /// Move one endpoint of an interval to `position`.
    ///
    /// The position must be a legal buffer position that keeps the interval ordered and clear of
    /// its neighbours. Not available during a drag.
    pub fn move_boundary(
        &mut self,
        id: IntervalId,
        endpoint: Endpoint,
        position: Position,
    ) -> Result<(), EngineError> {
        self.ensure_idle()?;
        if !is_legal(&self.buffer, &position) {
            return Err(EngineError::IllegalPosition(position));
        }
        let position = self.buffer.position(position.line, position.column);
        self.intervals.set_endpoint(id, endpoint, position)?;
        self.notify_boundary_moved(id);
        Ok(())
    }

    /// Begin dragging `endpoint` of interval `id`. The buffer becomes read-only.
    pub fn begin_drag(
        &mut self,
        id: IntervalId,
        endpoint: Endpoint,
        focus: FocusState,
    ) -> Result<(), EngineError> {
        self.ensure_idle()?;
        let session = DragSession::begin(
            &self.buffer,
            &self.intervals,
            id,
            endpoint,
            focus,
            self.drag_options,
        )?;
        self.drag = Some(session);
        self.notify(&EngineEvent::EditingSuspended);
        Ok(())
    }

    /// Forward a pointer location (text-area local pixels) to the active drag.
    ///
    /// Returns the interval's new state if the endpoint moved, `None` if the pointer still maps
    /// to the current position.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<Option<Interval>, EngineError> {
        let Some(session) = self.drag.as_mut() else {
            return Err(EngineError::NotDragging);
        };
        let (id, endpoint) = (session.interval(), session.endpoint());
        let Some(position) = session.pointer_move(&self.buffer, &self.mapper, x, y) else {
            return Ok(None);
        };

        self.intervals.set_endpoint(id, endpoint, position)?;
        self.notify_boundary_moved(id);
        Ok(self.intervals.get(id).cloned())
    }

    /// Finish the active drag and return the focus state to restore.
    pub fn end_drag(&mut self) -> Result<FocusState, EngineError> {
        let session = self.drag.take().ok_or(EngineError::NotDragging)?;
        let focus = session.end();
        self.notify(&EngineEvent::EditingRestored { focus });
        Ok(focus)
    }

    fn ensure_idle(&self) -> Result<(), EngineError> {
        if self.drag.is_some() {
            Err(EngineError::DragInProgress)
        } else {
            Ok(())
        }
    }

    fn cancel_drag(&mut self) {
        if let Some(session) = self.drag.take() {
            let focus = session.end();
            self.notify(&EngineEvent::EditingRestored { focus });
        }
    }

    fn fail_pattern(&mut self, err: &PatternError) {
        log::warn!("{}", err);
        self.pattern = None;
        self.cancel_drag();
        self.intervals.clear();
        self.palette.reset();
        self.status = MatchStatus::Error;
        self.notify_matches_changed();
        let PatternError::Invalid { message, .. } = err;
        self.notify(&EngineEvent::InvalidPattern {
            message: message.clone(),
        });
    }

    fn rescan(&mut self) {
        self.intervals.clear();
        self.palette.reset();

        let Some(pattern) = &self.pattern else {
            self.status = MatchStatus::Idle;
            self.notify_matches_changed();
            return;
        };

        match scan(&self.buffer, pattern, &mut self.palette) {
            ScanOutcome::InfiniteMatches => {
                self.status = MatchStatus::Infinite;
                self.notify_matches_changed();
                self.notify(&EngineEvent::InfiniteMatches);
            }
            ScanOutcome::Matches(found) => {
                for interval in found {
                    if let Err(err) = self.intervals.insert(interval) {
                        log::error!("scan produced an overlapping match: {}", err);
                    }
                }
                self.status = MatchStatus::Matches(self.intervals.len());
                self.notify_matches_changed();
            }
        }
    }

    fn notify_matches_changed(&mut self) {
        let intervals = self
            .intervals
            .iter()
            .map(|(id, interval)| (id, interval.clone()))
            .collect();
        self.notify(&EngineEvent::MatchesChanged { intervals });
    }

    fn notify_boundary_moved(&mut self, id: IntervalId) {
        if let Some(interval) = self.intervals.get(id) {
            let event = EngineEvent::BoundaryMoved {
                id,
                start: interval.start,
                end: interval.end,
            };
            self.notify(&event);
        }
    }

    fn notify(&mut self, event: &EngineEvent) {
        for callback in &mut self.callbacks {
            callback(event);
        }
    }
}
