//! Error types shared by the match-interval engine.
//!
//! None of these are fatal: each one is recoverable by the caller, and the engine itself turns
//! pattern and scan failures into status notifications instead of propagating them.

use crate::intervals::IntervalId;
use crate::position::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// A pattern could not be compiled.
pub enum PatternError {
    #[error("invalid pattern '{pattern}': {message}")]
    /// The regex compiler rejected the pattern.
    Invalid {
        /// The raw pattern text.
        pattern: String,
        /// The compiler's error message.
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors raised by [`IntervalList`](crate::intervals::IntervalList) mutations.
pub enum IntervalError {
    #[error("interval {start}..={end} overlaps an existing interval")]
    /// The interval collides with (or ties on `start` with) an interval already in the list.
    Overlap {
        /// Start of the rejected interval.
        start: Position,
        /// End of the rejected interval.
        end: Position,
    },

    #[error("interval start {start} is after its end {end}")]
    /// `start > end`.
    Inverted {
        /// Requested start.
        start: Position,
        /// Requested end.
        end: Position,
    },

    #[error("interval {0:?} is not in the list")]
    /// The id refers to an interval that was removed (or never inserted).
    Stale(IntervalId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// A neighbour position was requested past one of the buffer's extremes.
pub enum BufferBoundaryError {
    #[error("no position exists before {0}")]
    /// `predecessor` of the buffer's first position.
    BeforeFirst(Position),

    #[error("no position exists after {0}")]
    /// `successor` of the buffer's last position.
    AfterLast(Position),
}

#[derive(Debug, Error)]
/// Errors returned by [`MatchEngine`](crate::engine::MatchEngine) commands.
pub enum EngineError {
    #[error(transparent)]
    /// Pattern compilation failed.
    Pattern(#[from] PatternError),

    #[error(transparent)]
    /// An interval list mutation was rejected.
    Interval(#[from] IntervalError),

    #[error("the buffer is read-only while a boundary is being dragged")]
    /// A text edit was attempted during a drag.
    BufferLocked,

    #[error("a boundary drag is already in progress")]
    /// `begin_drag` was called while another drag session is active.
    DragInProgress,

    #[error("no boundary drag is in progress")]
    /// A drag event arrived without an active session.
    NotDragging,

    #[error("position {0} is not a legal buffer position")]
    /// A position outside the buffer (or past its line's length) was supplied.
    IllegalPosition(Position),

    #[error("character range {start}..{end} is outside the buffer")]
    /// A flat character range does not fit the buffer.
    InvalidRange {
        /// Inclusive start character offset.
        start: usize,
        /// Exclusive end character offset.
        end: usize,
    },
}

#[derive(Debug, Error)]
/// Configuration loading failed.
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    /// The configuration document is not valid JSON for [`EngineConfig`](crate::config::EngineConfig).
    Json(#[from] serde_json::Error),
}
