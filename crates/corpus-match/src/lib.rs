#![warn(missing_docs)]
//! Corpus Match - Headless Match-Interval Engine
//!
//! # Overview
//!
//! `corpus-match` highlights the matches of a user-edited regular expression inside a text
//! buffer ("corpus") and lets the user adjust match boundaries by dragging handles. It renders
//! nothing: the host view layer owns the text widget and the drawing, forwards buffer, pattern
//! and pointer events into the engine, and receives change notifications back.
//!
//! # Core Features
//!
//! - **Match Scanning**: regex scan with explicit detection of non-advancing zero-length matches
//! - **Interval List**: ordered, non-overlapping match intervals with stable ids and O(1) neighbour lookup
//! - **Boundary Dragging**: drag sessions clamped against neighbouring matches and the buffer extent
//! - **Coordinate Mapping**: position/pixel conversion on a monospace grid with soft wrapping
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  MatchEngine (events, status, commands)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Drag Sessions (grips)                      │  ← Interaction
//! ├─────────────────────────────────────────────┤
//! │  Match Scanner        │  Coordinate Mapper  │  ← Geometry & Matching
//! ├─────────────────────────────────────────────┤
//! │  Interval List (arena + ordered links)      │  ← Match State
//! ├─────────────────────────────────────────────┤
//! │  Position Model over TextBuffer             │  ← Buffer Access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use corpus_match::{EngineConfig, Endpoint, FocusState, MatchEngine, MatchStatus};
//!
//! let mut engine = MatchEngine::from_text("abc def 123", EngineConfig::default());
//! assert_eq!(engine.set_pattern(r"[a-z]+").unwrap(), MatchStatus::Matches(2));
//!
//! // Drag the end of the first match one cell to the right.
//! let first = engine.intervals().first().unwrap();
//! engine.begin_drag(first, Endpoint::End, FocusState::default()).unwrap();
//! let cell = engine.mapper().metrics().char_width;
//! engine.pointer_move(3.5 * cell, 1.0).unwrap();
//! engine.end_drag().unwrap();
//!
//! assert_eq!(engine.match_ranges()[0], 0..4);
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - Buffer query trait and a rope-backed implementation
//! - [`position`] - Positions, ordering and neighbour steps
//! - [`intervals`] - Intervals, palette and the ordered interval list
//! - [`scanner`] - Pattern compilation and scanning
//! - [`layout`] - Coordinate mapping and soft wrap
//! - [`grip`] - Boundary drag sessions
//! - [`engine`] - Engine façade, events and status
//! - [`config`] - Engine configuration
//! - [`error`] - Error types

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod grip;
pub mod intervals;
pub mod layout;
pub mod position;
pub mod scanner;

pub use buffer::{RopeBuffer, TextBuffer};
pub use config::EngineConfig;
pub use engine::{EngineEvent, EngineEventCallback, MatchEngine, MatchStatus};
pub use error::{BufferBoundaryError, ConfigError, EngineError, IntervalError, PatternError};
pub use grip::{DragBounds, DragOptions, DragSession, FocusState, drag_bounds};
pub use intervals::{
    ColorTag, DEFAULT_COLOR, Endpoint, Interval, IntervalId, IntervalList, Neighbors, Palette,
};
pub use layout::{CoordinateMapper, GridMetrics, Rect};
pub use position::{
    Position, clamp_to_line, compare, first_position, last_position, predecessor, successor,
};
pub use scanner::{CompiledPattern, ScanOptions, ScanOutcome, scan};
