//! Position model.
//!
//! A [`Position`] names one character of the buffer by `(line, column)`, carrying the flat
//! character index it corresponds to. Column `line_len` on a line names that line's `\n`, so
//! newlines are legal positions and can be covered by a match.
//!
//! The functions here are pure queries over a [`TextBuffer`] snapshot. Positions are not updated
//! when the buffer changes; re-derive them after every edit.

use crate::buffer::TextBuffer;
use crate::error::BufferBoundaryError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A `(line, column)` location plus its derived flat character index.
///
/// Equality and ordering look only at `(line, column)`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based logical line.
    pub line: usize,
    /// Zero-based column in characters.
    pub column: usize,
    /// Flat character offset into the buffer.
    pub index: usize,
}

impl Position {
    /// Create a position. `index` must agree with `(line, column)` in the buffer it refers to.
    pub const fn new(line: usize, column: usize, index: usize) -> Self {
        Self {
            line,
            column,
            index,
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line && self.column == other.column
    }
}

impl Eq for Position {}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// Lexicographic comparison on `(line, column)`.
pub fn compare(a: &Position, b: &Position) -> Ordering {
    a.cmp(b)
}

/// The buffer's first position, `(0, 0)`.
pub fn first_position<B: TextBuffer + ?Sized>(buffer: &B) -> Position {
    buffer.position(0, 0)
}

/// The position of the buffer's final character, or `(0, 0)` for an empty buffer.
pub fn last_position<B: TextBuffer + ?Sized>(buffer: &B) -> Position {
    match buffer.char_count() {
        0 => first_position(buffer),
        n => buffer.position_from_index(n - 1),
    }
}

/// Returns `true` if `p` names a character inside the buffer.
pub fn is_legal<B: TextBuffer + ?Sized>(buffer: &B, p: &Position) -> bool {
    p.line < buffer.line_count()
        && p.column <= buffer.line_len(p.line)
        && *p <= last_position(buffer)
}

/// The next legal position after `p`.
///
/// Stepping past the end of a line lands on the first column of the next line.
pub fn successor<B: TextBuffer + ?Sized>(
    buffer: &B,
    p: &Position,
) -> Result<Position, BufferBoundaryError> {
    if *p >= last_position(buffer) {
        return Err(BufferBoundaryError::AfterLast(*p));
    }

    if p.column >= buffer.line_len(p.line) {
        Ok(buffer.position(p.line + 1, 0))
    } else {
        Ok(buffer.position(p.line, p.column + 1))
    }
}

/// The previous legal position before `p`.
///
/// Stepping back from the first column of a line lands on the previous line's newline.
pub fn predecessor<B: TextBuffer + ?Sized>(
    buffer: &B,
    p: &Position,
) -> Result<Position, BufferBoundaryError> {
    if p.column == 0 {
        if p.line == 0 {
            return Err(BufferBoundaryError::BeforeFirst(*p));
        }
        let line = p.line - 1;
        return Ok(buffer.position(line, buffer.line_len(line)));
    }

    let column = p.column.min(buffer.line_len(p.line) + 1) - 1;
    Ok(buffer.position(p.line, column))
}

/// Caps `p.line` to the last line and `p.column` to that line's length, re-deriving the index.
pub fn clamp_to_line<B: TextBuffer + ?Sized>(buffer: &B, p: &Position) -> Position {
    let line = p.line.min(buffer.line_count().saturating_sub(1));
    let column = p.column.min(buffer.line_len(line));
    buffer.position(line, column)
}
