//! Buffer query interface.
//!
//! The engine stores no text of its own. Hosts hand it something that implements [`TextBuffer`]
//! (usually a thin adapter over their editor widget's document). [`RopeBuffer`] is a
//! self-contained implementation backed by a [`Rope`] for hosts without one, and for tests.
//!
//! All offsets are **character** offsets. Only `\n` separates lines; `\r` is an ordinary
//! character.

use crate::position::Position;
use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

/// Read-only queries the engine needs from the text buffer.
pub trait TextBuffer {
    /// Number of logical lines. Always at least 1 (an empty buffer has one empty line).
    fn line_count(&self) -> usize;

    /// Length of `line` in characters, excluding its trailing `\n`. Returns 0 for out-of-range lines.
    fn line_len(&self, line: usize) -> usize;

    /// Content of `line`, excluding its trailing `\n`. Empty for out-of-range lines.
    fn line_text(&self, line: usize) -> Cow<'_, str>;

    /// Total number of characters, line separators included.
    fn char_count(&self) -> usize;

    /// The whole buffer as a string.
    fn text(&self) -> Cow<'_, str>;

    /// Text of the half-open character range `range`, clamped to the buffer.
    fn text_between(&self, range: Range<usize>) -> String;

    /// Converts a flat character offset (clamped to `char_count`) into a position.
    fn position_from_index(&self, index: usize) -> Position;

    /// Converts `(line, column)` into a flat character offset.
    ///
    /// Lines past the end map to `char_count`; columns are capped to the line's length.
    fn index_from_position(&self, line: usize, column: usize) -> usize;

    /// Builds a [`Position`] for `(line, column)`, deriving its flat index.
    fn position(&self, line: usize, column: usize) -> Position {
        Position::new(line, column, self.index_from_position(line, column))
    }
}

/// A [`TextBuffer`] backed by a rope.
#[derive(Debug, Clone, Default)]
pub struct RopeBuffer {
    rope: Rope,
}

impl RopeBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build a buffer from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Replace the whole content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Insert `text` at character offset `char_offset` (clamped to the end of the buffer).
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        let at = char_offset.min(self.rope.len_chars());
        self.rope.insert(at, text);
    }

    /// Remove the half-open character range `range` (clamped to the buffer).
    pub fn remove(&mut self, range: Range<usize>) {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Borrow the underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }
}

impl TextBuffer for RopeBuffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        if line >= self.rope.len_lines() {
            return Cow::Borrowed("");
        }
        let slice = self.rope.line(line).slice(..self.line_len(line));
        match slice.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(slice.to_string()),
        }
    }

    fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    fn text(&self) -> Cow<'_, str> {
        match self.rope.slice(..).as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(self.rope.to_string()),
        }
    }

    fn text_between(&self, range: Range<usize>) -> String {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.rope.slice(start..end).to_string()
    }

    fn position_from_index(&self, index: usize) -> Position {
        let index = index.min(self.rope.len_chars());
        let line = self.rope.char_to_line(index);
        let column = index - self.rope.line_to_char(line);
        Position::new(line, column, index)
    }

    fn index_from_position(&self, line: usize, column: usize) -> usize {
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        self.rope.line_to_char(line) + column.min(self.line_len(line))
    }
}
