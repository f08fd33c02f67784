//! Coordinate mapping between buffer positions and pixels.
//!
//! The text is laid out on a monospace grid: each character occupies one or more cells
//! (UAX #11 widths via `unicode-width`), each cell is `char_width` pixels wide and each visual
//! row is `line_height` pixels tall. With `wrap_columns` set, a logical line is soft-wrapped into
//! several visual rows.
//!
//! Pixel coordinates are local to the text area (origin at its top-left corner).

use crate::buffer::TextBuffer;
use crate::intervals::Interval;
use crate::position::{Position, clamp_to_line};
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// Default cell width in pixels.
pub const DEFAULT_CHAR_WIDTH: f32 = 14.4;
/// Default row height in pixels.
pub const DEFAULT_LINE_HEIGHT: f32 = 28.0;

/// Grid dimensions used to convert between cells and pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMetrics {
    /// Width of one cell in pixels.
    pub char_width: f32,
    /// Height of one visual row in pixels.
    pub line_height: f32,
    /// Soft-wrap width in cells; `None` disables wrapping.
    pub wrap_columns: Option<usize>,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            char_width: DEFAULT_CHAR_WIDTH,
            line_height: DEFAULT_LINE_HEIGHT,
            wrap_columns: None,
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Rect {
    /// Width in pixels.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height in pixels.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Returns `true` if `(x, y)` lies inside (left/top edges inclusive, right/bottom exclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }

    /// Vertical centre line.
    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

/// Number of cells a character occupies. Zero-width and control characters take one cell so
/// that every character can be hit.
pub fn cell_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1).max(1)
}

/// Start columns of each visual row of a line. The first entry is always 0.
pub fn wrap_starts(line: &str, wrap_columns: Option<usize>) -> Vec<usize> {
    let mut starts = vec![0];
    let Some(width) = wrap_columns.filter(|w| *w > 0) else {
        return starts;
    };

    let mut cells = 0usize;
    for (column, ch) in line.chars().enumerate() {
        let w = cell_width(ch);
        if cells > 0 && cells + w > width {
            starts.push(column);
            cells = 0;
        }
        cells += w;
    }
    starts
}

/// Converts between positions and pixel rectangles on a grid.
///
/// With wrapping enabled, row lookups walk every earlier line unless the mapper holds a row
/// index built by [`reindex`](Self::reindex). The index must be rebuilt after every buffer
/// change; an index whose line count no longer matches the buffer is ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoordinateMapper {
    metrics: GridMetrics,
    /// `row_starts[l]` is the first visual row of line `l`; the last entry is the row count.
    row_starts: Option<Vec<usize>>,
}

impl CoordinateMapper {
    /// Create a mapper for `metrics`.
    pub fn new(metrics: GridMetrics) -> Self {
        Self {
            metrics,
            row_starts: None,
        }
    }

    /// Create a mapper for `metrics` with a row index over `buffer`.
    pub fn indexed<B: TextBuffer + ?Sized>(metrics: GridMetrics, buffer: &B) -> Self {
        let mut mapper = Self::new(metrics);
        mapper.reindex(buffer);
        mapper
    }

    /// Current grid metrics.
    pub fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    /// Replace the grid metrics (e.g. after a font or viewport change). Drops the row index.
    pub fn set_metrics(&mut self, metrics: GridMetrics) {
        self.metrics = metrics;
        self.row_starts = None;
    }

    /// Rebuild the prefix sums of visual rows per line.
    pub fn reindex<B: TextBuffer + ?Sized>(&mut self, buffer: &B) {
        if !self.is_wrapping() {
            self.row_starts = None;
            return;
        }
        let mut starts = Vec::with_capacity(buffer.line_count() + 1);
        let mut row = 0usize;
        starts.push(row);
        for line in 0..buffer.line_count() {
            row += self.rows_of(buffer, line).len();
            starts.push(row);
        }
        self.row_starts = Some(starts);
    }

    /// Returns `true` if a row index matching `buffer`'s line count is present.
    pub fn is_indexed<B: TextBuffer + ?Sized>(&self, buffer: &B) -> bool {
        self.row_index(buffer).is_some()
    }

    fn row_index<B: TextBuffer + ?Sized>(&self, buffer: &B) -> Option<&[usize]> {
        self.row_starts
            .as_deref()
            .filter(|starts| starts.len() == buffer.line_count() + 1)
    }

    /// Row height, guarded against non-positive values.
    pub fn line_height(&self) -> f32 {
        if self.metrics.line_height > 0.0 {
            self.metrics.line_height
        } else {
            1.0
        }
    }

    /// Cell width, guarded against non-positive values.
    pub fn char_width(&self) -> f32 {
        if self.metrics.char_width > 0.0 {
            self.metrics.char_width
        } else {
            1.0
        }
    }

    fn is_wrapping(&self) -> bool {
        self.metrics.wrap_columns.is_some_and(|w| w > 0)
    }

    fn rows_of<B: TextBuffer + ?Sized>(&self, buffer: &B, line: usize) -> Vec<usize> {
        if self.is_wrapping() {
            wrap_starts(&buffer.line_text(line), self.metrics.wrap_columns)
        } else {
            vec![0]
        }
    }

    /// Global index of the first visual row of `line`.
    pub fn first_row_of_line<B: TextBuffer + ?Sized>(&self, buffer: &B, line: usize) -> usize {
        if !self.is_wrapping() {
            return line;
        }
        let line = line.min(buffer.line_count());
        match self.row_index(buffer) {
            Some(starts) => starts[line],
            None => (0..line).map(|l| self.rows_of(buffer, l).len()).sum(),
        }
    }

    /// Logical line and wrap segment shown on visual row `row`, clamped to the last row.
    fn locate_row<B: TextBuffer + ?Sized>(&self, buffer: &B, row: usize) -> (usize, usize) {
        let last_line = buffer.line_count().saturating_sub(1);
        if !self.is_wrapping() {
            return (row.min(last_line), 0);
        }

        if let Some(starts) = self.row_index(buffer) {
            let line = starts.partition_point(|s| *s <= row).saturating_sub(1);
            if line <= last_line {
                return (line, row - starts[line]);
            }
        } else {
            let mut first = 0usize;
            for line in 0..=last_line {
                let count = self.rows_of(buffer, line).len();
                if row < first + count {
                    return (line, row - first);
                }
                first += count;
            }
        }
        (last_line, self.rows_of(buffer, last_line).len() - 1)
    }

    /// Total number of visual rows.
    pub fn visual_row_count<B: TextBuffer + ?Sized>(&self, buffer: &B) -> usize {
        self.first_row_of_line(buffer, buffer.line_count())
    }

    /// Rectangle of the character at `p` as the text layout reports it.
    ///
    /// A line-end position has zero width. Use [`pixel_from_position`](Self::pixel_from_position)
    /// for a rectangle that keeps newlines selectable.
    pub fn char_rect<B: TextBuffer + ?Sized>(&self, buffer: &B, p: &Position) -> Rect {
        let p = clamp_to_line(buffer, p);
        let text = buffer.line_text(p.line);
        let starts = self.rows_of(buffer, p.line);
        let segment = starts.iter().rposition(|s| *s <= p.column).unwrap_or(0);
        let segment_start = starts[segment];

        let mut chars = text.chars().skip(segment_start);
        let x_cells: usize = chars
            .by_ref()
            .take(p.column - segment_start)
            .map(cell_width)
            .sum();
        let w_cells = chars.next().map(cell_width).unwrap_or(0);

        let row = self.first_row_of_line(buffer, p.line) + segment;
        let left = x_cells as f32 * self.char_width();
        let top = row as f32 * self.line_height();
        Rect {
            left,
            top,
            right: left + w_cells as f32 * self.char_width(),
            bottom: top + self.line_height(),
        }
    }

    /// Rectangle for rendering a boundary at `p`.
    ///
    /// Newline positions (zero visual width) on every line but the last get a synthesised
    /// one-cell-wide rectangle.
    pub fn pixel_from_position<B: TextBuffer + ?Sized>(&self, buffer: &B, p: &Position) -> Rect {
        let mut rect = self.char_rect(buffer, p);
        if rect.width() == 0.0 && p.line + 1 < buffer.line_count() {
            rect.right = rect.left + self.char_width();
        }
        rect
    }

    /// The legal position whose cell contains `(x, y)`.
    ///
    /// Cells are addressed by the pixel they contain, so a point anywhere inside a character's
    /// rectangle maps back to that character.
    ///
    /// Negative coordinates are treated as 0. Rows below the text map to the last row; columns
    /// past the end of a row map to its last legal column.
    pub fn position_from_pixel<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
        x: f32,
        y: f32,
    ) -> Position {
        let x = x.max(0.0);
        let y = y.max(0.0);
        let target_row = (y / self.line_height()).floor() as usize;
        let target_cell = (x / self.char_width()).floor() as usize;

        let (line, segment) = self.locate_row(buffer, target_row);
        let starts = self.rows_of(buffer, line);

        let line_len = buffer.line_len(line);
        let segment_start = starts[segment];
        let segment_end = starts.get(segment + 1).copied();

        let text = buffer.line_text(line);
        let mut cells = 0usize;
        let mut column = None;
        let row_chars = text
            .chars()
            .enumerate()
            .skip(segment_start)
            .take_while(|(c, _)| segment_end.is_none_or(|end| *c < end));
        for (c, ch) in row_chars {
            let w = cell_width(ch);
            if target_cell < cells + w {
                column = Some(c);
                break;
            }
            cells += w;
        }

        let column = column.unwrap_or(match segment_end {
            Some(end) => end - 1,
            None => line_len,
        });
        buffer.position(line, column.min(line_len))
    }

    /// Highlight rectangles covering `interval`, one per visual row it touches.
    ///
    /// Each row runs from the left edge of its first covered character to the right edge of its
    /// last. A covered newline contributes its one-cell rectangle.
    pub fn span_rects<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
        interval: &Interval,
    ) -> Vec<Rect> {
        let mut rects = Vec::new();
        let last_line = buffer.line_count().saturating_sub(1);
        for line in interval.start.line..=interval.end.line.min(last_line) {
            let line_len = buffer.line_len(line);
            let first = if line == interval.start.line {
                interval.start.column
            } else {
                0
            };
            let last = if line == interval.end.line {
                interval.end.column
            } else {
                line_len
            };
            let last = last.min(line_len);

            let starts = self.rows_of(buffer, line);
            for (segment, &segment_start) in starts.iter().enumerate() {
                let segment_last = starts.get(segment + 1).map_or(line_len, |next| next - 1);
                let lo = first.max(segment_start);
                let hi = last.min(segment_last);
                if lo > hi {
                    continue;
                }
                let left = self.pixel_from_position(buffer, &buffer.position(line, lo));
                let right = self.pixel_from_position(buffer, &buffer.position(line, hi));
                rects.push(Rect {
                    left: left.left,
                    top: left.top,
                    right: right.right,
                    bottom: left.bottom,
                });
            }
        }
        rects
    }
}
