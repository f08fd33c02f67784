//! Match scanner.
//!
//! Runs a compiled pattern over the buffer and turns each match into an [`Interval`]. Offsets
//! reported by `regex` are bytes; everything leaving this module is in characters.
//!
//! In global mode the scanner resumes after each match. A zero-length match found exactly at the
//! resume cursor would never advance, so it is reported as [`ScanOutcome::InfiniteMatches`] and
//! all intervals collected so far are discarded.

use crate::buffer::TextBuffer;
use crate::error::PatternError;
use crate::intervals::{Interval, Palette};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Options that control how a pattern is compiled and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Keep scanning after the first match.
    pub global: bool,
    /// Case-insensitive matching.
    pub case_insensitive: bool,
    /// `^`/`$` match at line boundaries.
    pub multi_line: bool,
    /// `.` also matches `\n`.
    pub dot_matches_new_line: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            global: true,
            case_insensitive: false,
            multi_line: false,
            dot_matches_new_line: false,
        }
    }
}

/// A pattern ready to scan with.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    options: ScanOptions,
}

impl CompiledPattern {
    /// Compile `pattern` with `options`.
    pub fn compile(pattern: &str, options: ScanOptions) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(options.case_insensitive)
            .multi_line(options.multi_line)
            .dot_matches_new_line(options.dot_matches_new_line)
            .build()
            .map_err(|err| PatternError::Invalid {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            options,
        })
    }

    /// The raw pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Options the pattern was compiled with.
    pub fn options(&self) -> ScanOptions {
        self.options
    }

    /// Returns `true` if the pattern keeps scanning after the first match.
    pub fn is_global(&self) -> bool {
        self.options.global
    }
}

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scan terminated; intervals are ordered and non-overlapping.
    Matches(Vec<Interval>),
    /// A non-advancing zero-length match was found in global mode.
    InfiniteMatches,
}

impl ScanOutcome {
    /// Number of matches (zero for an infinite-match outcome).
    pub fn match_count(&self) -> usize {
        match self {
            Self::Matches(intervals) => intervals.len(),
            Self::InfiniteMatches => 0,
        }
    }
}

/// Byte/char offset translation for one text snapshot.
#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

/// Run `pattern` over `buffer`, colouring each match from `palette`.
pub fn scan<B: TextBuffer + ?Sized>(
    buffer: &B,
    pattern: &CompiledPattern,
    palette: &mut Palette,
) -> ScanOutcome {
    let text = buffer.text();
    let index = CharIndex::new(&text);
    let mut intervals = Vec::new();
    let mut cursor = 0usize;

    palette.reset();
    while cursor <= text.len() {
        let Some(m) = pattern.regex.find_at(&text, cursor) else {
            break;
        };

        if m.is_empty() {
            if pattern.is_global() && m.start() == cursor {
                log::warn!(
                    "pattern '{}' matched the empty string at byte {}; scan would not advance",
                    pattern.as_str(),
                    cursor
                );
                return ScanOutcome::InfiniteMatches;
            }
            if !pattern.is_global() {
                break;
            }
            // An empty match ahead of the cursor becomes the new cursor; the next iteration
            // finds it again at the cursor and reports the runaway.
            cursor = m.start();
            continue;
        }

        let start_char = index.byte_to_char(m.start());
        let end_char = index.byte_to_char(m.end());
        let start = buffer.position_from_index(start_char);
        let end = buffer.position_from_index(end_char - 1);
        intervals.push(Interval::new(start, end, palette.next_color()));

        if !pattern.is_global() {
            break;
        }
        cursor = m.end();
    }

    log::debug!(
        "pattern '{}' produced {} matches",
        pattern.as_str(),
        intervals.len()
    );
    ScanOutcome::Matches(intervals)
}
