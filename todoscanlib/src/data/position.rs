//! Offset to line/column conversion.
//!
//! Regex matches report byte offsets into the whole file buffer; reports need
//! 1-based line numbers and character columns. [`PositionIndex`] precomputes
//! the cumulative line ends once per file so each lookup is a binary search.

use serde::{Deserialize, Serialize};

/// A line/column pair inside a source file.
///
/// Lines are 1-based. Columns count characters from the start of the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line-end table for one file's text.
pub struct PositionIndex<'a> {
    text: &'a str,
    /// `line_ends[i]` is the byte offset just past line `i`, terminator included
    line_ends: Vec<usize>,
}

impl<'a> PositionIndex<'a> {
    /// Build the table by splitting on `\n` and summing `len(line) + 1`.
    pub fn new(text: &'a str) -> Self {
        let mut total = 0;
        let line_ends = text
            .split('\n')
            .map(|line| {
                total += line.len() + 1;
                total
            })
            .collect();
        Self { text, line_ends }
    }

    /// Number of `\n`-separated lines (a trailing newline yields an empty last line).
    pub fn line_count(&self) -> usize {
        self.line_ends.len()
    }

    /// Locate a byte offset.
    ///
    /// The line is the first line whose end lies beyond `offset`; the column is
    /// the number of characters between that line's start and `offset`.
    /// Offsets past the final line end are clamped to the last line.
    pub fn locate(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let index = self
            .line_ends
            .partition_point(|&end| end <= offset)
            .min(self.line_ends.len() - 1);
        let line_start = if index == 0 {
            0
        } else {
            self.line_ends[index - 1]
        };
        let column = self.text[line_start..offset].chars().count();
        Position::new(index + 1, column)
    }

    /// Position of the character starting at `offset`, as a 1-based column.
    ///
    /// Same as locating the offset one character further on.
    pub fn locate_char(&self, offset: usize) -> Position {
        let width = self.text[offset..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.locate(offset + width)
    }
}
