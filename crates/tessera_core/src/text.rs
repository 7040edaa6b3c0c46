//! Source span and range types for location tracking.
//!
//! Tokens, AST nodes and diagnostics all carry a [`Span`]: a byte range plus
//! the 0-based line/column of both ends, so that suggested fixes can be
//! expressed as line/column edits without access to the source text.

use std::fmt;
use std::ops::Range;

/// A position in source text, measured as a byte offset from the start.
pub type TextPos = u32;

/// A text range with start and end positions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextRange {
    /// The byte offset where this range starts (inclusive).
    pub pos: TextPos,
    /// The byte offset where this range ends (exclusive).
    pub end: TextPos,
}

impl TextRange {
    /// Create a new text range.
    #[inline]
    pub fn new(pos: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= pos);
        Self { pos, end }
    }

    /// Create an empty range at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { pos, end: pos }
    }

    /// The length of this range in bytes.
    #[inline]
    pub fn len(&self) -> TextPos {
        self.end - self.pos
    }

    /// Whether this range is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    /// Convert to a byte range.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.pos as usize..self.end as usize
    }

    /// Whether this range contains a position.
    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.pos && pos < self.end
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.pos, self.end)
    }
}

/// Line and column information derived from source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct LineAndColumn {
    /// 0-based line number.
    pub line: u32,
    /// 0-based column, in characters.
    pub column: u32,
}

impl LineAndColumn {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for LineAndColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rendered 1-based, the way editors show positions.
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A located region of source text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub range: TextRange,
    pub start: LineAndColumn,
    pub end: LineAndColumn,
}

impl Span {
    pub fn new(range: TextRange, start: LineAndColumn, end: LineAndColumn) -> Self {
        Self { range, start, end }
    }

    /// A zero-width span at the start of this one.
    pub fn shrink_to_start(&self) -> Span {
        Span {
            range: TextRange::empty(self.range.pos),
            start: self.start,
            end: self.start,
        }
    }

    /// A zero-width span at the end of this one.
    pub fn shrink_to_end(&self) -> Span {
        Span {
            range: TextRange::empty(self.range.end),
            start: self.end,
            end: self.end,
        }
    }

    /// Return a new span covering both this span and the other.
    pub fn cover(&self, other: &Span) -> Span {
        let (start_pos, start) = if other.range.pos < self.range.pos {
            (other.range.pos, other.start)
        } else {
            (self.range.pos, self.start)
        };
        let (end_pos, end) = if other.range.end > self.range.end {
            (other.range.end, other.end)
        } else {
            (self.range.end, self.end)
        };
        Span {
            range: TextRange::new(start_pos, end_pos),
            start,
            end,
        }
    }

    /// Whether `other` begins exactly where this span ends.
    #[inline]
    pub fn touches(&self, other: &Span) -> bool {
        self.range.end == other.range.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.range, self.start)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// A map from byte offsets to line numbers, built from source text.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offsets of the start of each line.
    line_starts: Vec<TextPos>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Get the line number (0-based) for a byte offset.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => (line - 1) as u32,
        }
    }

    /// Get the line and column for a byte offset. Columns are byte-based here.
    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts[line as usize];
        LineAndColumn {
            line,
            column: pos - line_start,
        }
    }

    /// Build a span for a byte range.
    pub fn span(&self, range: TextRange) -> Span {
        Span::new(
            range,
            self.line_and_column_of(range.pos),
            self.line_and_column_of(range.end),
        )
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
