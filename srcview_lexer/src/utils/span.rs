//! Source location tracking for token streams
//!
//! Tokens carry a byte offset and a 1-based line. These types describe a
//! location or a range in those terms so that log events and error values
//! can point back into the original source.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
}

impl Position {
    /// Create a new position
    pub fn new(offset: usize, line: u32) -> Self {
        Self { offset, line }
    }

    /// Create the starting position (offset 0, line 1)
    pub fn start() -> Self {
        Self { offset: 0, line: 1 }
    }

    /// Advance position past a string, counting line breaks
    pub fn advance_str(self, s: &str) -> Self {
        Self {
            offset: self.offset + s.len(),
            line: self.line + count_line_breaks(s),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.line, self.offset)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Span covering `text` placed at `start`
    pub fn covering(start: Position, text: &str) -> Self {
        Self {
            start,
            end: start.advance_str(text),
        }
    }

    /// Get the start position of this span
    pub fn start(&self) -> Position {
        self.start
    }

    /// Get the end position of this span
    pub fn end(&self) -> Position {
        self.end
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };

        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "line {} [{}..{})", self.start.line, self.start.offset, self.end.offset)
        } else {
            write!(
                f,
                "lines {}-{} [{}..{})",
                self.start.line, self.end.line, self.start.offset, self.end.offset
            )
        }
    }
}

/// Number of line breaks in `s`. `\r\n` counts once, a lone `\r` counts once.
pub fn count_line_breaks(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                count += 1;
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => count += 1,
            _ => {}
        }
        i += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance_str("ab\ncd");
        assert_eq!(pos, Position::new(5, 2));

        let pos = Position::new(10, 3).advance_str("\r\n\r\n");
        assert_eq!(pos, Position::new(14, 5));
    }

    #[test]
    fn test_line_break_counting() {
        assert_eq!(count_line_breaks(""), 0);
        assert_eq!(count_line_breaks("abc"), 0);
        assert_eq!(count_line_breaks("\n\n"), 2);
        assert_eq!(count_line_breaks("\r\n"), 1);
        assert_eq!(count_line_breaks("\r\r\n"), 2);
    }

    #[test]
    fn test_span_covering_and_merge() {
        let a = Span::covering(Position::new(0, 1), "foo");
        let b = Span::covering(Position::new(3, 1), "\nbar");
        assert_eq!(a.len(), 3);
        assert_eq!(b.end, Position::new(7, 2));

        let merged = a.merge(b);
        assert_eq!(merged.start.offset, 0);
        assert_eq!(merged.end.offset, 7);
        assert_eq!(merged.to_string(), "lines 1-2 [0..7)");
        assert!(!merged.is_empty());
    }
}
