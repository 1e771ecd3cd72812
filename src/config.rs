//! Reflow options.

use crate::wrap::DEFAULT_WIDTH;

/// Inclusive, 1-indexed line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Target column width.
    pub width: usize,
    /// Only lines in this range are reflowed.
    pub lines: Option<LineRange>,
    /// Reflow only comment runs and docstrings, leaving code untouched.
    pub comments_only: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            lines: None,
            comments_only: false,
        }
    }
}

impl Options {
    pub fn in_range(&self, line: usize) -> bool {
        self.lines.map_or(true, |range| range.contains(line))
    }
}
