// Cursor over the line sequence with an undo history.

use memchr::memchr_iter;

/// Split `text` into lines, keeping each newline terminator.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::with_capacity(text.len() / 40 + 1);
    let mut start = 0usize;
    for nl in memchr_iter(b'\n', text.as_bytes()) {
        lines.push(&text[start..=nl]);
        start = nl + 1;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// True for a non-empty line made only of whitespace.
#[inline]
pub fn is_blank(line: &str) -> bool {
    !line.is_empty() && line.chars().all(char::is_whitespace)
}

#[inline]
fn is_indent_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Leading whitespace of `line`.
///
/// A blank line's indent includes its newline, so it never equals a
/// space-only indent. Compare indents of non-blank lines only.
pub fn indent_of(line: &str) -> &str {
    let n = line.bytes().take_while(|&b| is_indent_byte(b)).count();
    &line[..n]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    row: usize,
    col: usize,
    exhausted: bool,
}

/// Position in the line sequence.
///
/// `advance` and `strip` are the only primitives that move it, and both push
/// the previous position first so any caller can undo its own progress.
#[derive(Debug)]
pub struct Cursor<'a> {
    lines: Vec<&'a str>,
    row: usize,
    col: usize,
    exhausted: bool,
    history: Vec<Snapshot>,
}

impl<'a> Cursor<'a> {
    pub fn new(lines: &[&'a str]) -> Self {
        Self {
            lines: lines.to_vec(),
            row: 0,
            col: 0,
            exhausted: false,
            history: Vec::new(),
        }
    }

    /// Rest of the current line, possibly empty.
    pub fn current(&self) -> Option<&'a str> {
        if self.exhausted {
            return None;
        }
        self.lines.get(self.row).map(|l| &l[self.col..])
    }

    /// Rest of the current line, `None` when nothing is left of it.
    pub fn line(&self) -> Option<&'a str> {
        self.current().filter(|l| !l.is_empty())
    }

    /// Current line if it is non-blank.
    pub fn text_line(&self) -> Option<&'a str> {
        self.line().filter(|l| !is_blank(l))
    }

    pub fn indent(&self) -> &'a str {
        self.current().map(indent_of).unwrap_or("")
    }

    /// Raw line before the current one.
    pub fn prev_line(&self) -> Option<&'a str> {
        self.row
            .checked_sub(1)
            .and_then(|r| self.lines.get(r))
            .copied()
    }

    /// Raw line after the current one.
    pub fn next_line(&self) -> Option<&'a str> {
        self.lines.get(self.row + 1).copied()
    }

    /// 1-indexed number of the current line within this sequence.
    pub fn line_number(&self) -> usize {
        self.row + 1
    }

    /// Unconsumed input from the cursor on.
    pub fn remainder(&self) -> String {
        let mut rest = String::new();
        if let Some(line) = self.current() {
            rest.push_str(line);
        }
        for line in self.lines.iter().skip(self.row + 1) {
            rest.push_str(line);
        }
        rest
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            row: self.row,
            col: self.col,
            exhausted: self.exhausted,
        }
    }

    pub fn advance(&mut self) {
        self.history.push(self.snapshot());
        self.advance_untracked();
    }

    /// Move to the next line without recording history; used inside runs
    /// whose start is already recorded.
    pub fn advance_untracked(&mut self) {
        if self.row < self.lines.len() {
            self.row += 1;
        }
        self.col = 0;
        self.exhausted = false;
    }

    /// Drop `len` bytes of prefix from the current line.
    pub fn strip(&mut self, len: usize) {
        self.history.push(self.snapshot());
        let Some(line) = self.lines.get(self.row) else {
            return;
        };
        let mut col = (self.col + len).min(line.len());
        while !line.is_char_boundary(col) {
            col += 1;
        }
        self.col = col;
    }

    /// Drop the current line's own indentation.
    pub fn strip_indent(&mut self) {
        let len = self.indent().len();
        self.strip(len);
    }

    /// Undo the last primitive. With nothing left to undo the cursor is
    /// exhausted until the next `advance`.
    pub fn restore(&mut self) {
        match self.history.pop() {
            Some(snap) => {
                self.row = snap.row;
                self.col = snap.col;
                self.exhausted = snap.exhausted;
            }
            None => self.exhausted = true,
        }
    }

    pub fn mark(&self) -> usize {
        self.history.len()
    }

    /// Undo every primitive recorded since `mark`.
    pub fn rewind(&mut self, mark: usize) {
        while self.history.len() > mark {
            self.restore();
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}
