// Column wrapper: greedy word packing and verbatim re-indentation.

/// Column width used when none is given.
pub const DEFAULT_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapper {
    width: usize,
}

impl Default for Wrapper {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl Wrapper {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Greedily pack the words of `text` into lines.
    ///
    /// The first line starts at column `first_indent.len()` (the caller has
    /// already emitted whatever sits before it); continuation lines are
    /// prefixed with `indent`. A word is never split, so a word wider than the
    /// width sits alone on its line. Embedded line breaks become a single
    /// space. A trailing newline on `text` is kept.
    pub fn wrap(&self, text: &str, indent: &str, first_indent: &str) -> String {
        let (body, terminated) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, false),
        };
        let mut run = Run {
            out: String::with_capacity(text.len() + text.len() / 8 + indent.len()),
            col: first_indent.chars().count(),
            has_word: false,
            indent,
            indent_cols: indent.chars().count(),
        };

        let mut word_start: Option<usize> = None;
        for (i, ch) in body.char_indices() {
            if !ch.is_whitespace() {
                word_start.get_or_insert(i);
                continue;
            }
            if let Some(start) = word_start.take() {
                self.place(&mut run, &body[start..i]);
            }
            if ch != '\n' {
                run.out.push(ch);
                run.col += 1;
            } else if !run.out.is_empty() && !run.out.ends_with(' ') {
                run.out.push(' ');
                run.col += 1;
            }
        }
        if let Some(start) = word_start {
            self.place(&mut run, &body[start..]);
        }

        if terminated {
            run.out.push('\n');
        }
        run.out
    }

    fn place(&self, run: &mut Run<'_>, word: &str) {
        let len = word.chars().count();
        if !run.has_word || self.fits(run.col, len) {
            run.out.push_str(word);
            run.col += len;
        } else {
            let keep = run.out.trim_end().len();
            run.out.truncate(keep);
            run.out.push('\n');
            run.out.push_str(run.indent);
            run.out.push_str(word);
            run.col = run.indent_cols + len;
        }
        run.has_word = true;
    }

    // One column past the word is kept free for the separator.
    fn fits(&self, col: usize, len: usize) -> bool {
        col + len + 1 < self.width
    }
}

struct Run<'i> {
    out: String,
    col: usize,
    has_word: bool,
    indent: &'i str,
    indent_cols: usize,
}

/// Copy `text` as is, inserting `indent` after every internal line break
/// that is followed by a non-empty line.
pub fn nowrap(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + indent.len() * 4);
    for (i, piece) in text.split_inclusive('\n').enumerate() {
        if i > 0 && piece != "\n" {
            out.push_str(indent);
        }
        out.push_str(piece);
    }
    out
}
