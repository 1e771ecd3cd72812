//! Structural parser.
//!
//! A recursive-descent pass over a line sequence. Each body is a run of
//! elements at one indent; each element is the first block recognizer in
//! [`Run::RECOGNIZERS`] that accepts the current line. Prose goes through the
//! [`Wrapper`], everything else is copied verbatim, and nothing is kept as a
//! tree: blocks are flattened into an [`Output`] as soon as they are seen.
//!
//! Recognizers speculate freely. Every cursor move is recorded, and a
//! recognizer that turns out not to apply rewinds to where it started, so
//! the next one in line sees the untouched position.

mod blocks;
pub mod cursor;
pub mod patterns;

use crate::error::FormatWarning;
use crate::wrap::{nowrap, Wrapper, DEFAULT_WIDTH};
use cursor::{is_blank, Cursor};

/// Bodies nested deeper than this raise a [`FormatWarning`].
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Kind of a recognized block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    BlockQuote,
    LineBlock,
    OptionList,
    FieldList,
    ListItem,
    Title,
    SimpleTable,
    GridTable,
    DefinitionList,
    Doctest,
    Transition,
    Directive,
    Footnote,
    Comment,
    QuotedLiteral,
    LiteralBlock,
}

/// One piece of parser output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Text reflowed to the width.
    Wrapped(String),
    /// Text copied as is, possibly re-indented.
    Verbatim(String),
}

impl Fragment {
    pub fn as_str(&self) -> &str {
        match self {
            Fragment::Wrapped(s) | Fragment::Verbatim(s) => s,
        }
    }
}

/// Append-only output buffer threaded through every recognizer.
#[derive(Debug, Default)]
pub struct Output {
    fragments: Vec<Fragment>,
}

impl Output {
    pub fn wrapped(&mut self, text: String) {
        if !text.is_empty() {
            self.fragments.push(Fragment::Wrapped(text));
        }
    }

    pub fn verbatim(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.fragments.push(Fragment::Verbatim(text));
        }
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}

/// Result of one parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub fragments: Vec<Fragment>,
    /// Set when the parse stopped early on malformed markup. The input
    /// left after that point is the last fragment, copied as is.
    pub warning: Option<FormatWarning>,
}

impl Parsed {
    pub fn text(&self) -> String {
        self.fragments.iter().map(Fragment::as_str).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parser {
    wrapper: Wrapper,
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl Parser {
    pub fn new(width: usize) -> Self {
        Self {
            wrapper: Wrapper::new(width),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Reflow `lines` as one document whose elements sit at `indent`; the
    /// first line starts at column `first_indent.len()`.
    pub fn parse(&self, lines: &[&str], indent: &str, first_indent: &str) -> Parsed {
        self.parse_from(lines, indent, first_indent, 1)
    }

    /// Same as [`Parser::parse`] for lines that start at line `first_line`
    /// of a larger document, so warnings point into that document.
    pub fn parse_from(
        &self,
        lines: &[&str],
        indent: &str,
        first_indent: &str,
        first_line: usize,
    ) -> Parsed {
        let mut run = Run {
            wrapper: &self.wrapper,
            cursor: Cursor::new(lines),
            depth: 0,
            max_depth: self.max_depth,
            line_offset: first_line.saturating_sub(1),
        };
        let mut out = Output::default();
        let warning = run.document(&mut out, indent, first_indent).err();
        if let Some(w) = &warning {
            log::debug!("parse stopped early: {w}");
            out.verbatim(run.cursor.remainder());
        }
        Parsed {
            fragments: out.into_fragments(),
            warning,
        }
    }
}

type Recognizer<'p, 'a> =
    fn(&mut Run<'p, 'a>, &mut Output, &str, &str) -> Result<bool, FormatWarning>;

/// State of one parse call.
struct Run<'p, 'a> {
    wrapper: &'p Wrapper,
    cursor: Cursor<'a>,
    depth: usize,
    max_depth: usize,
    line_offset: usize,
}

impl<'p, 'a> Run<'p, 'a> {
    /// Tried in order; the first recognizer that accepts the line wins.
    const RECOGNIZERS: [(BlockKind, Recognizer<'p, 'a>); 14] = [
        (BlockKind::BlockQuote, Self::block_quote),
        (BlockKind::LineBlock, Self::line_block),
        (BlockKind::OptionList, Self::option_list),
        (BlockKind::FieldList, Self::field_list),
        (BlockKind::ListItem, Self::list_item),
        (BlockKind::Title, Self::title),
        (BlockKind::SimpleTable, Self::simple_table),
        (BlockKind::GridTable, Self::grid_table),
        (BlockKind::DefinitionList, Self::definition_list),
        (BlockKind::Doctest, Self::doctest),
        (BlockKind::Transition, Self::transition),
        (BlockKind::Comment, Self::explicit_markup),
        (BlockKind::QuotedLiteral, Self::quoted_literal),
        (BlockKind::Paragraph, Self::paragraph),
    ];

    fn document(
        &mut self,
        out: &mut Output,
        indent: &str,
        first_indent: &str,
    ) -> Result<(), FormatWarning> {
        let mut first = Some(first_indent);
        while let Some(rest) = self.cursor.current() {
            if rest.is_empty() {
                // stripped down to nothing, the line is already out
                self.cursor.advance();
                continue;
            }
            if is_blank(rest) {
                out.verbatim(rest);
                self.cursor.advance();
                continue;
            }
            let before = self.cursor.position();
            self.body(out, indent, first.take())?;
            if self.cursor.position() == before {
                // nothing can take this line; keep the rest untouched
                log::debug!("unparsed input from line {}", self.line_number());
                out.verbatim(self.cursor.remainder());
                break;
            }
        }
        Ok(())
    }

    /// Elements at `indent` separated by blank runs.
    fn body(
        &mut self,
        out: &mut Output,
        indent: &str,
        first_indent: Option<&str>,
    ) -> Result<bool, FormatWarning> {
        if self.depth >= self.max_depth {
            return Err(self.warning("Nesting too deep"));
        }
        self.depth += 1;
        let result = self.body_elements(out, indent, first_indent);
        self.depth -= 1;
        result
    }

    fn body_elements(
        &mut self,
        out: &mut Output,
        indent: &str,
        first_indent: Option<&str>,
    ) -> Result<bool, FormatWarning> {
        let first = match first_indent {
            Some(f) if f >= indent => f,
            _ => indent,
        };
        let matched = self.element(out, indent, first)?;

        while let Some(line) = self.cursor.line() {
            if !is_blank(line) {
                break;
            }
            let blanks = self.blank()?;
            match self.cursor.line() {
                Some(_) if self.cursor.indent() >= indent => {
                    out.verbatim(blanks);
                    self.cursor.strip(indent.len());
                    out.verbatim(indent);
                    self.element(out, indent, indent)?;
                }
                Some(_) => {
                    self.unread_blanks();
                    break;
                }
                None => out.verbatim(blanks),
            }
        }
        Ok(matched)
    }

    fn element(
        &mut self,
        out: &mut Output,
        indent: &str,
        first_indent: &str,
    ) -> Result<bool, FormatWarning> {
        let line = self.line_number();
        for (kind, recognize) in Self::RECOGNIZERS {
            if recognize(self, out, indent, first_indent)? {
                log::trace!("{kind:?} at line {line}");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /* ============================ Cursor helpers ============================ */

    /// Consume a blank run and return it. A non-blank line here means the
    /// indentation is broken.
    fn blank(&mut self) -> Result<String, FormatWarning> {
        let mut blanks = String::new();
        // one history entry covers the whole run
        while let Some(line) = self.cursor.line().filter(|l| is_blank(l)) {
            if blanks.is_empty() {
                self.cursor.advance();
            } else {
                self.cursor.advance_untracked();
            }
            blanks.push_str(line);
        }
        if blanks.is_empty() {
            if let Some(line) = self.cursor.line() {
                return Err(self.warning(format!("Incorrect indentation {line:?}")));
            }
        }
        Ok(blanks)
    }

    /// Give back a blank run consumed by [`Run::blank`] right before.
    fn unread_blanks(&mut self) {
        if self.cursor.prev_line().is_some_and(is_blank) {
            self.cursor.restore();
        }
    }

    /// When the next line is non-blank and at least as indented as
    /// `indent`, strip and re-emit `indent` and report that the current
    /// construct goes on. Otherwise give back any blank run just read.
    fn continues(&mut self, out: &mut Output, indent: &str) -> bool {
        if self.cursor.text_line().is_none() {
            return false;
        }
        if self.cursor.indent() >= indent {
            self.cursor.strip(indent.len());
            out.verbatim(indent);
            true
        } else {
            self.unread_blanks();
            false
        }
    }

    fn emit(&self, out: &mut Output, text: &str, indent: &str) {
        out.verbatim(nowrap(text, indent));
    }

    fn emit_wrapped(&self, out: &mut Output, text: &str, indent: &str, first_indent: &str) {
        out.wrapped(self.wrapper.wrap(text, indent, first_indent));
    }

    fn line_number(&self) -> usize {
        self.cursor.line_number() + self.line_offset
    }

    fn warning(&self, message: impl Into<String>) -> FormatWarning {
        FormatWarning::new(message, self.line_number())
    }
}
