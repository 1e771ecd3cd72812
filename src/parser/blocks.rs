// Block recognizers, one per entry of `Run::RECOGNIZERS`.
//
// Each takes the body indent (already stripped from the current line) and
// the column the first line starts at. `Ok(false)` means the block does not
// start here and the cursor is where it was.

use super::cursor::{indent_of, is_blank};
use super::patterns::{self, DOCTEST, EXPLICIT_MARKUP};
use super::{BlockKind, Output, Run};
use crate::error::FormatWarning;

fn spaces(n: usize) -> String {
    " ".repeat(n)
}

impl<'p, 'a> Run<'p, 'a> {
    pub(super) fn block_quote(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        if self.cursor.text_line().is_none() {
            return Ok(false);
        }
        let extra = self.cursor.indent();
        if !extra.starts_with(' ') {
            return Ok(false);
        }
        out.verbatim(extra);
        self.cursor.strip_indent();
        self.body(out, &format!("{indent}{extra}"), None)?;
        Ok(true)
    }

    /// `| line` runs. Marker lines are kept; a continuation aligned after
    /// the marker is kept too.
    pub(super) fn line_block(
        &mut self,
        out: &mut Output,
        indent: &str,
        first: &str,
    ) -> Result<bool, FormatWarning> {
        let mut matched = false;
        while let Some(line) = self.cursor.line() {
            let Some(marker) = patterns::line_block_marker(line) else {
                break;
            };
            matched = true;
            out.verbatim(line);
            let inner = format!("{indent}{}", spaces(marker));
            self.cursor.advance();
            if self.cursor.text_line().is_none() {
                break;
            }
            if self.cursor.indent() == inner {
                self.cursor.strip_indent();
                out.verbatim(inner.as_str());
                self.paragraph_with(out, &inner, first, true)?;
            }
            if !self.continues(out, indent) {
                break;
            }
        }
        Ok(matched)
    }

    pub(super) fn option_list(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let mut matched = false;
        while let Some(line) = self.cursor.line() {
            let Some(flags) = patterns::option_marker(line) else {
                break;
            };
            matched = true;
            let start = self.line_number();
            self.cursor.strip(flags.len());
            out.verbatim(flags);

            let rest = self.cursor.current().unwrap_or("");
            let inner = if !is_blank(rest) {
                let gap = self.cursor.indent();
                out.verbatim(gap);
                format!("{indent}{}{gap}", spaces(flags.chars().count()))
            } else {
                match self.cursor.next_line() {
                    Some(next) if !is_blank(next) && indent_of(next) > indent => {
                        out.verbatim(rest.trim_start_matches(' '));
                        self.cursor.advance();
                        let inner = self.cursor.indent();
                        out.verbatim(inner);
                        inner.to_string()
                    }
                    _ => {
                        return Err(FormatWarning::new(
                            format!("Incorrect option definition {:?}", line.trim_end()),
                            start,
                        ))
                    }
                }
            };
            self.cursor.strip_indent();
            self.body(out, &inner, Some(&inner))?;
            if !self.continues(out, indent) {
                break;
            }
        }
        Ok(matched)
    }

    /// `:name: value` runs. The value continues on lines indented like the
    /// line after the name; an inline value's first line is aligned after
    /// the name.
    pub(super) fn field_list(
        &mut self,
        out: &mut Output,
        indent: &str,
        first: &str,
    ) -> Result<bool, FormatWarning> {
        let mut matched = false;
        let mut first = first.to_string();
        while let Some(line) = self.cursor.line() {
            let Some(name) = patterns::field_name(line) else {
                break;
            };
            matched = true;
            self.cursor.strip(name.len());
            let value_indent = match self.cursor.next_line() {
                Some(next) if patterns::field_name(next.trim_start()).is_none() => {
                    if is_blank(next) {
                        Some(format!("{indent}{}", spaces(name.chars().count())))
                    } else {
                        Some(indent_of(next).to_string()).filter(|i| !i.is_empty())
                    }
                }
                _ => None,
            };
            out.verbatim(name);

            if !self.cursor.current().is_some_and(is_blank) {
                let gap = self.cursor.indent();
                self.cursor.strip_indent();
                out.verbatim(gap);
                first = spaces(indent.len() + name.chars().count() + gap.len());
            }
            match value_indent {
                Some(value_indent) => {
                    self.body(out, &value_indent, Some(&first))?;
                }
                None => {
                    let value = self.cursor.current().unwrap_or("");
                    self.emit_wrapped(out, value, &first, &first);
                    self.cursor.advance();
                }
            }
            first.clear();
            if !self.continues(out, indent) {
                break;
            }
        }
        Ok(matched)
    }

    /// Bullet and enumerated items; the item body sits after the marker.
    pub(super) fn list_item(
        &mut self,
        out: &mut Output,
        indent: &str,
        first: &str,
    ) -> Result<bool, FormatWarning> {
        let mut matched = false;
        let mut first = first;
        while let Some(line) = self.cursor.line() {
            let Some(marker) = patterns::list_marker(line) else {
                break;
            };
            matched = true;
            self.cursor.strip(marker.len());
            let gap = match self.cursor.text_line() {
                Some(_) => self.cursor.indent(),
                None => "",
            };
            let inner = format!("{indent}{}{gap}", spaces(marker.chars().count()));
            self.cursor.strip(gap.len());
            self.emit_wrapped(out, marker, indent, first);
            self.body(out, &inner, Some(&inner))?;
            first = "";
            if !self.continues(out, indent) {
                break;
            }
        }
        Ok(matched)
    }

    /// Optional over-line, text, under-line. Anything short of a full title
    /// rewinds.
    pub(super) fn title(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let mark = self.cursor.mark();
        let Some(line) = self.cursor.line() else {
            return Ok(false);
        };

        let mut over = None;
        let mut text_indent = indent;
        if let Some(rule) = patterns::title_rule(line) {
            over = Some((line, rule));
            self.cursor.advance();
            if self.cursor.line().is_some() {
                text_indent = self.cursor.indent();
                self.cursor.strip_indent();
            }
        }

        if let Some(text) = self.cursor.line() {
            self.cursor.advance();
            if self.cursor.line().is_some() && self.cursor.indent() == indent {
                self.cursor.strip_indent();
                let under = self.cursor.line().filter(|l| {
                    patterns::title_rule(l)
                        .is_some_and(|rule| over.map_or(true, |(_, o)| o == rule))
                });
                if let Some(under) = under {
                    if let Some((over_line, _)) = over {
                        out.verbatim(over_line);
                        out.verbatim(text_indent);
                    }
                    self.emit(out, text, text_indent);
                    out.verbatim(indent);
                    out.verbatim(under);
                    self.cursor.advance();
                    if self.cursor.line().is_some() && self.cursor.indent() == indent {
                        self.cursor.strip_indent();
                        out.verbatim(indent);
                        self.body(out, indent, None)?;
                    }
                    return Ok(true);
                }
            }
        }

        self.cursor.rewind(mark);
        Ok(false)
    }

    /// `====` rule, rows, rule; a rule followed by more rows goes on.
    pub(super) fn simple_table(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let Some(mut rule) = self.cursor.line().filter(|l| patterns::is_table_rule(l)) else {
            return Ok(false);
        };
        let start = self.line_number();
        let unfinished = || FormatWarning::new("Simple table is not finished", start);
        loop {
            out.verbatim(rule);
            self.cursor.advance();
            if self.cursor.text_line().is_none() {
                return Ok(true);
            }
            if !self.table_indent(out, indent) {
                return Err(unfinished());
            }
            while let Some(row) = self.cursor.line() {
                if patterns::is_table_rule(row) {
                    break;
                }
                out.verbatim(row);
                self.cursor.advance();
                if self.cursor.line().is_none() {
                    break;
                }
                if !self.table_indent(out, indent) {
                    return Err(unfinished());
                }
            }
            match self.cursor.line() {
                Some(l) if patterns::is_table_rule(l) => rule = l,
                _ => return Err(unfinished()),
            }
        }
    }

    /// Separator and `|` row lines alternating.
    pub(super) fn grid_table(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let Some(mut separator) = self.cursor.line().filter(|l| patterns::is_grid_rule(l)) else {
            return Ok(false);
        };
        let start = self.line_number();
        loop {
            out.verbatim(separator);
            self.cursor.advance();
            if self.cursor.text_line().is_none() {
                return Ok(true);
            }
            if !self.table_indent(out, indent)
                || !self.cursor.line().is_some_and(patterns::is_grid_row)
            {
                return Err(FormatWarning::new("Row expected", start));
            }
            while let Some(row) = self.cursor.line().filter(|l| patterns::is_grid_row(l)) {
                out.verbatim(row);
                self.cursor.advance();
                if self.cursor.text_line().is_none() {
                    break;
                }
                if !self.table_indent(out, indent) {
                    return Err(FormatWarning::new("Row separator expected", start));
                }
            }
            match self.cursor.line() {
                Some(l) if patterns::is_grid_rule(l) => separator = l,
                _ => return Err(FormatWarning::new("Row separator expected", start)),
            }
        }
    }

    /// Strips the table's indent from the next line. False when the line sits
    /// shallower, leaving the cursor on it untouched.
    fn table_indent(&mut self, out: &mut Output, indent: &str) -> bool {
        match self.cursor.line() {
            Some(line) if is_blank(line) => true,
            Some(line) if line.starts_with(indent) => {
                self.cursor.strip(indent.len());
                out.verbatim(indent);
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    /// A term line directly followed by a deeper definition.
    pub(super) fn definition_list(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let mut matched = false;
        while let Some(term) = self.cursor.text_line() {
            if term.starts_with(EXPLICIT_MARKUP) {
                break;
            }
            let mark = self.cursor.mark();
            self.cursor.advance();
            let deeper = self
                .cursor
                .text_line()
                .map(|_| self.cursor.indent())
                .filter(|i| *i > indent);
            let Some(inner) = deeper else {
                self.cursor.rewind(mark);
                break;
            };
            matched = true;
            self.emit(out, term, indent);
            self.cursor.strip_indent();
            out.verbatim(inner);
            self.body(out, inner, None)?;
            if !self.continues(out, indent) {
                break;
            }
        }
        Ok(matched)
    }

    pub(super) fn doctest(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        if !self.cursor.line().is_some_and(|l| l.starts_with(DOCTEST)) {
            return Ok(false);
        }
        out.verbatim(DOCTEST);
        self.cursor.strip(DOCTEST.len());
        self.literal_paragraph(out, indent);
        Ok(true)
    }

    pub(super) fn transition(
        &mut self,
        out: &mut Output,
        _indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let Some(line) = self.cursor.line().filter(|l| patterns::is_transition(l)) else {
            return Ok(false);
        };
        out.verbatim(line);
        self.cursor.advance();
        Ok(true)
    }

    /// `.. ` blocks: directive, footnote or citation, otherwise a comment.
    pub(super) fn explicit_markup(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let mut matched = false;
        while self.cursor.line().is_some_and(|l| l.starts_with(EXPLICIT_MARKUP)) {
            matched = true;
            if !self.directive(out, indent)? && !self.footnote(out, indent)? {
                out.verbatim(EXPLICIT_MARKUP);
                self.cursor.strip(EXPLICIT_MARKUP.len());
                let inner = format!("{indent}   ");
                let rest = self.cursor.current().unwrap_or("");
                if rest.trim_end().ends_with("::") {
                    self.emit_wrapped(out, rest, &inner, &inner);
                    self.cursor.advance();
                    self.literal_block(out, &inner)?;
                } else {
                    self.body(out, &inner, None)?;
                }
            }
            if !self.continues(out, indent) {
                break;
            }
        }
        Ok(matched)
    }

    /// `.. name:: argument`, argument continuation lines, then options and
    /// content one level deeper.
    fn directive(&mut self, out: &mut Output, indent: &str) -> Result<bool, FormatWarning> {
        let Some(marker) = self.cursor.line().and_then(patterns::directive_marker) else {
            return Ok(false);
        };
        log::trace!("{:?} at line {}", BlockKind::Directive, self.line_number());
        out.verbatim(marker);
        self.cursor.strip(marker.len());
        let argument_indent = format!("{indent}{}", spaces(marker.chars().count()));
        self.literal_paragraph(out, &argument_indent);

        let content = format!("{indent}   ");
        if self.cursor.text_line().is_some() && self.cursor.indent() >= content.as_str() {
            let inner = self.cursor.indent();
            out.verbatim(inner);
            self.cursor.strip_indent();
            if self.field_list(out, inner, "")? {
                if self.continues(out, inner) {
                    self.body(out, inner, None)?;
                }
            } else {
                self.body(out, inner, None)?;
            }
        }
        Ok(true)
    }

    fn footnote(&mut self, out: &mut Output, indent: &str) -> Result<bool, FormatWarning> {
        let Some(marker) = self.cursor.line().and_then(patterns::footnote_marker) else {
            return Ok(false);
        };
        log::trace!("{:?} at line {}", BlockKind::Footnote, self.line_number());
        out.verbatim(marker);
        self.cursor.strip(marker.len());
        let first = format!("{indent}{}", spaces(marker.chars().count()));
        if !self.cursor.current().is_some_and(is_blank) {
            self.body(out, &format!("{indent}   "), Some(&first))?;
        }
        Ok(true)
    }

    /// Lines that all start with the same quote character.
    pub(super) fn quoted_literal(
        &mut self,
        out: &mut Output,
        indent: &str,
        _first: &str,
    ) -> Result<bool, FormatWarning> {
        let Some((quote, _)) = self.cursor.line().and_then(patterns::quoted_marker) else {
            return Ok(false);
        };
        let mut text = String::new();
        while let Some(line) = self.cursor.line().filter(|l| l.as_bytes()[0] == quote) {
            text.push_str(line);
            self.cursor.advance();
            if self.cursor.line().is_none() || self.cursor.indent() != indent {
                break;
            }
            text.push_str(indent);
            self.cursor.strip_indent();
        }
        out.verbatim(text);
        Ok(true)
    }

    pub(super) fn paragraph(
        &mut self,
        out: &mut Output,
        indent: &str,
        first: &str,
    ) -> Result<bool, FormatWarning> {
        self.paragraph_with(out, indent, first, false)
    }

    /// Lines at `indent` joined into one run. A run ending in `::` opens a
    /// literal block on the deeper lines after the blank run.
    fn paragraph_with(
        &mut self,
        out: &mut Output,
        indent: &str,
        first: &str,
        verbatim: bool,
    ) -> Result<bool, FormatWarning> {
        let text = self.paragraph_lines(indent);
        if text.is_empty() {
            return Ok(false);
        }
        if verbatim {
            self.emit(out, &text, indent);
        } else {
            self.emit_wrapped(out, &text, indent, first);
        }
        if text.trim_end().ends_with("::") {
            let blanks = self.blank()?;
            if self.cursor.line().is_none() || self.cursor.indent() > indent {
                out.verbatim(blanks);
                let literal = format!("{indent} ");
                if self.continues(out, &literal) {
                    self.literal_block(out, &literal)?;
                }
            } else {
                self.unread_blanks();
            }
        }
        Ok(true)
    }

    fn paragraph_lines(&mut self, indent: &str) -> String {
        let mut text = String::new();
        while let Some(line) = self.cursor.text_line() {
            text.push_str(line);
            self.cursor.advance();
            if self.cursor.line().is_none() || self.cursor.indent() != indent {
                break;
            }
            self.cursor.strip_indent();
        }
        text
    }

    /// Non-blank lines at or deeper than `indent`, copied as is.
    fn literal_paragraph(&mut self, out: &mut Output, indent: &str) -> bool {
        let mut matched = false;
        while let Some(line) = self.cursor.text_line() {
            matched = true;
            out.verbatim(line);
            self.cursor.advance();
            if !self.continues(out, indent) {
                break;
            }
        }
        matched
    }

    /// Literal paragraphs and the blank runs between them, while lines stay
    /// at or deeper than `indent`.
    fn literal_block(&mut self, out: &mut Output, indent: &str) -> Result<(), FormatWarning> {
        log::trace!("{:?} at line {}", BlockKind::LiteralBlock, self.line_number());
        while self.cursor.line().is_some() {
            self.literal_paragraph(out, indent);
            if self.cursor.line().is_some_and(is_blank) {
                let blanks = self.blank()?;
                if self.cursor.line().is_none() || self.cursor.indent() >= indent {
                    out.verbatim(blanks);
                }
            }
            if !self.continues(out, indent) {
                break;
            }
        }
        Ok(())
    }
}
