//! Source-scope filter.
//!
//! Decides which lines of the input go through the [`Parser`]. Collected
//! lines are parsed as one document when the run ends; everything else is
//! copied byte for byte.
//!
//! In comment-only mode a small state machine follows the source from code
//! into docstrings and `#` comment runs. It sees every line, so a line range
//! that starts inside a docstring still knows where it is.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Options;
use crate::error::FormatWarning;
use crate::parser::cursor::split_lines;
use crate::parser::Parser;

static DOCSTRING_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\s*("""|''')"#).unwrap());
static DOUBLE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(.*)"""\s*$"#).unwrap());
static SINGLE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)'''\s*$").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*#)\s").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `"""`
    Double,
    /// `'''`
    Single,
}

impl Delimiter {
    fn from_marker(marker: &str) -> Self {
        if marker == "'''" {
            Delimiter::Single
        } else {
            Delimiter::Double
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Double => r#"""""#,
            Delimiter::Single => "'''",
        }
    }

    /// Text before the delimiter when `line` closes a docstring.
    fn closing(self, line: &str) -> Option<&str> {
        let re = match self {
            Delimiter::Double => &DOUBLE_CLOSE,
            Delimiter::Single => &SINGLE_CLOSE,
        };
        re.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str())
    }
}

/// Where the scanner is in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Code,
    Docstring { delimiter: Delimiter, indent: String },
    Comment { prefix: String },
}

fn comment_prefix(line: &str) -> Option<&str> {
    COMMENT
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn spaces(n: usize) -> String {
    " ".repeat(n)
}

/// Put `prefix` back on every line that starts with its space-normalized
/// form.
fn restore_prefix(out: &mut String, text: &str, prefix: &str) {
    let blank = spaces(prefix.chars().count());
    for piece in text.split_inclusive('\n') {
        match piece.strip_prefix(blank.as_str()) {
            Some(rest) => {
                out.push_str(prefix);
                out.push_str(rest);
            }
            None => out.push_str(piece),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reflowed {
    pub text: String,
    /// Warnings from every parsed run, with line numbers into the input.
    pub warnings: Vec<FormatWarning>,
}

#[derive(Debug, Clone)]
pub struct Reflower {
    options: Options,
    parser: Parser,
}

impl Reflower {
    pub fn new(options: Options) -> Self {
        Self {
            parser: Parser::new(options.width),
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn reflow(&self, input: &str) -> Reflowed {
        let mut scanner = Scanner {
            parser: &self.parser,
            options: &self.options,
            out: String::with_capacity(input.len() + input.len() / 8),
            warnings: Vec::new(),
            scope: Scope::Code,
            pending: None,
        };
        for (i, line) in split_lines(input).into_iter().enumerate() {
            scanner.feed(i + 1, line);
        }
        scanner.flush();
        Reflowed {
            text: scanner.out,
            warnings: scanner.warnings,
        }
    }
}

/// Lines collected for one parse.
struct Pending<'a> {
    start_line: usize,
    lines: Vec<Cow<'a, str>>,
    indent: String,
    first_indent: String,
    /// Comment prefix replaced by spaces in `lines`.
    prefix: Option<String>,
}

struct Scanner<'r, 'a> {
    parser: &'r Parser,
    options: &'r Options,
    out: String,
    warnings: Vec<FormatWarning>,
    scope: Scope,
    pending: Option<Pending<'a>>,
}

impl<'r, 'a> Scanner<'r, 'a> {
    fn feed(&mut self, number: usize, line: &'a str) {
        let in_range = self.options.in_range(number);
        if !self.options.comments_only {
            if in_range {
                self.collect(number, Cow::Borrowed(line), "", "", None);
            } else {
                self.copy(line);
            }
            return;
        }
        match std::mem::replace(&mut self.scope, Scope::Code) {
            Scope::Code => self.code(number, line, in_range),
            Scope::Docstring { delimiter, indent } => {
                self.docstring(number, line, in_range, delimiter, indent)
            }
            Scope::Comment { prefix } => self.comment(number, line, in_range, &prefix),
        }
    }

    fn code(&mut self, number: usize, line: &'a str, in_range: bool) {
        if let Some(open) = DOCSTRING_OPEN.find(line) {
            let (head, rest) = line.split_at(open.end());
            let (indent, marker) = head.split_at(head.len() - 3);
            let delimiter = Delimiter::from_marker(marker);
            log::debug!("{} docstring opens at line {number}", delimiter.as_str());
            self.out.push_str(head);
            if in_range {
                let first = spaces(head.chars().count());
                self.collect(number, Cow::Borrowed(rest), indent, &first, None);
            } else {
                self.out.push_str(rest);
            }
            if delimiter.closing(rest).is_some() {
                self.flush();
            } else {
                self.scope = Scope::Docstring {
                    delimiter,
                    indent: indent.to_string(),
                };
            }
        } else if let Some(prefix) = comment_prefix(line) {
            log::debug!("comment run opens at line {number}");
            self.scope = Scope::Comment {
                prefix: prefix.to_string(),
            };
            self.comment_line(number, line, prefix, in_range);
        } else {
            self.copy(line);
        }
    }

    fn docstring(
        &mut self,
        number: usize,
        line: &'a str,
        in_range: bool,
        delimiter: Delimiter,
        indent: String,
    ) {
        let Some(before) = delimiter.closing(line) else {
            if in_range {
                self.collect(number, Cow::Borrowed(line), &indent, &indent, None);
            } else {
                self.copy(line);
            }
            self.scope = Scope::Docstring { delimiter, indent };
            return;
        };
        log::debug!("docstring closes at line {number}");
        if in_range && !before.trim().is_empty() {
            self.collect(number, Cow::Borrowed(before), &indent, &indent, None);
            self.flush();
        } else {
            self.copy(before);
        }
        self.out.push_str(&line[before.len()..]);
    }

    fn comment(&mut self, number: usize, line: &'a str, in_range: bool, active: &str) {
        match comment_prefix(line) {
            Some(prefix) => {
                if prefix != active {
                    self.flush();
                }
                self.scope = Scope::Comment {
                    prefix: prefix.to_string(),
                };
                self.comment_line(number, line, prefix, in_range);
            }
            None => {
                log::debug!("comment run ends at line {number}");
                self.flush();
                self.code(number, line, in_range);
            }
        }
    }

    fn comment_line(&mut self, number: usize, line: &'a str, prefix: &str, in_range: bool) {
        if in_range {
            let normalized = format!("{}{}", spaces(prefix.chars().count()), &line[prefix.len()..]);
            self.collect(number, Cow::Owned(normalized), "", "", Some(prefix));
        } else {
            self.copy(line);
        }
    }

    fn collect(
        &mut self,
        number: usize,
        line: Cow<'a, str>,
        indent: &str,
        first_indent: &str,
        prefix: Option<&str>,
    ) {
        self.pending
            .get_or_insert_with(|| Pending {
                start_line: number,
                lines: Vec::new(),
                indent: indent.to_string(),
                first_indent: first_indent.to_string(),
                prefix: prefix.map(str::to_string),
            })
            .lines
            .push(line);
    }

    /// Copy a line the parser must not see, ending any open run first.
    fn copy(&mut self, text: &str) {
        self.flush();
        self.out.push_str(text);
    }

    fn flush(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let lines: Vec<&str> = pending.lines.iter().map(|l| l.as_ref()).collect();
        log::debug!("reflowing {} lines from line {}", lines.len(), pending.start_line);
        let parsed = self.parser.parse_from(
            &lines,
            &pending.indent,
            &pending.first_indent,
            pending.start_line,
        );
        let text = parsed.text();
        match &pending.prefix {
            Some(prefix) => restore_prefix(&mut self.out, &text, prefix),
            None => self.out.push_str(&text),
        }
        if let Some(warning) = parsed.warning {
            self.warnings.push(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineRange;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn reflow(input: &str, options: Options) -> Reflowed {
        Reflower::new(options).reflow(input)
    }

    fn comments(width: usize) -> Options {
        Options {
            width,
            comments_only: true,
            ..Options::default()
        }
    }

    #[test]
    fn whole_document_is_parsed_by_default() {
        let out = reflow("aaa\nbbb\n", Options::default());
        assert_eq!(out.text, "aaa bbb\n");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn lines_outside_range_are_untouched() {
        let long = "untouched line that is much longer than twenty\n";
        let input = format!(
            "{long}{long}alpha beta\ngamma delta\nepsilon zeta eta theta\n{}",
            long.repeat(5)
        );
        let options = Options {
            width: 20,
            lines: Some(LineRange::new(3, 5)),
            ..Options::default()
        };
        let expected = format!(
            "{long}{long}alpha beta gamma\ndelta epsilon zeta\neta theta\n{}",
            long.repeat(5)
        );
        assert_eq!(reflow(&input, options).text, expected);
    }

    #[test]
    fn comment_run_is_wrapped_under_its_prefix() {
        let input = "def f():\n    # This comment is long enough that it\n    # must wrap at width thirty.\n    return 1\n";
        let expected = "def f():\n    # This comment is long\n    # enough that it must\n    # wrap at width thirty.\n    return 1\n";
        assert_eq!(reflow(input, comments(30)).text, expected);
    }

    #[test]
    fn docstring_is_wrapped_at_its_indent() {
        let input = "def f():\n    \"\"\"Summary line that is rather long for the width.\n\n    Details here.\n    \"\"\"\n    return 1\n";
        let expected = "def f():\n    \"\"\"Summary line that is\n    rather long for the\n    width.\n\n    Details here.\n    \"\"\"\n    return 1\n";
        assert_eq!(reflow(input, comments(30)).text, expected);
    }

    #[rstest]
    #[case::one_line_docstring("    \"\"\"Short.\"\"\"\n")]
    #[case::single_quotes("'''Short.'''\n")]
    #[case::trailing_comment("x = 1  # trailing comment that is very long and would wrap\n")]
    #[case::shebang("#!/usr/bin/env python with a long interpreter line\n")]
    #[case::code("result = compute(alpha, beta, gamma, delta, epsilon, zeta)\n")]
    fn code_and_short_docstrings_are_kept(#[case] input: &str) {
        assert_eq!(reflow(input, comments(30)).text, input);
    }

    #[test]
    fn prefix_change_starts_a_new_run() {
        let out = reflow("# one\n# two\n  # three\n", comments(72));
        assert_eq!(out.text, "# one two\n  # three\n");
    }

    #[test]
    fn docstring_right_after_comment_is_seen() {
        let input = "# a\n# b\n\"\"\"c\nd\n\"\"\"\n";
        let out = reflow(input, comments(72));
        assert_eq!(out.text, "# a b\n\"\"\"c d\n\"\"\"\n");
    }

    #[test]
    fn range_inside_docstring_is_still_a_docstring() {
        let options = Options {
            lines: Some(LineRange::new(2, 3)),
            ..comments(72)
        };
        let out = reflow("\"\"\"\nalpha beta\ngamma\n\"\"\"\n", options);
        assert_eq!(out.text, "\"\"\"\nalpha beta gamma\n\"\"\"\n");
    }

    #[test]
    fn warnings_point_into_the_input() {
        let options = Options {
            lines: Some(LineRange::new(3, 4)),
            ..Options::default()
        };
        let input = "a\nb\n+---+\n| a |\n";
        let out = reflow(input, options);
        assert_eq!(out.text, input);
        assert_eq!(out.warnings, vec![FormatWarning::new("Row separator expected", 3)]);
    }

    #[test]
    fn restored_prefix_skips_foreign_lines() {
        let mut out = String::new();
        restore_prefix(&mut out, "  a\n\n  b", "#");
        assert_eq!(out, "# a\n\n# b");
    }
}
