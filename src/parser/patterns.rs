// Structural patterns shared by every parse.
//
// Markers with nested alternatives live in compiled regexes; the rest are
// byte scanners. Scanners that need a repeated character stand in for a
// backreference, which `regex` does not support.

use once_cell::sync::Lazy;
use regex::Regex;

/// `-a`, `--all`, `/V`, `<file>`, optional argument tokens, then two spaces
/// or end of line.
static OPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((--|-|/)[a-zA-Z][a-zA-Z0-9_=-]*|<[^>]+>)(\s[^\s]+)*(  |$)").unwrap()
});

/// Bullet or enumerator followed by a space.
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    let seq = r"([0-9]+|[a-z]|[A-Z]|[ivxlc]+|[IVXLC]+|#)";
    Regex::new(&format!(r"^({seq}\.|{seq}\)|\({seq}\)|-|\+|\*) ")).unwrap()
});

/// `.. name:: argument`; group 1 runs up to the argument.
static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\.\. .+::[ \t]*)[^\s]").unwrap());

static FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.\. \[[^\]]+\] ").unwrap());

pub const EXPLICIT_MARKUP: &str = ".. ";
pub const DOCTEST: &str = ">>>";

#[inline]
fn without_newline(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

/// Option flags at the start of `line`, including the separating spaces.
pub fn option_marker(line: &str) -> Option<&str> {
    OPTION
        .find(without_newline(line))
        .map(|m| &line[..m.end()])
}

pub fn list_marker(line: &str) -> Option<&str> {
    LIST_MARKER.find(line).map(|m| m.as_str())
}

/// Directive marker up to its argument.
pub fn directive_marker(line: &str) -> Option<&str> {
    DIRECTIVE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn footnote_marker(line: &str) -> Option<&str> {
    FOOTNOTE.find(line).map(|m| m.as_str())
}

/// Field name such as `:Author:` when followed by whitespace. A colon
/// preceded by a backslash does not close the name.
pub fn field_name(line: &str) -> Option<&str> {
    let second = line.strip_prefix(':')?.chars().next()?;
    let mut end = 1 + second.len_utf8();
    for ch in line[end..].chars() {
        let name = &line[..end];
        if name.ends_with(':') && !name[..name.len() - 1].ends_with('\\') {
            return (ch.is_whitespace() && name.chars().count() > 2).then_some(name);
        }
        end += ch.len_utf8();
    }
    None
}

/// `|` followed by a space or the end of the line; returns the marker length
/// including the whitespace after it.
pub fn line_block_marker(line: &str) -> Option<usize> {
    let rest = line.strip_prefix('|')?;
    if rest.is_empty() || rest == "\n" {
        return Some(1);
    }
    if !rest.starts_with(' ') {
        return None;
    }
    let ws = rest.chars().take_while(|c| c.is_whitespace()).map(char::len_utf8).sum::<usize>();
    Some(1 + ws)
}

/// `+` followed by a run of `-` or `=`.
pub fn is_grid_rule(line: &str) -> bool {
    // ^\+(-|=)+
    let bytes = line.as_bytes();
    bytes.len() >= 2 && bytes[0] == b'+' && (bytes[1] == b'-' || bytes[1] == b'=')
}

pub fn is_grid_row(line: &str) -> bool {
    line.starts_with('|')
}

pub fn is_table_rule(line: &str) -> bool {
    // ^={2,}
    line.starts_with("==")
}

/// A lone line of four or more `-`.
pub fn is_transition(line: &str) -> bool {
    let body = without_newline(line);
    body.len() >= 4 && body.bytes().all(|b| b == b'-')
}

/// Title over- or under-line: four or more of one punctuation character.
pub fn title_rule(line: &str) -> Option<&str> {
    let body = without_newline(line);
    let first = *body.as_bytes().first()?;
    if !first.is_ascii_punctuation() || body.len() < 4 {
        return None;
    }
    body.bytes().all(|b| b == first).then_some(body)
}

/// Quote character and marker length (the run plus one space) of a quoted
/// literal line. A `::` run is reserved for literal block markers.
pub fn quoted_marker(line: &str) -> Option<(u8, usize)> {
    let bytes = line.as_bytes();
    let quote = *bytes.first()?;
    if !quote.is_ascii_punctuation() {
        return None;
    }
    let run = bytes.iter().take_while(|&&b| b == quote).count();
    if bytes.get(run) != Some(&b' ') || (quote == b':' && run == 2) {
        return None;
    }
    Some((quote, run + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("-a  all files\n", Some("-a  "))]
    #[case("--output=FILE  where\n", Some("--output=FILE  "))]
    #[case("-f FILE  read\n", Some("-f FILE  "))]
    #[case("/V  verbose\n", Some("/V  "))]
    #[case("<path>  target\n", Some("<path>  "))]
    #[case("-v\n", Some("-v"))]
    #[case("-9  digit\n", None)]
    #[case("plain text\n", None)]
    fn option_markers(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(option_marker(line), expected);
    }

    #[rstest]
    #[case("- item\n", Some("- "))]
    #[case("* item\n", Some("* "))]
    #[case("12. item\n", Some("12. "))]
    #[case("b) item\n", Some("b) "))]
    #[case("(iv) item\n", Some("(iv) "))]
    #[case("#. item\n", Some("#. "))]
    #[case("-item\n", None)]
    #[case("word. item\n", None)]
    fn list_markers(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(list_marker(line), expected);
    }

    #[rstest]
    #[case(":Author: Jane\n", Some(":Author:"))]
    #[case(":a\\:b: value\n", Some(":a\\:b:"))]
    #[case(":date:\n", Some(":date:"))]
    #[case("::\n", None)]
    #[case(":: x\n", None)]
    #[case(":nospace:x\n", None)]
    #[case(":open\n", None)]
    fn field_names(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(field_name(line), expected);
    }

    #[test]
    fn directive_marker_stops_before_argument() {
        assert_eq!(directive_marker(".. image:: logo.png\n"), Some(".. image:: "));
        assert_eq!(directive_marker(".. note::\n"), None);
    }

    #[test]
    fn footnote_marker_includes_space() {
        assert_eq!(footnote_marker(".. [1] Note.\n"), Some(".. [1] "));
        assert_eq!(footnote_marker(".. [#] x\n"), Some(".. [#] "));
        assert_eq!(footnote_marker(".. comment\n"), None);
    }

    #[rstest]
    #[case("| line\n", Some(2))]
    #[case("|\n", Some(1))]
    #[case("|   x\n", Some(4))]
    #[case("|x\n", None)]
    fn line_block_markers(#[case] line: &str, #[case] expected: Option<usize>) {
        assert_eq!(line_block_marker(line), expected);
    }

    #[test]
    fn rules() {
        assert!(is_grid_rule("+---+---+\n"));
        assert!(is_grid_rule("+===+\n"));
        assert!(!is_grid_rule("+ plus\n"));
        assert!(is_table_rule("=====  ====\n"));
        assert!(!is_table_rule("= x\n"));
        assert!(is_transition("--------\n"));
        assert!(!is_transition("---\n"));
        assert!(!is_transition("---- x\n"));
    }

    #[test]
    fn title_rules() {
        assert_eq!(title_rule("=====\n"), Some("====="));
        assert_eq!(title_rule("~~~~"), Some("~~~~"));
        assert_eq!(title_rule("===\n"), None);
        assert_eq!(title_rule("==-=\n"), None);
        assert_eq!(title_rule("aaaa\n"), None);
    }

    #[test]
    fn quoted_markers() {
        assert_eq!(quoted_marker("> quoted\n"), Some((b'>', 2)));
        assert_eq!(quoted_marker(">> nested\n"), Some((b'>', 3)));
        assert_eq!(quoted_marker(":: x\n"), None);
        assert_eq!(quoted_marker(">x\n"), None);
    }
}
