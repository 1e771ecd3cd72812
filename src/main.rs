// src/main.rs
//
// restwrap: reflow reStructuredText-like text read from stdin
//
// - Paragraphs, list item bodies, field values, definitions and comment bodies
//   are re-wrapped to WIDTH columns.
// - Titles, tables, line blocks, doctests, directive arguments and literal
//   blocks are copied as they are, re-indented where they are nested.
// - --lines L0 L1 limits the reflow to a 1-indexed inclusive line range; every
//   other line is copied byte for byte.
// - --python reflows only `#` comment runs and docstrings, so it can be used as
//   an editor filter on source code.
// - Malformed markup is reported on stderr (as a warning) and the affected run
//   keeps its remaining text untouched; the exit status stays 0.
//
// CLI:
//   restwrap [WIDTH] [--lines L0 L1] [--python]
// Default width: 72, or $RESTWRAP_WIDTH. Log level: warn, or $RUST_LOG.

use clap::{ArgAction, Parser};
use std::io::{self, Read, Write};

use restwrap::{Error, LineRange, Options, Reflower, DEFAULT_WIDTH};

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Target column width
    #[arg(env = "RESTWRAP_WIDTH", default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Reflow only lines L0 through L1 (1-indexed, inclusive)
    #[arg(long, num_args = 2, value_names = ["L0", "L1"])]
    lines: Option<Vec<usize>>,

    /// Reflow only comments and docstrings
    #[arg(long, visible_alias = "comments", action = ArgAction::SetTrue)]
    python: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            width: self.width,
            lines: match self.lines.as_deref() {
                Some(&[start, end]) => Some(LineRange::new(start, end)),
                _ => None,
            },
            comments_only: self.python,
        }
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let reflower = Reflower::new(cli.options());
    log::debug!("{:?}", reflower.options());

    let mut src = String::new();
    io::stdin().read_to_string(&mut src)?;

    let reflowed = reflower.reflow(&src);
    for warning in &reflowed.warnings {
        log::warn!("{warning}");
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(reflowed.text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
