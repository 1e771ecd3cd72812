use std::io;

/// Malformed markup found while parsing.
///
/// Recoverable: the parse call that raised it stops early and keeps whatever
/// it had already emitted. `line` is 1-indexed and relative to the whole
/// document being reflowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at line {line}")]
pub struct FormatWarning {
    pub message: String,
    pub line: usize,
}

impl FormatWarning {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Errors that end the command-line tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
