//! Reflow reStructuredText-like plain text to a column width.
//!
//! Prose is re-wrapped; titles, lists, field and option lists, tables,
//! directives and literal blocks keep their shape. [`Reflower`] can limit
//! the work to a line range, or to the comments and docstrings of Python
//! source.

pub mod config;
pub mod error;
pub mod parser;
pub mod scope;
pub mod wrap;

pub use config::{LineRange, Options};
pub use error::{Error, FormatWarning};
pub use parser::{Fragment, Parsed, Parser};
pub use scope::{Reflowed, Reflower};
pub use wrap::{Wrapper, DEFAULT_WIDTH};
