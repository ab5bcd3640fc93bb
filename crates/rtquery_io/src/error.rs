use std::path::PathBuf;

use rtquery_core::ParseError;
use thiserror::Error;

/// Errors that prevent a dump from loading. A failed load never yields a
/// partial table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read dump {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("dump line {line}: {source}")]
    Record { line: usize, source: ParseError },
}
