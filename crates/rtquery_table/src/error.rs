use rtquery_core::ParseError;
use thiserror::Error;

use crate::EngineState;

/// Failure of a single query. The engine stays usable after a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("query on a {0} engine")]
    InvalidState(EngineState),
}
