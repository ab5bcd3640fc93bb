use std::{
    fmt::{Display, Formatter},
    path::Path,
};

use log::{error, info};
use rtquery_io::{LoadError, LoaderConfig};

use crate::{QueryError, RouteLookup, RoutingTable};

/// Lifecycle of a [QueryEngine].
///
/// ```text
/// init --ok--> Ready --dispose--> Disposed
///   \                               ^
///    `--err--> Failed --dispose-----'
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    Ready,
    Failed,
    Disposed,
}

impl Display for EngineState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Ready => "ready",
            EngineState::Failed => "failed",
            EngineState::Disposed => "disposed",
        };
        write!(f, "{}", s)
    }
}

enum Inner {
    Ready(RoutingTable),
    Failed(LoadError),
    Disposed,
}

/// Query Engine
///
/// The long-lived handle over a loaded [RoutingTable]. Every operation
/// reports its own outcome as a `Result`, there is no error slot shared
/// between calls, so one engine can serve queries from many threads at once
/// through `&self`. [QueryEngine::dispose] takes `&mut self` and therefore
/// only runs once every in-flight query has returned.
pub struct QueryEngine {
    inner: Inner,
}

impl QueryEngine {
    /// Load the dump at `path`. Never fails by itself: a load error leaves
    /// the engine in [EngineState::Failed], see [QueryEngine::load_error].
    pub fn init<P: AsRef<Path>>(path: P) -> Self {
        Self::init_with(path, &LoaderConfig::default())
    }

    pub fn init_with<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Self {
        let inner = match RoutingTable::load(path, config) {
            Ok(table) => Inner::Ready(table),
            Err(e) => {
                error!("{}", e);
                Inner::Failed(e)
            }
        };
        QueryEngine { inner }
    }

    /// Load the dump at `path` into a ready engine.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        Self::open_with(path, &LoaderConfig::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Self, LoadError> {
        RoutingTable::load(path, config).map(Self::from_table)
    }

    #[inline]
    pub fn from_table(table: RoutingTable) -> Self {
        QueryEngine {
            inner: Inner::Ready(table),
        }
    }

    pub fn state(&self) -> EngineState {
        match self.inner {
            Inner::Ready(_) => EngineState::Ready,
            Inner::Failed(_) => EngineState::Failed,
            Inner::Disposed => EngineState::Disposed,
        }
    }

    /// Why the engine failed to load, if it did.
    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.inner {
            Inner::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// The loaded table, only available while [EngineState::Ready].
    ///
    /// Asking a failed or disposed engine is a caller bug: debug builds
    /// panic, release builds log it and return [QueryError::InvalidState].
    pub fn table(&self) -> Result<&RoutingTable, QueryError> {
        match &self.inner {
            Inner::Ready(table) => Ok(table),
            _ => {
                let state = self.state();
                error!("query on a {} engine", state);
                if cfg!(debug_assertions) {
                    panic!("query on a {} engine", state);
                }
                Err(QueryError::InvalidState(state))
            }
        }
    }

    /// Exact-prefix lookup, `Ok(None)` when the prefix is not in the table.
    pub fn find(&self, prefix: &str) -> Result<Option<String>, QueryError> {
        Ok(self.table()?.find(prefix)?)
    }

    /// Covering-prefix lookup, least specific first, joined with `\n`. An
    /// empty string means no route covers the query.
    pub fn find_all(&self, query: &str) -> Result<String, QueryError> {
        Ok(self.table()?.find_all(query)?)
    }

    /// Longest-prefix match, `Ok(None)` when no route covers the query.
    pub fn find_longest(&self, query: &str) -> Result<Option<String>, QueryError> {
        Ok(self.table()?.find_longest(query)?)
    }

    /// Release the table. Calling it again is a no-op.
    pub fn dispose(&mut self) {
        if !matches!(self.inner, Inner::Disposed) {
            info!("disposing {} query engine", self.state());
            self.inner = Inner::Disposed;
        }
    }
}
