//! This module provides the routing table built from a dump and the query engine handing out
//! exact and covering-prefix answers.
mod engine;
mod error;
mod table;

use std::fmt::{Display, Formatter};

use rtquery_core::{IpPrefix, ParseError};

pub use rtquery_io::{LoadError, LoaderConfig};
pub use {
    engine::{EngineState, QueryEngine},
    error::QueryError,
    table::RoutingTable,
};

/// A stored route as seen by a query: the announced prefix and its attribute
/// text, borrowed from the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route<'a> {
    pub prefix: IpPrefix,
    pub attributes: &'a str,
}

impl<'a> Route<'a> {
    #[inline]
    pub fn new(prefix: IpPrefix, attributes: &'a str) -> Self {
        Route { prefix, attributes }
    }
}

impl Display for Route<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.prefix, self.attributes)
    }
}

// RouteLookup answers the two query kinds of a routing table.
pub trait RouteLookup {
    // Required methods

    /// The route stored at exactly `prefix`.
    fn lookup_exact(&self, prefix: &IpPrefix) -> Option<Route<'_>>;

    /// Every stored route whose prefix contains `prefix`, least specific
    /// first. A host prefix makes this an address lookup.
    fn lookup_covering(&self, prefix: &IpPrefix) -> Vec<Route<'_>>;

    // Provided methods

    /// Exact lookup of a textual prefix. A bare address is looked up as its
    /// host prefix. Returns the attribute text exactly as loaded.
    fn find(&self, text: &str) -> Result<Option<String>, ParseError> {
        let prefix = text.parse::<IpPrefix>()?;
        Ok(self.lookup_exact(&prefix).map(|r| r.attributes.to_owned()))
    }

    /// Covering lookup of a textual address or prefix. Every match is
    /// printed the way the dump lists it, `prefix<TAB>attributes`, and the
    /// matches are joined with `\n`. An empty string means no route.
    fn find_all(&self, text: &str) -> Result<String, ParseError> {
        let prefix = text.parse::<IpPrefix>()?;
        Ok(self
            .lookup_covering(&prefix)
            .iter()
            .map(Route::to_string)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Longest-prefix match of a textual address or prefix, printed as
    /// `prefix<TAB>attributes`.
    fn find_longest(&self, text: &str) -> Result<Option<String>, ParseError> {
        let prefix = text.parse::<IpPrefix>()?;
        Ok(self.lookup_covering(&prefix).last().map(Route::to_string))
    }
}

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{
        EngineState, LoadError, LoaderConfig, QueryEngine, QueryError, Route, RouteLookup,
        RoutingTable,
    };
}
