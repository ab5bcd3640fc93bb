//! Routing-table dump query engine.
//!
//! Loads a textual routing table dump into one Patricia tree per address
//! family and answers exact-prefix and covering-prefix queries:
//!
//! ```no_run
//! use rtquery::prelude::*;
//!
//! let engine = QueryEngine::open("query.dump")?;
//! println!("{}", engine.find_all("192.168.42.42")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub use rtquery_core;
pub use rtquery_io;
pub use rtquery_table;
pub use rtquery_trie;

pub use rtquery_table::{EngineState, QueryEngine, QueryError, RouteLookup, RoutingTable};

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use rtquery_core::prelude::*;
    #[doc(hidden)]
    pub use rtquery_io::prelude::*;
    #[doc(hidden)]
    pub use rtquery_table::prelude::*;
    #[doc(hidden)]
    pub use rtquery_trie::prelude::*;
}
