//! This module provides the Patricia tree used by the routing table to store one entry per
//! announced prefix and to answer exact and covering-prefix queries.
mod patricia;

pub use crate::patricia::{Covering, Iter, PrefixTrie};

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::patricia::PrefixTrie;
}
