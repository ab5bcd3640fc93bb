//! This module provides the address, prefix and entry types shared by the loader, the trie and
//! the routing table.
pub mod entry;
pub mod error;
pub mod prefix;

pub use crate::{
    entry::{Entry, Record},
    error::ParseError,
    prefix::{family::AddressFamily, IpPrefix, Prefix},
};

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{
        entry::{Entry, Record},
        error::ParseError,
        prefix::{family::AddressFamily, IpPrefix, Prefix},
    };
}
