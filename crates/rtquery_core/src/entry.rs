//! Entries pair an announced prefix with its opaque attribute text.
use std::{
    fmt::{Display, Formatter},
    net::{Ipv4Addr, Ipv6Addr},
};

use crate::prefix::{family::AddressFamily, IpPrefix, Prefix};

/// One announced prefix of a single address family. The attributes are kept
/// exactly as they appeared in the dump.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entry<AF: AddressFamily> {
    pub prefix: Prefix<AF>,
    pub attributes: String,
}

impl<AF: AddressFamily> Entry<AF> {
    #[inline]
    pub fn new(prefix: Prefix<AF>, attributes: impl Into<String>) -> Self {
        Entry {
            prefix,
            attributes: attributes.into(),
        }
    }
}

/// An entry tagged with its address family, as produced by a dump loader.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Record {
    V4(Entry<Ipv4Addr>),
    V6(Entry<Ipv6Addr>),
}

impl Record {
    /// Classify by the prefix's family.
    pub fn new(prefix: IpPrefix, attributes: impl Into<String>) -> Self {
        match prefix {
            IpPrefix::V4(p) => Record::V4(Entry::new(p, attributes)),
            IpPrefix::V6(p) => Record::V6(Entry::new(p, attributes)),
        }
    }

    pub fn prefix(&self) -> IpPrefix {
        match self {
            Record::V4(e) => IpPrefix::V4(e.prefix),
            Record::V6(e) => IpPrefix::V6(e.prefix),
        }
    }

    pub fn attributes(&self) -> &str {
        match self {
            Record::V4(e) => &e.attributes,
            Record::V6(e) => &e.attributes,
        }
    }
}

/// Prints the record back in dump format: the prefix, a tab, then the
/// attribute text (continuation lines included).
impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.prefix(), self.attributes())
    }
}
