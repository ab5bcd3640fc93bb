use std::{
    fmt::{Display, Formatter},
    net::{Ipv4Addr, Ipv6Addr},
    path::Path,
};

use log::{debug, info};
use rtquery_core::{IpPrefix, Record};
use rtquery_io::{DefaultDumpLoader, DumpLoader, LoadError, LoaderConfig};
use rtquery_trie::PrefixTrie;

use crate::{Route, RouteLookup};

/// Routing Table
///
/// Keeps one [PrefixTrie] per address family, built once from the records of
/// a dump and never mutated afterwards. Shared references can be handed to
/// any number of reader threads.
///
/// Duplicate prefixes follow the "last write wins" policy: only the most
/// recent record for a prefix is kept, as the latest announcement is the
/// authoritative one.
#[derive(Default)]
pub struct RoutingTable {
    v4: PrefixTrie<Ipv4Addr, String>,
    v6: PrefixTrie<Ipv6Addr, String>,
}

impl RoutingTable {
    /// Build a table from already-parsed records.
    pub fn build(records: impl IntoIterator<Item = Record>) -> Self {
        let mut table = RoutingTable::default();
        for record in records {
            table.insert(record);
        }
        table
    }

    /// Read and parse the dump at `path`, then build the table. Nothing is
    /// returned unless the whole dump loaded.
    pub fn load<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let records = DefaultDumpLoader::new(*config).load_file(path)?;
        let table = Self::build(records);
        info!(
            "loaded {} IPv4 and {} IPv6 prefixes from {}",
            table.len_v4(),
            table.len_v6(),
            path.display()
        );
        Ok(table)
    }

    fn insert(&mut self, record: Record) {
        let (prefix, replaced) = match record {
            Record::V4(e) => (IpPrefix::V4(e.prefix), self.v4.insert(e.prefix, e.attributes)),
            Record::V6(e) => (IpPrefix::V6(e.prefix), self.v6.insert(e.prefix, e.attributes)),
        };
        if replaced.is_some() {
            debug!("duplicate record for {}, keeping the latest one", prefix);
        }
    }

    #[inline]
    pub fn len_v4(&self) -> usize {
        self.v4.len()
    }

    #[inline]
    pub fn len_v6(&self) -> usize {
        self.v6.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All routes, IPv4 before IPv6, each family in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = Route<'_>> {
        let v4 = self.v4.iter().map(|(p, a)| Route::new(p.into(), a));
        let v6 = self.v6.iter().map(|(p, a)| Route::new(p.into(), a));
        v4.chain(v6)
    }
}

impl RouteLookup for RoutingTable {
    fn lookup_exact(&self, prefix: &IpPrefix) -> Option<Route<'_>> {
        match prefix {
            IpPrefix::V4(p) => self.v4.lookup_exact(p).map(|a| Route::new(*prefix, a)),
            IpPrefix::V6(p) => self.v6.lookup_exact(p).map(|a| Route::new(*prefix, a)),
        }
    }

    fn lookup_covering(&self, prefix: &IpPrefix) -> Vec<Route<'_>> {
        match prefix {
            IpPrefix::V4(p) => self
                .v4
                .covering(p)
                .map(|(p, a)| Route::new(p.into(), a))
                .collect(),
            IpPrefix::V6(p) => self
                .v6
                .covering(p)
                .map(|(p, a)| Route::new(p.into(), a))
                .collect(),
        }
    }
}

impl FromIterator<Record> for RoutingTable {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::build(iter)
    }
}

/// Prints the table back in dump format.
impl Display for RoutingTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for route in self.iter() {
            writeln!(f, "{}", route)?;
        }
        Ok(())
    }
}
