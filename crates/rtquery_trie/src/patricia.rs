use std::{
    fmt::{Debug, Formatter},
    iter::FusedIterator,
};

use log::trace;
use rtquery_core::prefix::{family::AddressFamily, Prefix};

struct TreeNode<AF: AddressFamily, V> {
    prefix: Prefix<AF>,
    value: Option<V>,
    lch: Option<TreeNodeRef<AF, V>>,
    rch: Option<TreeNodeRef<AF, V>>,
}

type TreeNodeRef<AF, V> = Box<TreeNode<AF, V>>;

impl<AF: AddressFamily, V> TreeNode<AF, V> {
    #[inline]
    fn new(prefix: Prefix<AF>, value: Option<V>) -> TreeNodeRef<AF, V> {
        Box::new(TreeNode {
            prefix,
            value,
            lch: None,
            rch: None,
        })
    }

    #[inline]
    fn child(&self, bit: bool) -> Option<&TreeNode<AF, V>> {
        if bit {
            self.rch.as_deref()
        } else {
            self.lch.as_deref()
        }
    }

    #[inline]
    fn child_mut(&mut self, bit: bool) -> &mut Option<TreeNodeRef<AF, V>> {
        if bit {
            &mut self.rch
        } else {
            &mut self.lch
        }
    }

    fn count(&self) -> usize {
        1 + self.lch.as_ref().map_or(0, |n| n.count()) + self.rch.as_ref().map_or(0, |n| n.count())
    }

    fn recursive_dump(&self, f: &mut Formatter<'_>, depth: usize) -> std::fmt::Result
    where
        V: Debug,
    {
        let value_str = match &self.value {
            Some(v) => format!(" -- Value: {:?}", v),
            None => String::from(" -- Value: None"),
        };
        writeln!(f, "{}{}{}", "-".repeat(depth), self.prefix, value_str)?;
        if let Some(lch) = &self.lch {
            lch.recursive_dump(f, depth + 1)?;
        }
        if let Some(rch) = &self.rch {
            rch.recursive_dump(f, depth + 1)?;
        }
        Ok(())
    }
}

/// A path-compressed binary trie (Patricia tree) keyed by prefix bits.
///
/// Every node stores the prefix it represents. A node carries a value only
/// if that exact prefix was inserted; value-less nodes exist only where two
/// branches diverge. Children are owned exclusively by their parent, the
/// left child continues with bit 0 and the right child with bit 1.
///
/// All lookups descend at most `AF::BITS` levels.
pub struct PrefixTrie<AF: AddressFamily, V> {
    root: Option<TreeNodeRef<AF, V>>,
    len: usize,
}

impl<AF: AddressFamily, V> Default for PrefixTrie<AF, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<AF: AddressFamily, V> PrefixTrie<AF, V> {
    #[inline]
    pub fn new() -> Self {
        PrefixTrie { root: None, len: 0 }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated nodes, branching nodes included.
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.count())
    }

    fn insert_rec(
        node_ref: Option<TreeNodeRef<AF, V>>,
        prefix: Prefix<AF>,
        value: V,
        replaced: &mut Option<V>,
    ) -> TreeNodeRef<AF, V> {
        let mut node = match node_ref {
            // empty subtree, the new prefix becomes a leaf
            None => return TreeNode::new(prefix, Some(value)),
            Some(node) => node,
        };
        let common = node.prefix.common_len(&prefix);
        if common == node.prefix.len() {
            if common == prefix.len() {
                *replaced = node.value.replace(value);
            } else {
                // the node prefixes the new one, go one level down
                let bit = prefix.bit(common);
                let child = node.child_mut(bit).take();
                *node.child_mut(bit) = Some(Self::insert_rec(child, prefix, value, replaced));
            }
            return node;
        }
        // or we need to split the edge above the node
        let node_bit = node.prefix.bit(common);
        if common == prefix.len() {
            trace!("{} is inserted above {}", prefix, node.prefix);
            let mut parent = TreeNode::new(prefix, Some(value));
            *parent.child_mut(node_bit) = Some(node);
            parent
        } else {
            let branch = prefix.truncate(common);
            trace!("{} and {} branch at {}", prefix, node.prefix, branch);
            let mut parent = TreeNode::new(branch, None);
            *parent.child_mut(node_bit) = Some(node);
            *parent.child_mut(!node_bit) = Some(TreeNode::new(prefix, Some(value)));
            parent
        }
    }

    /// Store `value` at `prefix`. A value already stored at the same prefix
    /// is replaced and returned.
    pub fn insert(&mut self, prefix: Prefix<AF>, value: V) -> Option<V> {
        let mut replaced = None;
        self.root = Some(Self::insert_rec(
            self.root.take(),
            prefix,
            value,
            &mut replaced,
        ));
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }

    /// The value stored at exactly `prefix`, if any.
    pub fn lookup_exact(&self, prefix: &Prefix<AF>) -> Option<&V> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            if !node.prefix.contains(prefix) {
                return None;
            }
            if node.prefix.len() == prefix.len() {
                return node.value.as_ref();
            }
            cursor = node.child(prefix.bit(node.prefix.len()));
        }
        None
    }

    /// Iterate over the stored prefixes that contain `prefix`, from the least
    /// specific to the most specific. A stored entry equal to `prefix` is the
    /// last item.
    #[inline]
    pub fn covering(&self, prefix: &Prefix<AF>) -> Covering<'_, AF, V> {
        Covering {
            cursor: self.root.as_deref(),
            target: *prefix,
        }
    }

    /// Collect [Self::covering] into a vector.
    pub fn lookup_covering(&self, prefix: &Prefix<AF>) -> Vec<(Prefix<AF>, &V)> {
        self.covering(prefix).collect()
    }

    /// The most specific stored prefix that contains `prefix`.
    #[inline]
    pub fn longest_match(&self, prefix: &Prefix<AF>) -> Option<(Prefix<AF>, &V)> {
        self.covering(prefix).last()
    }

    /// Iterate over all stored values, every prefix before its
    /// more-specifics and the 0-branch before the 1-branch.
    pub fn iter(&self) -> Iter<'_, AF, V> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
            remaining: self.len,
        }
    }
}

impl<AF: AddressFamily, V> Extend<(Prefix<AF>, V)> for PrefixTrie<AF, V> {
    fn extend<T: IntoIterator<Item = (Prefix<AF>, V)>>(&mut self, iter: T) {
        for (prefix, value) in iter {
            self.insert(prefix, value);
        }
    }
}

impl<AF: AddressFamily, V> FromIterator<(Prefix<AF>, V)> for PrefixTrie<AF, V> {
    fn from_iter<T: IntoIterator<Item = (Prefix<AF>, V)>>(iter: T) -> Self {
        let mut trie = PrefixTrie::new();
        trie.extend(iter);
        trie
    }
}

/// Prints the node structure, one node per line, indented by tree depth.
impl<AF: AddressFamily, V: Debug> Debug for PrefixTrie<AF, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            Some(node) => node.recursive_dump(f, 0),
            None => writeln!(f, "<empty>"),
        }
    }
}

/// Iterator returned by [PrefixTrie::covering].
pub struct Covering<'a, AF: AddressFamily, V> {
    cursor: Option<&'a TreeNode<AF, V>>,
    target: Prefix<AF>,
}

impl<'a, AF: AddressFamily, V> Iterator for Covering<'a, AF, V> {
    type Item = (Prefix<AF>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.cursor.take()?;
            if !node.prefix.contains(&self.target) {
                return None;
            }
            if node.prefix.len() < self.target.len() {
                self.cursor = node.child(self.target.bit(node.prefix.len()));
            }
            if let Some(value) = &node.value {
                return Some((node.prefix, value));
            }
        }
    }
}

impl<AF: AddressFamily, V> FusedIterator for Covering<'_, AF, V> {}

/// Iterator returned by [PrefixTrie::iter].
pub struct Iter<'a, AF: AddressFamily, V> {
    stack: Vec<&'a TreeNode<AF, V>>,
    remaining: usize,
}

impl<'a, AF: AddressFamily, V> Iterator for Iter<'a, AF, V> {
    type Item = (Prefix<AF>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let Some(rch) = &node.rch {
                self.stack.push(rch);
            }
            if let Some(lch) = &node.lch {
                self.stack.push(lch);
            }
            if let Some(value) = &node.value {
                self.remaining -= 1;
                return Some((node.prefix, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<AF: AddressFamily, V> ExactSizeIterator for Iter<'_, AF, V> {}

impl<'a, AF: AddressFamily, V> IntoIterator for &'a PrefixTrie<AF, V> {
    type Item = (Prefix<AF>, &'a V);
    type IntoIter = Iter<'a, AF, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use rtquery_core::prefix::IpPrefix;

    use super::*;

    fn v4(s: &str) -> Prefix<Ipv4Addr> {
        match s.parse::<IpPrefix>().unwrap() {
            IpPrefix::V4(p) => p,
            _ => unreachable!(),
        }
    }

    fn v6(s: &str) -> Prefix<Ipv6Addr> {
        match s.parse::<IpPrefix>().unwrap() {
            IpPrefix::V6(p) => p,
            _ => unreachable!(),
        }
    }

    fn sample() -> PrefixTrie<Ipv4Addr, &'static str> {
        let mut trie = PrefixTrie::new();
        trie.insert(v4("10.0.0.0/8"), "ten");
        trie.insert(v4("10.1.0.0/16"), "ten-one");
        trie.insert(v4("10.1.2.0/24"), "ten-one-two");
        trie.insert(v4("10.2.0.0/16"), "ten-two");
        trie.insert(v4("192.168.0.0/16"), "private");
        trie
    }

    #[test]
    fn test_trie_insert_lookup_exact() {
        let trie = sample();
        assert_eq!(trie.len(), 5);
        assert_eq!(trie.lookup_exact(&v4("10.1.0.0/16")), Some(&"ten-one"));
        assert_eq!(trie.lookup_exact(&v4("10.0.0.0/8")), Some(&"ten"));
        // a branching node that was never inserted
        assert_eq!(trie.lookup_exact(&v4("10.0.0.0/14")), None);
        // never inserted, no partial-depth match
        assert_eq!(trie.lookup_exact(&v4("10.1.0.0/24")), None);
        assert_eq!(trie.lookup_exact(&v4("10.0.0.0/7")), None);
        assert_eq!(trie.lookup_exact(&v4("172.16.0.0/12")), None);
    }

    #[test]
    fn test_trie_covering_order() {
        let trie = sample();
        let found: Vec<_> = trie
            .lookup_covering(&v4("10.1.2.3"))
            .into_iter()
            .map(|(p, v)| (p.to_string(), *v))
            .collect();
        assert_eq!(
            found,
            vec![
                ("10.0.0.0/8".to_string(), "ten"),
                ("10.1.0.0/16".to_string(), "ten-one"),
                ("10.1.2.0/24".to_string(), "ten-one-two"),
            ]
        );
        assert_eq!(
            trie.longest_match(&v4("10.1.9.9")).map(|(_, v)| *v),
            Some("ten-one")
        );
        assert!(trie.lookup_covering(&v4("11.0.0.1")).is_empty());
    }

    #[test]
    fn test_trie_covering_with_prefix_query() {
        let trie = sample();
        // the entry exactly at the queried depth is the most specific answer
        let found = trie.lookup_covering(&v4("10.1.0.0/16"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].0, v4("10.1.0.0/16"));
        // a query shorter than every stored descendant only sees its ancestors
        let found = trie.lookup_covering(&v4("10.0.0.0/12"));
        assert_eq!(found.len(), 1);
        assert_eq!(*found[0].1, "ten");
    }

    #[test]
    fn test_trie_default_route_and_host() {
        let mut trie = sample();
        trie.insert(Prefix::default_route(), "default");
        trie.insert(v4("8.8.8.8/32"), "host");
        assert_eq!(trie.lookup_covering(&v4("1.1.1.1")).len(), 1);
        let found = trie.lookup_covering(&v4("8.8.8.8"));
        assert_eq!(found.iter().map(|(_, v)| **v).collect::<Vec<_>>(), vec!["default", "host"]);
        assert_eq!(trie.lookup_covering(&v4("8.8.8.9")).len(), 1);
        assert_eq!(trie.lookup_covering(&v4("10.1.2.3"))[0].1, &"default");
    }

    #[test]
    fn test_trie_duplicate_overwrites() {
        let mut trie = sample();
        assert_eq!(trie.insert(v4("10.1.0.0/16"), "newer"), Some("ten-one"));
        assert_eq!(trie.len(), 5);
        assert_eq!(trie.lookup_exact(&v4("10.1.0.0/16")), Some(&"newer"));
    }

    #[test]
    fn test_trie_path_compression() {
        let mut trie = PrefixTrie::new();
        trie.insert(v4("10.0.0.0/16"), 0);
        trie.insert(v4("10.1.0.0/16"), 1);
        // two leaves below one branching node at 10.0.0.0/15
        assert_eq!(trie.node_count(), 3);
        // inserting the branching prefix reuses the node
        trie.insert(v4("10.0.0.0/15"), 2);
        assert_eq!(trie.node_count(), 3);
        // inserting an ancestor above the root adds a single node
        trie.insert(v4("10.0.0.0/8"), 3);
        assert_eq!(trie.node_count(), 4);
        assert_eq!(trie.len(), 4);
    }

    #[test]
    fn test_trie_iter_order() {
        let trie = sample();
        let all: Vec<_> = trie.iter().map(|(p, _)| p).collect();
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(all, sorted);
        assert_eq!(trie.iter().len(), 5);
    }

    #[test]
    fn test_trie_ipv6() {
        let mut trie = PrefixTrie::new();
        trie.insert(v6("2001:db8::/32"), "doc");
        trie.insert(v6("2001:db8:1::/48"), "doc-1");
        trie.insert(v6("::/0"), "default");
        let found = trie.lookup_covering(&v6("2001:db8:1::42"));
        assert_eq!(
            found.iter().map(|(_, v)| **v).collect::<Vec<_>>(),
            vec!["default", "doc", "doc-1"]
        );
        assert_eq!(trie.lookup_exact(&v6("2001:db8::/32")), Some(&"doc"));
        assert_eq!(trie.lookup_exact(&v6("2001:db8::/33")), None);
    }

    #[test]
    fn test_trie_clear_and_debug() {
        let mut trie = sample();
        let dump = format!("{:?}", trie);
        assert!(dump.starts_with("0.0.0.0/0 -- Value: None"));
        assert!(dump.contains("-10.0.0.0/8 -- Value: \"ten\""));
        trie.clear();
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 0);
        assert_eq!(format!("{:?}", trie), "<empty>\n");
    }
}
