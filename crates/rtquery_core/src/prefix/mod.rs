//! # Prefix
//!
//! ## Relations of important structs
//! ```text
//!   AddressFamily (Ipv4Addr | Ipv6Addr)
//!         |
//!         v
//!    Prefix<AF>  --(family tag)-->  IpPrefix
//! ```
//!
//! A [Prefix] keeps the address as a bit array (most significant bit first)
//! and only the leading `len` bits are significant. Every constructor masks
//! the remaining bits to zero, so equality and hashing only ever see the
//! significant bits.
//!
//! ## Example
//! ```no_run
//! use rtquery_core::prefix::IpPrefix;
//!
//! let pfx: IpPrefix = "10.1.2.3/16".parse().unwrap();
//! assert_eq!(pfx.to_string(), "10.1.0.0/16");
//! let host: IpPrefix = "2001:db8::1".parse().unwrap();
//! assert_eq!(host.len(), 128);
//! ```

pub mod family;

use std::{
    cmp::{min, Ordering},
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use bitvec::{array::BitArray, order::Msb0};
use log::debug;

use crate::error::ParseError;
use family::AddressFamily;

/// An address plus the number of leading bits that are significant.
pub struct Prefix<AF: AddressFamily> {
    bits: BitArray<AF::Octets, Msb0>,
    len: u8,
}

impl<AF: AddressFamily> Prefix<AF> {
    /// Create a prefix, masking every bit at or beyond `len` to zero.
    pub fn new(addr: AF, len: u8) -> Result<Self, ParseError> {
        if len > AF::BITS {
            return Err(ParseError::InvalidPrefixLength {
                len: len.to_string(),
                family: AF::NAME,
                max: AF::BITS,
            });
        }
        let mut bits = BitArray::<AF::Octets, Msb0>::new(addr.to_octets());
        if bits[len as usize..].any() {
            debug!("masking host bits of {}/{}", addr, len);
            bits[len as usize..].fill(false);
        }
        Ok(Prefix { bits, len })
    }

    /// The prefix of full length that matches exactly `addr`.
    #[inline]
    pub fn host(addr: AF) -> Self {
        Prefix {
            bits: BitArray::new(addr.to_octets()),
            len: AF::BITS,
        }
    }

    /// The zero-length prefix covering the whole family.
    #[inline]
    pub fn default_route() -> Self {
        Prefix {
            bits: BitArray::ZERO,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> u8 {
        self.len
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_host(&self) -> bool {
        self.len == AF::BITS
    }

    #[inline]
    pub fn addr(&self) -> AF {
        AF::from_octets(self.bits.into_inner())
    }

    /// Bit `index` of the address, counted from the most significant bit.
    #[inline]
    pub fn bit(&self, index: u8) -> bool {
        debug_assert!(index < AF::BITS);
        self.bits[index as usize]
    }

    /// Whether every address of `other` also belongs to `self`.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        let len = self.len as usize;
        self.len <= other.len && self.bits[..len] == other.bits[..len]
    }

    /// Length of the longest prefix shared by `self` and `other`, bounded by
    /// the shorter of the two.
    pub fn common_len(&self, other: &Self) -> u8 {
        let bound = min(self.len, other.len);
        (0..bound)
            .find(|&i| self.bit(i) != other.bit(i))
            .unwrap_or(bound)
    }

    /// The prefix made of the first `len` bits of `self`.
    pub fn truncate(&self, len: u8) -> Self {
        debug_assert!(len <= self.len);
        let mut bits = self.bits;
        bits[len as usize..].fill(false);
        Prefix { bits, len }
    }
}

impl<AF: AddressFamily> Clone for Prefix<AF> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<AF: AddressFamily> Copy for Prefix<AF> {}

impl<AF: AddressFamily> PartialEq for Prefix<AF> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.bits.into_inner() == other.bits.into_inner()
    }
}

impl<AF: AddressFamily> Eq for Prefix<AF> {}

impl<AF: AddressFamily> Hash for Prefix<AF> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.into_inner().hash(state);
        self.len.hash(state);
    }
}

/// Prefixes sort by address first, so that a prefix always sorts before its
/// more-specifics.
impl<AF: AddressFamily> Ord for Prefix<AF> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bits
            .into_inner()
            .cmp(&other.bits.into_inner())
            .then_with(|| self.len.cmp(&other.len))
    }
}

impl<AF: AddressFamily> PartialOrd for Prefix<AF> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<AF: AddressFamily> Display for Prefix<AF> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr(), self.len)
    }
}

impl<AF: AddressFamily> Debug for Prefix<AF> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// A prefix of either address family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IpPrefix {
    V4(Prefix<Ipv4Addr>),
    V6(Prefix<Ipv6Addr>),
}

impl IpPrefix {
    /// Build a prefix from its textual address and optional length. Without
    /// a length the result is the host prefix of the address.
    pub fn from_parts(addr: &str, len: Option<&str>) -> Result<Self, ParseError> {
        let ip = addr
            .parse::<IpAddr>()
            .map_err(|_| ParseError::InvalidAddress(addr.to_owned()))?;
        Ok(match (ip, len) {
            (IpAddr::V4(ip), None) => IpPrefix::V4(Prefix::host(ip)),
            (IpAddr::V6(ip), None) => IpPrefix::V6(Prefix::host(ip)),
            (IpAddr::V4(ip), Some(len)) => {
                IpPrefix::V4(Prefix::new(ip, parse_len::<Ipv4Addr>(len)?)?)
            }
            (IpAddr::V6(ip), Some(len)) => {
                IpPrefix::V6(Prefix::new(ip, parse_len::<Ipv6Addr>(len)?)?)
            }
        })
    }

    /// Parse strict CIDR notation, the `/len` part is mandatory.
    pub fn parse_cidr(text: &str) -> Result<Self, ParseError> {
        match text.split_once('/') {
            Some((addr, len)) => Self::from_parts(addr, Some(len)),
            None => Err(ParseError::MissingPrefixLength(text.to_owned())),
        }
    }

    #[inline]
    pub fn len(&self) -> u8 {
        match self {
            IpPrefix::V4(p) => p.len(),
            IpPrefix::V6(p) => p.len(),
        }
    }

    #[inline]
    pub fn is_host(&self) -> bool {
        match self {
            IpPrefix::V4(p) => p.is_host(),
            IpPrefix::V6(p) => p.is_host(),
        }
    }

    #[inline]
    pub fn family_name(&self) -> &'static str {
        match self {
            IpPrefix::V4(_) => Ipv4Addr::NAME,
            IpPrefix::V6(_) => Ipv6Addr::NAME,
        }
    }

    pub fn addr(&self) -> IpAddr {
        match self {
            IpPrefix::V4(p) => IpAddr::V4(p.addr()),
            IpPrefix::V6(p) => IpAddr::V6(p.addr()),
        }
    }
}

fn parse_len<AF: AddressFamily>(text: &str) -> Result<u8, ParseError> {
    let err = || ParseError::InvalidPrefixLength {
        len: text.to_owned(),
        family: AF::NAME,
        max: AF::BITS,
    };
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    text.parse::<u8>()
        .ok()
        .filter(|len| *len <= AF::BITS)
        .ok_or_else(err)
}

/// Accepts both `addr/len` and a bare address (host prefix).
impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((addr, len)) => Self::from_parts(addr, Some(len)),
            None => Self::from_parts(s, None),
        }
    }
}

impl Display for IpPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IpPrefix::V4(p) => Display::fmt(p, f),
            IpPrefix::V6(p) => Display::fmt(p, f),
        }
    }
}

impl From<Prefix<Ipv4Addr>> for IpPrefix {
    #[inline]
    fn from(value: Prefix<Ipv4Addr>) -> Self {
        IpPrefix::V4(value)
    }
}

impl From<Prefix<Ipv6Addr>> for IpPrefix {
    #[inline]
    fn from(value: Prefix<Ipv6Addr>) -> Self {
        IpPrefix::V6(value)
    }
}

impl From<IpAddr> for IpPrefix {
    fn from(value: IpAddr) -> Self {
        match value {
            IpAddr::V4(ip) => IpPrefix::V4(Prefix::host(ip)),
            IpAddr::V6(ip) => IpPrefix::V6(Prefix::host(ip)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(s: &str) -> Prefix<Ipv4Addr> {
        match s.parse::<IpPrefix>().unwrap() {
            IpPrefix::V4(p) => p,
            IpPrefix::V6(_) => panic!("{s} is not IPv4"),
        }
    }

    #[test]
    fn test_masking() {
        let p = v4("10.1.2.3/16");
        assert_eq!(p.addr(), Ipv4Addr::new(10, 1, 0, 0));
        assert_eq!(p, v4("10.1.0.0/16"));
        assert_eq!(p.to_string(), "10.1.0.0/16");
        assert_eq!(v4("255.255.255.255/0"), Prefix::default_route());
    }

    #[test]
    fn test_equality_needs_same_len() {
        assert_ne!(v4("10.0.0.0/8"), v4("10.0.0.0/9"));
        assert!(v4("10.0.0.0/8") < v4("10.0.0.0/9"));
    }

    #[test]
    fn test_contains() {
        let p8 = v4("10.0.0.0/8");
        let p16 = v4("10.1.0.0/16");
        assert!(p8.contains(&p16));
        assert!(!p16.contains(&p8));
        assert!(p16.contains(&p16));
        assert!(!p16.contains(&v4("10.2.0.0/16")));
        assert!(Prefix::default_route().contains(&v4("192.168.1.1")));
        assert!(v4("192.168.1.1/32").contains(&v4("192.168.1.1")));
        assert!(!v4("192.168.1.1/32").contains(&v4("192.168.1.2")));
    }

    #[test]
    fn test_common_len() {
        assert_eq!(v4("10.0.0.0/8").common_len(&v4("10.1.0.0/16")), 8);
        assert_eq!(v4("10.0.0.0/16").common_len(&v4("10.1.0.0/16")), 15);
        assert_eq!(v4("128.0.0.0/1").common_len(&v4("0.0.0.0/1")), 0);
        assert_eq!(v4("10.1.0.0/16").truncate(15), v4("10.0.0.0/15"));
    }

    #[test]
    fn test_bits_msb_first() {
        let p = v4("128.0.0.1");
        assert!(p.bit(0));
        assert!(!p.bit(1));
        assert!(p.bit(31));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "10.0.0.0/33".parse::<IpPrefix>(),
            Err(ParseError::InvalidPrefixLength { max: 32, .. })
        ));
        assert!(matches!(
            "2001:db8::/129".parse::<IpPrefix>(),
            Err(ParseError::InvalidPrefixLength { max: 128, .. })
        ));
        assert!(matches!(
            "10.0.0/8".parse::<IpPrefix>(),
            Err(ParseError::InvalidAddress(_))
        ));
        assert!(matches!(
            "10.0.0.0/+8".parse::<IpPrefix>(),
            Err(ParseError::InvalidPrefixLength { .. })
        ));
        assert!(matches!(
            IpPrefix::parse_cidr("10.0.0.0"),
            Err(ParseError::MissingPrefixLength(_))
        ));
    }

    #[test]
    fn test_ipv6() {
        let p: IpPrefix = "2001:db8:ffff::/32".parse().unwrap();
        assert_eq!(p.to_string(), "2001:db8::/32");
        assert_eq!(p.family_name(), "IPv6");
        let host: IpPrefix = "2001:db8::1".parse().unwrap();
        assert!(host.is_host());
        match (p, host) {
            (IpPrefix::V6(p), IpPrefix::V6(h)) => assert!(p.contains(&h)),
            _ => unreachable!(),
        }
    }
}
