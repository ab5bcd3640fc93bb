//! # Address family module
//!
//! ## What is an address family?
//! A routing table keeps one independent prefix space per address family:
//! IPv4 prefixes are 32 bits wide and IPv6 prefixes are 128 bits wide. A
//! prefix of one family never covers an address of the other.
//!
//! ## What is it used for?
//! [Prefix](crate::prefix::Prefix) and the trie are generic over the family,
//! so that each family only stores the octets it needs and the bit width is
//! known at compile time.
//!
//! ## Example
//! ```no_run
//! use std::net::Ipv4Addr;
//! use rtquery_core::prefix::{family::AddressFamily, Prefix};
//!
//! let pfx = Prefix::new(Ipv4Addr::new(192, 168, 42, 0), 24).unwrap();
//! assert_eq!(<Ipv4Addr as AddressFamily>::BITS, 32);
//! assert!(pfx.contains(&Prefix::host(Ipv4Addr::new(192, 168, 42, 42))));
//! ```

use std::{
    fmt::{Debug, Display},
    hash::Hash,
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use bitvec::view::BitViewSized;

/// Describes an address family: its bit width and how its addresses map to
/// big-endian octets.
pub trait AddressFamily:
    Copy + Eq + Ord + Hash + Debug + Display + FromStr + Send + Sync + 'static
{
    /// Number of bits in an address of this family.
    const BITS: u8;
    /// Human-readable family name, used in error messages.
    const NAME: &'static str;

    /// Octet storage, most significant octet first.
    type Octets: BitViewSized + Copy + Eq + Ord + Hash + Debug + Send + Sync;

    fn to_octets(&self) -> Self::Octets;

    fn from_octets(octets: Self::Octets) -> Self;
}

impl AddressFamily for Ipv4Addr {
    const BITS: u8 = 32;
    const NAME: &'static str = "IPv4";

    type Octets = [u8; 4];

    #[inline]
    fn to_octets(&self) -> [u8; 4] {
        self.octets()
    }

    #[inline]
    fn from_octets(octets: [u8; 4]) -> Self {
        Ipv4Addr::from(octets)
    }
}

impl AddressFamily for Ipv6Addr {
    const BITS: u8 = 128;
    const NAME: &'static str = "IPv6";

    type Octets = [u8; 16];

    #[inline]
    fn to_octets(&self) -> [u8; 16] {
        self.octets()
    }

    #[inline]
    fn from_octets(octets: [u8; 16]) -> Self {
        Ipv6Addr::from(octets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octets_round_trip() {
        let v4 = Ipv4Addr::new(10, 1, 2, 3);
        assert_eq!(v4.to_octets(), [10, 1, 2, 3]);
        assert_eq!(Ipv4Addr::from_octets(v4.to_octets()), v4);

        let v6: Ipv6Addr = "2001:db8::1".parse().unwrap();
        assert_eq!(v6.to_octets()[..4], [0x20, 0x01, 0x0d, 0xb8]);
        assert_eq!(Ipv6Addr::from_octets(v6.to_octets()), v6);
    }
}
