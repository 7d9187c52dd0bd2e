//! Address primitives: `IPv4Address`, `IPv6Address`, and the classification
//! predicates (`is_zero`/`is_loopback`/`is_link_local`/`is_private`) used by
//! adapter enumeration and peer-address reporting.
//!
//! Pure functions, no side effects, no error paths — storage is byte-order
//! agnostic except where a method name says otherwise.

use crate::byteorder::{host_to_network_16, network_to_host_16};

////////////////////////////////////////////////////////////////////////////////
//// Structures

/// 32-bit IPv4 address, stored as four octets. Byte-order agnostic: the
/// octets are always in the order they'd appear on the wire.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C, align(4))]
pub struct IPv4Address {
    pub octets: [u8; 4],
}

/// 128-bit IPv6 address plus scoping metadata.
///
/// `scope_id` is meaningful only for link-local addresses; every other
/// address must carry zero. `flow_info` is carried verbatim between
/// get/create operations and never interpreted.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C, align(8))]
pub struct IPv6Address {
    pub hextets: [u16; 8],
    pub scope_id: u32,
    pub flow_info: u32,
}

/// One adapter's preferred v4 and v6 bindings, as produced by enumeration.
#[derive(Debug, Clone, Copy)]
#[repr(C, align(8))]
pub struct NetworkIPAddresses {
    pub v4_network_prefix_length: u8,
    pub v6_network_prefix_length: u8,
    _padding: [u8; 2],
    /// Host order.
    pub v4: IPv4Address,
    /// Network order.
    pub v6: IPv6Address,
}

////////////////////////////////////////////////////////////////////////////////
//// Implementations

impl IPv4Address {
    pub const ZERO: Self = Self { octets: [0, 0, 0, 0] };

    pub const fn as_u32(&self) -> u32 {
        u32::from_ne_bytes(self.octets)
    }

    pub fn is_zero(&self) -> bool {
        self.as_u32() == 0
    }

    pub fn is_loopback(&self) -> bool {
        self.octets[0] == 127
    }

    pub fn is_link_local(&self) -> bool {
        self.octets[0] == 169 && self.octets[1] == 254
    }

    pub fn is_private(&self) -> bool {
        self.octets[0] == 10
            || (self.octets[0] == 172 && (self.octets[1] & 0xF0) == 16)
            || (self.octets[0] == 192 && self.octets[1] == 168)
    }
}

impl std::fmt::Debug for IPv4Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<std::net::Ipv4Addr>::into(*self))
    }
}

impl std::fmt::Display for IPv4Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<std::net::Ipv4Addr> for IPv4Address {
    fn from(value: std::net::Ipv4Addr) -> Self {
        Self { octets: value.octets() }
    }
}

impl From<IPv4Address> for std::net::Ipv4Addr {
    fn from(value: IPv4Address) -> Self {
        std::net::Ipv4Addr::from(value.octets)
    }
}

const LINK_LOCAL_MASK_HOST: u16 = 0xFFC0;
const LINK_LOCAL_PATTERN_HOST: u16 = 0xFE80;

/// RFC 4193's `fc00::/7`, chosen over the narrower `fd00::/8` some source
/// revisions used (see DESIGN.md's Open Question #2).
const PRIVATE_MASK_HOST: u16 = 0xFE00;
const PRIVATE_PATTERN_HOST: u16 = 0xFC00;

const LINK_LOCAL_MASK_NET: u16 = host_to_network_16(LINK_LOCAL_MASK_HOST);
const LINK_LOCAL_PATTERN_NET: u16 = host_to_network_16(LINK_LOCAL_PATTERN_HOST);
const PRIVATE_MASK_NET: u16 = host_to_network_16(PRIVATE_MASK_HOST);
const PRIVATE_PATTERN_NET: u16 = host_to_network_16(PRIVATE_PATTERN_HOST);

impl IPv6Address {
    pub const LOOPBACK: Self = Self {
        hextets: [0, 0, 0, 0, 0, 0, 0, 1],
        scope_id: 0,
        flow_info: 0,
    };

    /// Flip each 16-bit group between host and network order, preserving
    /// `scope_id`/`flow_info` verbatim. Its own inverse.
    fn byte_swapped(&self) -> Self {
        let mut hextets = [0u16; 8];
        for (dst, src) in hextets.iter_mut().zip(self.hextets.iter()) {
            *dst = host_to_network_16(*src);
        }
        Self { hextets, scope_id: self.scope_id, flow_info: self.flow_info }
    }

    pub fn to_network_bo(&self) -> Self {
        self.byte_swapped()
    }

    pub fn to_host_bo(&self) -> Self {
        // host_to_network_16/network_to_host_16 share an implementation for
        // a fixed-width integer (reverse bytes on LE, identity on BE).
        let mut hextets = [0u16; 8];
        for (dst, src) in hextets.iter_mut().zip(self.hextets.iter()) {
            *dst = network_to_host_16(*src);
        }
        Self { hextets, scope_id: self.scope_id, flow_info: self.flow_info }
    }

    pub fn is_zero(&self) -> bool {
        self.hextets == [0; 8]
    }

    pub fn is_loopback(&self) -> bool {
        self.hextets == Self::LOOPBACK.hextets
    }

    pub fn is_link_local(&self) -> bool {
        (self.hextets[0] & LINK_LOCAL_MASK_HOST) == LINK_LOCAL_PATTERN_HOST
    }

    pub fn is_private(&self) -> bool {
        (self.hextets[0] & PRIVATE_MASK_HOST) == PRIVATE_PATTERN_HOST
    }

    pub fn is_loopback_in_network_bo(&self) -> bool {
        self.hextets == Self::LOOPBACK.to_network_bo().hextets
    }

    pub fn is_link_local_in_network_bo(&self) -> bool {
        (self.hextets[0] & LINK_LOCAL_MASK_NET) == LINK_LOCAL_PATTERN_NET
    }

    pub fn is_private_in_network_bo(&self) -> bool {
        (self.hextets[0] & PRIVATE_MASK_NET) == PRIVATE_PATTERN_NET
    }
}

impl std::fmt::Debug for IPv6Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<std::net::Ipv6Addr>::into(*self))
    }
}

impl std::fmt::Display for IPv6Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<std::net::Ipv6Addr> for IPv6Address {
    fn from(value: std::net::Ipv6Addr) -> Self {
        Self { hextets: value.segments(), scope_id: 0, flow_info: 0 }
    }
}

impl From<IPv6Address> for std::net::Ipv6Addr {
    fn from(value: IPv6Address) -> Self {
        std::net::Ipv6Addr::from(value.hextets)
    }
}

impl NetworkIPAddresses {
    pub fn new(
        v4_network_prefix_length: u8,
        v6_network_prefix_length: u8,
        v4: IPv4Address,
        v6: IPv6Address,
    ) -> Self {
        Self {
            v4_network_prefix_length,
            v6_network_prefix_length,
            _padding: [0; 2],
            v4,
            v6,
        }
    }

    /// True once at least one of the two preferred addresses is non-zero;
    /// entries with no preferred addresses are filtered out by the enumerator.
    pub fn is_populated(&self) -> bool {
        !self.v4.is_zero() || !self.v6.is_zero()
    }
}

////////////////////////////////////////////////////////////////////////////////
//// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn v4_classification() {
        assert!(IPv4Address::from(std::net::Ipv4Addr::new(0, 0, 0, 0)).is_zero());
        assert!(IPv4Address::from(std::net::Ipv4Addr::new(127, 0, 0, 1)).is_loopback());
        assert!(IPv4Address::from(std::net::Ipv4Addr::new(169, 254, 1, 1)).is_link_local());
        assert!(IPv4Address::from(std::net::Ipv4Addr::new(10, 0, 0, 1)).is_private());
        assert!(IPv4Address::from(std::net::Ipv4Addr::new(172, 16, 0, 1)).is_private());
        assert!(!IPv4Address::from(std::net::Ipv4Addr::new(172, 32, 0, 1)).is_private());
        assert!(IPv4Address::from(std::net::Ipv4Addr::new(192, 168, 1, 1)).is_private());
        assert!(!IPv4Address::from(std::net::Ipv4Addr::new(8, 8, 8, 8)).is_private());
    }

    #[test]
    fn v6_classification() {
        assert!(IPv6Address::from(std::net::Ipv6Addr::UNSPECIFIED).is_zero());
        assert!(IPv6Address::from(std::net::Ipv6Addr::LOCALHOST).is_loopback());
        assert!(
            IPv6Address::from("fe80::1".parse::<std::net::Ipv6Addr>().unwrap())
                .is_link_local()
        );
        assert!(
            IPv6Address::from("fc00::1".parse::<std::net::Ipv6Addr>().unwrap())
                .is_private()
        );
        assert!(
            IPv6Address::from("fd12::1".parse::<std::net::Ipv6Addr>().unwrap())
                .is_private()
        );
        assert!(
            !IPv6Address::from("2001:db8::1".parse::<std::net::Ipv6Addr>().unwrap())
                .is_private()
        );
    }

    #[test]
    fn v6_round_trip_preserves_scope_and_flow() {
        let a = IPv6Address {
            hextets: [0xfe80, 0, 0, 0, 1, 2, 3, 4],
            scope_id: 7,
            flow_info: 0xdead_beef,
        };
        let round_tripped = a.to_network_bo().to_host_bo();
        assert_eq!(round_tripped.hextets, a.hextets);
        assert_eq!(round_tripped.scope_id, a.scope_id);
        assert_eq!(round_tripped.flow_info, a.flow_info);
    }

    #[test]
    fn v6_in_network_bo_variants_agree_with_host_order_variants() {
        let a = IPv6Address { hextets: [0xfe80, 0, 0, 0, 0, 0, 0, 1], scope_id: 0, flow_info: 0 };
        let net = a.to_network_bo();
        assert_eq!(net.is_link_local_in_network_bo(), a.is_link_local());
        assert_eq!(net.is_private_in_network_bo(), a.is_private());
        assert_eq!(net.is_loopback_in_network_bo(), a.is_loopback());
    }

    proptest! {
        #[test]
        fn v4_is_zero_iff_all_octets_zero(octets: [u8; 4]) {
            let zero = octets == [0, 0, 0, 0];
            prop_assert_eq!(IPv4Address { octets }.is_zero(), zero);
        }

        #[test]
        fn v6_round_trip(hextets: [u16; 8], scope_id: u32, flow_info: u32) {
            let a = IPv6Address { hextets, scope_id, flow_info };
            let b = a.to_network_bo().to_host_bo();
            prop_assert_eq!(b.hextets, a.hextets);
            prop_assert_eq!(b.scope_id, a.scope_id);
            prop_assert_eq!(b.flow_info, a.flow_info);
        }
    }
}
