//! Supported-protocol enumeration, network-adapter enumeration, and the
//! IPv4-vs-IPv6 address preference ladder.
//!
//! Grounded on `minghu6-linuxc::iface.rs` for *how* to walk the host's
//! interface list (`getifaddrs`/`freeifaddrs`) and on
//! `examples/original_source`'s `SocketDataSharing.cpp` (`_GetIPAdapters`,
//! `_SetNetworkIPAddressesFromIPAdapter`, `_ChooseBestIPAddressInNetworkBO`)
//! for *what* to compute. POSIX's `getifaddrs` has no duplicate-address-
//! detection state field (unlike Windows' `IP_ADAPTER_UNICAST_ADDRESS`), so
//! every address `getifaddrs` reports is treated as preferred; the loopback
//! skip uses the interface's `IFF_LOOPBACK` flag in place of the source's
//! `IfType == 24` check.

use std::collections::HashMap;
use std::ffi::CStr;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::ptr::null_mut;

use libc::{freeifaddrs, getifaddrs, sockaddr_in, sockaddr_in6, AF_INET, AF_INET6};

use crate::address::{IPv4Address, IPv6Address, NetworkIPAddresses};
use crate::errno;
use crate::error::{translate, ErrorKind, Operation};

////////////////////////////////////////////////////////////////////////////////
//// Structures

/// Capability bitmap for the four family x transport combinations (spec §3's
/// `ErrorSupportedProtocols`, modeled internally as a plain struct per §9's
/// "tri-state error-booleans -> result of boolean" design note; the C ABI
/// tri-state encoding happens only in `src/ffi.rs`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupportedProtocols {
    pub ipv4_tcp: bool,
    pub ipv4_udp: bool,
    pub ipv6_tcp: bool,
    pub ipv6_udp: bool,
}

#[derive(Default)]
struct AdapterAccumulator {
    v4: Option<(Ipv4Addr, u8)>,
    v6: Option<(Ipv6Addr, u32, u8)>,
}

////////////////////////////////////////////////////////////////////////////////
//// Functions

/// Probes each of the four (family, transport) combinations by attempting to
/// open and immediately close a socket, standing in for the Windows source's
/// `WSAEnumProtocols` call.
pub fn enumerate_supported_protocols() -> Result<SupportedProtocols, ErrorKind> {
    let probe = |domain: i32, ty: i32| -> bool {
        unsafe {
            let fd = libc::socket(domain, ty, 0);
            if fd >= 0 {
                libc::close(fd);
                true
            } else {
                false
            }
        }
    };

    Ok(SupportedProtocols {
        ipv4_tcp: probe(libc::AF_INET, libc::SOCK_STREAM),
        ipv4_udp: probe(libc::AF_INET, libc::SOCK_DGRAM),
        ipv6_tcp: probe(libc::AF_INET6, libc::SOCK_STREAM),
        ipv6_udp: probe(libc::AF_INET6, libc::SOCK_DGRAM),
    })
}

fn prefix_len_v4(mask: Ipv4Addr) -> u8 {
    u32::from_be_bytes(mask.octets()).count_ones() as u8
}

fn prefix_len_v6(mask: Ipv6Addr) -> u8 {
    mask.octets().iter().map(|b| b.count_ones()).sum::<u32>() as u8
}

/// Walks the host's adapter list and extracts one preferred v4 and one
/// preferred v6 address per adapter; loopback adapters are skipped; an
/// adapter yielding neither is dropped. Later addresses on the same adapter
/// overwrite earlier ones, matching spec §4.4.
pub fn get_network_ip_addresses() -> Result<Vec<NetworkIPAddresses>, ErrorKind> {
    let mut by_adapter: HashMap<String, AdapterAccumulator> = HashMap::new();

    unsafe {
        let mut head = null_mut();
        if getifaddrs(&mut head) != 0 {
            return Err(translate(Operation::AdapterEnumeration, errno::last_os_error()));
        }

        let mut cursor = head;
        while !cursor.is_null() {
            let entry = &*cursor;

            if entry.ifa_addr.is_null() || entry.ifa_netmask.is_null() {
                cursor = entry.ifa_next;
                continue;
            }

            if entry.ifa_flags & (libc::IFF_LOOPBACK as u32) != 0 {
                cursor = entry.ifa_next;
                continue;
            }

            let family = (*entry.ifa_addr).sa_family as i32;
            let name = CStr::from_ptr(entry.ifa_name).to_string_lossy().into_owned();
            let acc = by_adapter.entry(name).or_default();

            if family == AF_INET {
                let addr = (*(entry.ifa_addr as *const sockaddr_in)).sin_addr;
                let mask = (*(entry.ifa_netmask as *const sockaddr_in)).sin_addr;
                let addr = Ipv4Addr::from(u32::from_be(addr.s_addr));
                let mask = Ipv4Addr::from(u32::from_be(mask.s_addr));
                acc.v4 = Some((addr, prefix_len_v4(mask)));
            } else if family == AF_INET6 {
                let sa = &*(entry.ifa_addr as *const sockaddr_in6);
                let ma = &*(entry.ifa_netmask as *const sockaddr_in6);
                let addr = Ipv6Addr::from(sa.sin6_addr.s6_addr);
                let mask = Ipv6Addr::from(ma.sin6_addr.s6_addr);
                acc.v6 = Some((addr, sa.sin6_scope_id, prefix_len_v6(mask)));
            }

            cursor = entry.ifa_next;
        }

        freeifaddrs(head);
    }

    let mut result = Vec::new();
    for (_name, acc) in by_adapter {
        if acc.v4.is_none() && acc.v6.is_none() {
            continue;
        }

        let (v4, v4_prefix) = acc
            .v4
            .map(|(a, p)| (IPv4Address::from(a), p))
            .unwrap_or((IPv4Address::ZERO, 0));

        let (v6, v6_prefix) = match acc.v6 {
            Some((addr, scope_id, prefix)) => {
                let mut v6 = IPv6Address::from(addr);
                v6.scope_id = scope_id;
                (v6.to_network_bo(), prefix)
            }
            None => (IPv6Address::default(), 0),
        };

        let entry = NetworkIPAddresses::new(v4_prefix, v6_prefix, v4, v6);
        if entry.is_populated() {
            result.push(entry);
        }
    }

    Ok(result)
}

fn score_v4(addr: &IPv4Address) -> u8 {
    if addr.is_zero() {
        0
    } else if addr.is_private() {
        3
    } else if addr.is_link_local() {
        2
    } else {
        1
    }
}

fn score_v6_network_bo(addr: &IPv6Address) -> u8 {
    if addr.is_zero() {
        0
    } else if addr.is_private_in_network_bo() {
        3
    } else if addr.is_link_local_in_network_bo() {
        2
    } else {
        1
    }
}

/// Scores each family on the ladder `zero(0) < global(1) < link-local(2) <
/// private(3)` and returns true iff the v4 score is at least the v6 score.
/// Fast-paths a private v4 address to `true` without scoring v6 at all.
pub fn is_ipv4_address_preferred(v4: &IPv4Address, v6_network_bo: &IPv6Address) -> bool {
    if v4.is_private() {
        return true;
    }

    score_v4(v4) >= score_v6_network_bo(v6_network_bo)
}

////////////////////////////////////////////////////////////////////////////////
//// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_protocols_smoke() {
        let protocols = enumerate_supported_protocols().unwrap();
        println!("{protocols:?}");
        // Every POSIX host this library targets supports at least plain IPv4.
        assert!(protocols.ipv4_tcp);
        assert!(protocols.ipv4_udp);
    }

    #[test]
    fn enumerate_adapters_smoke() {
        let adapters = get_network_ip_addresses().unwrap();
        println!("{adapters:#?}");
    }

    #[test]
    fn s5_private_v4_outranks_global_v6() {
        let v4 = IPv4Address::from("192.168.1.10".parse::<Ipv4Addr>().unwrap());
        let v6: IPv6Address = "2001:db8::1".parse::<Ipv6Addr>().unwrap().into();
        assert!(is_ipv4_address_preferred(&v4, &v6.to_network_bo()));
    }

    #[test]
    fn invariant_10_symmetric_private_cases() {
        let global_v4 = IPv4Address::from("8.8.8.8".parse::<Ipv4Addr>().unwrap());
        let private_v6: IPv6Address = "fc00::1".parse::<Ipv6Addr>().unwrap().into();
        assert!(!is_ipv4_address_preferred(&global_v4, &private_v6.to_network_bo()));
    }
}
