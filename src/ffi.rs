//! The public C ABI: every symbol this crate exports with `extern "C"`
//! linkage (spec §6). This module owns the ABI-only concerns — handle
//! encoding, the tri-state booleans, by-value `repr(C)` result structs, and
//! centralizing the "at most once per public-function call" error-callback
//! invocation (spec §8 invariant 9) — and otherwise just calls into
//! `context`/`lifecycle`/`iface`/`socket`.
//!
//! Grounded on `minghu6-linuxc`'s raw-syscall wrapper shape for argument
//! validation ahead of the OS call, and on
//! `examples/other_examples/189920b6_m-mueller678-hermit-kernel__src-syscalls-net.rs.rs`
//! for how a `std`-adjacent Rust codebase shapes a C-ABI socket surface
//! (`#[repr(C)]` address structs, plain integer handles).

use std::ffi::c_void;
use std::os::fd::RawFd;

use crate::address::{IPv4Address, IPv6Address, NetworkIPAddresses};
use crate::context::{self, ErrorOccuredCallback};
use crate::error::{self, ErrorKind};
use crate::iface;
use crate::lifecycle;
use crate::socket::{self, LingerOption, PeerAddress};

////////////////////////////////////////////////////////////////////////////////
//// Structures

/// Opaque socket reference exposed to foreign callers. `0` is reserved for
/// "absent"; a valid handle is the raw OS descriptor offset by one (spec §4.5,
/// spec §9's "null-reserving handle encoding" design note).
pub type SocketHandle = usize;

/// Integer-indicator return: a distinguished zero means "error", any non-zero
/// value means "ok" (spec §6).
pub type ErrorIndicator = i32;

/// Boolean return with a failure channel (spec §6).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBool {
    Error = 0,
    False = 1,
    True = 2,
}

impl From<bool> for ErrorBool {
    fn from(value: bool) -> Self {
        if value {
            ErrorBool::True
        } else {
            ErrorBool::False
        }
    }
}

/// Capability bitmap crossing the ABI (spec §3's `ErrorSupportedProtocols`).
#[repr(C)]
pub struct ErrorSupportedProtocols {
    pub ok: ErrorBool,
    pub ipv4_tcp: ErrorBool,
    pub ipv4_udp: ErrorBool,
    pub ipv6_tcp: ErrorBool,
    pub ipv6_udp: ErrorBool,
}

impl ErrorSupportedProtocols {
    fn error() -> Self {
        Self {
            ok: ErrorBool::Error,
            ipv4_tcp: ErrorBool::False,
            ipv4_udp: ErrorBool::False,
            ipv6_tcp: ErrorBool::False,
            ipv6_udp: ErrorBool::False,
        }
    }
}

/// Remote peer's address crossing the ABI (spec §3's `ErrorIPSocketAddress`).
/// `is_v6` selects which of `v4`/`v6` the caller should read; port is in
/// host order, matching §6's port convention.
#[repr(C)]
pub struct ErrorIPSocketAddress {
    pub ok: ErrorBool,
    pub is_v6: ErrorBool,
    pub port: u16,
    pub v4: IPv4Address,
    pub v6: IPv6Address,
}

impl ErrorIPSocketAddress {
    fn error() -> Self {
        Self {
            ok: ErrorBool::Error,
            is_v6: ErrorBool::False,
            port: 0,
            v4: IPv4Address::ZERO,
            v6: IPv6Address::default(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
//// Handle encoding

fn encode_handle(fd: RawFd) -> SocketHandle {
    fd as usize + 1
}

fn decode_handle(handle: SocketHandle) -> Option<RawFd> {
    if handle == 0 {
        None
    } else {
        Some((handle - 1) as RawFd)
    }
}

////////////////////////////////////////////////////////////////////////////////
//// Error reporting

/// Reports `kind` through the registered callback, attaching the platform
/// code only for `UnexpectedSystemError` (spec §7). Every public entry point
/// below calls this at most once, on its single failing path.
fn report(kind: ErrorKind) {
    let platform_code = if kind == ErrorKind::UnexpectedSystemError {
        error::last_unexpected_platform_code()
    } else {
        0
    };
    context::context().report_error(kind, platform_code);
}

fn null_pointer_error() -> ErrorBool {
    report(ErrorKind::PassedPointerIsNull);
    ErrorBool::Error
}

/// Every entry point besides `SetErrorOccuredCallback`/`Initialize` must
/// refuse with `IsNotInitialized` before doing anything else (spec.md:83:
/// "any | not-initialized | IsNotInitialized"), matching
/// `examples/original_source/source/windows/source/SocketDataSharing.cpp`'s
/// `State::isInitialized` gate at the top of each entry point.
fn require_initialized() -> bool {
    if context::context().initialized {
        true
    } else {
        report(ErrorKind::IsNotInitialized);
        false
    }
}

////////////////////////////////////////////////////////////////////////////////
//// Lifecycle & enumeration

#[no_mangle]
pub extern "C" fn SetErrorOccuredCallback(
    callback: Option<ErrorOccuredCallback>,
    ctx: *mut c_void,
) -> ErrorBool {
    match callback {
        Some(callback) if context::context().set_error_callback(callback, ctx) => ErrorBool::True,
        _ => ErrorBool::Error,
    }
}

#[no_mangle]
pub extern "C" fn Initialize() -> ErrorBool {
    match lifecycle::initialize(context::context()) {
        Ok(()) => ErrorBool::True,
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

#[no_mangle]
pub extern "C" fn Shutdown() -> ErrorBool {
    match lifecycle::shutdown(context::context()) {
        Ok(()) => ErrorBool::True,
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

#[no_mangle]
pub extern "C" fn EnumerateSupportedProtocols() -> ErrorSupportedProtocols {
    if !require_initialized() {
        return ErrorSupportedProtocols::error();
    }

    match iface::enumerate_supported_protocols() {
        Ok(protocols) => ErrorSupportedProtocols {
            ok: ErrorBool::True,
            ipv4_tcp: protocols.ipv4_tcp.into(),
            ipv4_udp: protocols.ipv4_udp.into(),
            ipv6_tcp: protocols.ipv6_tcp.into(),
            ipv6_udp: protocols.ipv6_udp.into(),
        },
        Err(kind) => {
            report(kind);
            ErrorSupportedProtocols::error()
        }
    }
}

/// Writes the process-static enumeration result's base pointer and length
/// through `out_ptr`/`out_len`. The pointer is borrowed; it is invalidated by
/// the next call to this function (spec §5).
///
/// # Safety
/// `out_ptr` and `out_len` must each be either null or valid for a single
/// write of their respective pointee type.
#[no_mangle]
pub unsafe extern "C" fn GetNetworkIPAddressesArray(
    out_ptr: *mut *const NetworkIPAddresses,
    out_len: *mut usize,
) -> ErrorBool {
    if !require_initialized() {
        return ErrorBool::Error;
    }
    if out_ptr.is_null() || out_len.is_null() {
        return null_pointer_error();
    }

    match iface::get_network_ip_addresses() {
        Ok(addresses) => {
            let ctx = context::context();
            ctx.adapter_addresses = addresses;
            unsafe {
                *out_ptr = ctx.adapter_addresses.as_ptr();
                *out_len = ctx.adapter_addresses.len();
            }
            ErrorBool::True
        }
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

#[no_mangle]
pub extern "C" fn IsIPv4AddressPreferred(v4: IPv4Address, v6_network_bo: IPv6Address) -> ErrorBool {
    if !require_initialized() {
        return ErrorBool::Error;
    }
    iface::is_ipv4_address_preferred(&v4, &v6_network_bo).into()
}

////////////////////////////////////////////////////////////////////////////////
//// Socket factory

/// # Safety
/// `port` must be valid for a single read and write of a `u16`.
#[no_mangle]
pub unsafe extern "C" fn CreateIPv4UDPSocket(addr: IPv4Address, port: *mut u16) -> SocketHandle {
    if !require_initialized() {
        return 0;
    }
    if port.is_null() {
        report(ErrorKind::PassedPointerIsNull);
        return 0;
    }

    let mut local_port = unsafe { *port };
    match socket::create_ipv4_udp_socket(context::context(), addr, &mut local_port) {
        Ok(fd) => {
            unsafe { *port = local_port };
            encode_handle(fd)
        }
        Err(kind) => {
            report(kind);
            0
        }
    }
}

/// # Safety
/// `port` must be valid for a single read and write of a `u16`.
#[no_mangle]
pub unsafe extern "C" fn CreateIPv6UDPSocket(addr_net: IPv6Address, port: *mut u16) -> SocketHandle {
    if !require_initialized() {
        return 0;
    }
    if port.is_null() {
        report(ErrorKind::PassedPointerIsNull);
        return 0;
    }

    let mut local_port = unsafe { *port };
    match socket::create_ipv6_udp_socket(context::context(), addr_net, &mut local_port) {
        Ok(fd) => {
            unsafe { *port = local_port };
            encode_handle(fd)
        }
        Err(kind) => {
            report(kind);
            0
        }
    }
}

/// # Safety
/// `port` must be valid for a single read and write of a `u16`.
#[no_mangle]
pub unsafe extern "C" fn CreateListeningIPv4TCPSocket(
    addr: IPv4Address,
    port: *mut u16,
    backlog: i32,
) -> SocketHandle {
    if !require_initialized() {
        return 0;
    }
    if port.is_null() {
        report(ErrorKind::PassedPointerIsNull);
        return 0;
    }

    let mut local_port = unsafe { *port };
    match socket::create_listening_ipv4_tcp_socket(context::context(), addr, &mut local_port, backlog) {
        Ok(fd) => {
            unsafe { *port = local_port };
            encode_handle(fd)
        }
        Err(kind) => {
            report(kind);
            0
        }
    }
}

/// # Safety
/// `port` must be valid for a single read and write of a `u16`.
#[no_mangle]
pub unsafe extern "C" fn CreateListeningIPv6TCPSocket(
    addr_net: IPv6Address,
    port: *mut u16,
    backlog: i32,
) -> SocketHandle {
    if !require_initialized() {
        return 0;
    }
    if port.is_null() {
        report(ErrorKind::PassedPointerIsNull);
        return 0;
    }

    let mut local_port = unsafe { *port };
    match socket::create_listening_ipv6_tcp_socket(context::context(), addr_net, &mut local_port, backlog) {
        Ok(fd) => {
            unsafe { *port = local_port };
            encode_handle(fd)
        }
        Err(kind) => {
            report(kind);
            0
        }
    }
}

#[no_mangle]
pub extern "C" fn CreateConnectedIPv4TCPSocket(
    from_port: u16,
    to_addr: IPv4Address,
    to_port: u16,
) -> SocketHandle {
    if !require_initialized() {
        return 0;
    }
    match socket::create_connected_ipv4_tcp_socket(context::context(), from_port, to_addr, to_port) {
        Ok(fd) => encode_handle(fd),
        Err(kind) => {
            report(kind);
            0
        }
    }
}

#[no_mangle]
pub extern "C" fn CreateConnectedIPv6TCPSocket(
    from_port: u16,
    to_addr_host: IPv6Address,
    to_port: u16,
) -> SocketHandle {
    if !require_initialized() {
        return 0;
    }
    match socket::create_connected_ipv6_tcp_socket(context::context(), from_port, to_addr_host, to_port) {
        Ok(fd) => encode_handle(fd),
        Err(kind) => {
            report(kind);
            0
        }
    }
}

/// # Safety
/// `out_handle` must be valid for a single write of a `SocketHandle`.
#[no_mangle]
pub unsafe extern "C" fn AcceptNewConnection(
    listening: SocketHandle,
    out_handle: *mut SocketHandle,
) -> ErrorBool {
    if !require_initialized() {
        return ErrorBool::Error;
    }
    if out_handle.is_null() {
        return null_pointer_error();
    }

    let Some(fd) = decode_handle(listening) else {
        report(ErrorKind::InvalidSocketHandle);
        return ErrorBool::Error;
    };

    match socket::accept_new_connection(context::context(), fd) {
        Ok(Some(accepted)) => {
            unsafe { *out_handle = encode_handle(accepted) };
            ErrorBool::True
        }
        Ok(None) => {
            unsafe { *out_handle = 0 };
            ErrorBool::True
        }
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

#[no_mangle]
pub extern "C" fn GetAnotherHostIPSocketAddress(handle: SocketHandle) -> ErrorIPSocketAddress {
    if !require_initialized() {
        return ErrorIPSocketAddress::error();
    }

    let Some(fd) = decode_handle(handle) else {
        report(ErrorKind::InvalidSocketHandle);
        return ErrorIPSocketAddress::error();
    };

    match socket::peer_address(context::context(), fd) {
        Ok(PeerAddress::V4 { port, addr }) => ErrorIPSocketAddress {
            ok: ErrorBool::True,
            is_v6: ErrorBool::False,
            port,
            v4: addr,
            v6: IPv6Address::default(),
        },
        Ok(PeerAddress::V6 { port, addr }) => ErrorIPSocketAddress {
            ok: ErrorBool::True,
            is_v6: ErrorBool::True,
            port,
            v4: IPv4Address::ZERO,
            v6: addr,
        },
        Err(kind) => {
            report(kind);
            ErrorIPSocketAddress::error()
        }
    }
}

#[no_mangle]
pub extern "C" fn DestroySocket(handle: SocketHandle) -> ErrorBool {
    if !require_initialized() {
        return ErrorBool::Error;
    }

    let Some(fd) = decode_handle(handle) else {
        report(ErrorKind::InvalidSocketHandle);
        return ErrorBool::Error;
    };

    match socket::destroy_socket(context::context(), fd) {
        Ok(()) => ErrorBool::True,
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

#[no_mangle]
pub extern "C" fn SetTCPSocketNaglesAlgorithm(handle: SocketHandle, enabled: bool) -> ErrorBool {
    if !require_initialized() {
        return ErrorBool::Error;
    }

    let Some(fd) = decode_handle(handle) else {
        report(ErrorKind::InvalidSocketHandle);
        return ErrorBool::Error;
    };

    match socket::set_tcp_nagles_algorithm(context::context(), fd, enabled) {
        Ok(()) => ErrorBool::True,
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

#[no_mangle]
pub extern "C" fn SetSocketDestructionTimeout(
    handle: SocketHandle,
    enabled: bool,
    seconds: u16,
) -> ErrorBool {
    if !require_initialized() {
        return ErrorBool::Error;
    }

    let Some(fd) = decode_handle(handle) else {
        report(ErrorKind::InvalidSocketHandle);
        return ErrorBool::Error;
    };

    let linger = LingerOption { enabled, seconds };
    match socket::set_socket_destruction_timeout(context::context(), fd, linger) {
        Ok(()) => ErrorBool::True,
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

#[no_mangle]
pub extern "C" fn SetSocketBroadcast(handle: SocketHandle, enabled: bool) -> ErrorBool {
    if !require_initialized() {
        return ErrorBool::Error;
    }

    let Some(fd) = decode_handle(handle) else {
        report(ErrorKind::InvalidSocketHandle);
        return ErrorBool::Error;
    };

    match socket::set_socket_broadcast(context::context(), fd, enabled) {
        Ok(()) => ErrorBool::True,
        Err(kind) => {
            report(kind);
            ErrorBool::Error
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
//// Byte order & address classification (spec §1's "mechanical" shims)

#[no_mangle]
pub extern "C" fn HostToNetworkBO_16(v: u16) -> u16 {
    crate::byteorder::host_to_network_16(v)
}
#[no_mangle]
pub extern "C" fn NetworkToHostBO_16(v: u16) -> u16 {
    crate::byteorder::network_to_host_16(v)
}
#[no_mangle]
pub extern "C" fn HostToNetworkBO_32(v: u32) -> u32 {
    crate::byteorder::host_to_network_32(v)
}
#[no_mangle]
pub extern "C" fn NetworkToHostBO_32(v: u32) -> u32 {
    crate::byteorder::network_to_host_32(v)
}
#[no_mangle]
pub extern "C" fn HostToNetworkBO_64(v: u64) -> u64 {
    crate::byteorder::host_to_network_64(v)
}
#[no_mangle]
pub extern "C" fn NetworkToHostBO_64(v: u64) -> u64 {
    crate::byteorder::network_to_host_64(v)
}

#[no_mangle]
pub extern "C" fn IsZeroV4(addr: IPv4Address) -> bool {
    addr.is_zero()
}
#[no_mangle]
pub extern "C" fn IsLoopbackV4(addr: IPv4Address) -> bool {
    addr.is_loopback()
}
#[no_mangle]
pub extern "C" fn IsLinkLocalV4(addr: IPv4Address) -> bool {
    addr.is_link_local()
}
#[no_mangle]
pub extern "C" fn IsPrivateV4(addr: IPv4Address) -> bool {
    addr.is_private()
}

#[no_mangle]
pub extern "C" fn IsZeroV6(addr: IPv6Address) -> bool {
    addr.is_zero()
}
#[no_mangle]
pub extern "C" fn IsLoopbackV6(addr: IPv6Address) -> bool {
    addr.is_loopback()
}
#[no_mangle]
pub extern "C" fn IsLinkLocalV6(addr: IPv6Address) -> bool {
    addr.is_link_local()
}
#[no_mangle]
pub extern "C" fn IsPrivateV6(addr: IPv6Address) -> bool {
    addr.is_private()
}
#[no_mangle]
pub extern "C" fn IsLoopbackV6InNetworkBO(addr: IPv6Address) -> bool {
    addr.is_loopback_in_network_bo()
}
#[no_mangle]
pub extern "C" fn IsLinkLocalV6InNetworkBO(addr: IPv6Address) -> bool {
    addr.is_link_local_in_network_bo()
}
#[no_mangle]
pub extern "C" fn IsPrivateV6InNetworkBO(addr: IPv6Address) -> bool {
    addr.is_private_in_network_bo()
}

////////////////////////////////////////////////////////////////////////////////
//// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    // The functions under test all go through the single process-wide
    // context, so the whole lifecycle must be exercised by one test,
    // serialized against every other test in this module.
    static GLOBAL_CONTEXT_LOCK: Mutex<()> = Mutex::new(());

    static LAST_KIND: AtomicI32 = AtomicI32::new(-1);

    extern "C" fn record(kind: ErrorKind, _platform_code: i32, _ctx: *mut c_void) {
        LAST_KIND.store(kind as i32, Ordering::SeqCst);
    }

    #[test]
    fn s1_s2_s3_full_lifecycle() {
        let _guard = GLOBAL_CONTEXT_LOCK.lock().unwrap();

        assert_eq!(
            SetErrorOccuredCallback(Some(record), std::ptr::null_mut()),
            ErrorBool::True
        );
        assert_eq!(LAST_KIND.load(Ordering::SeqCst), ErrorKind::Success as i32);

        assert_eq!(Initialize(), ErrorBool::True);
        assert_eq!(Initialize(), ErrorBool::Error);
        assert_eq!(LAST_KIND.load(Ordering::SeqCst), ErrorKind::IsAlreadyInitialized as i32);

        let addr = IPv4Address::from(Ipv4Addr::LOCALHOST);
        let mut port: u16 = 0;
        let handle = unsafe { CreateIPv4UDPSocket(addr, &mut port) };
        assert_ne!(handle, 0);
        assert!(socket::EPHEMERAL_PORTS.contains(&port));

        let mut listen_port: u16 = 0;
        let listener = unsafe { CreateListeningIPv4TCPSocket(addr, &mut listen_port, 4) };
        assert_ne!(listener, 0);

        let mut accepted: SocketHandle = 99;
        assert_eq!(unsafe { AcceptNewConnection(listener, &mut accepted) }, ErrorBool::True);
        assert_eq!(accepted, 0);

        assert_eq!(DestroySocket(handle), ErrorBool::True);
        assert_eq!(DestroySocket(listener), ErrorBool::True);
        assert_eq!(DestroySocket(handle), ErrorBool::Error);

        assert_eq!(Shutdown(), ErrorBool::True);
        assert_eq!(Shutdown(), ErrorBool::Error);
    }

    #[test]
    fn operations_before_initialize_are_rejected() {
        let _guard = GLOBAL_CONTEXT_LOCK.lock().unwrap();
        assert_eq!(DestroySocket(424242), ErrorBool::Error);
        assert_eq!(LAST_KIND.load(Ordering::SeqCst), ErrorKind::IsNotInitialized as i32);
        assert_eq!(
            unsafe { CreateIPv4UDPSocket(IPv4Address::from(Ipv4Addr::LOCALHOST), &mut 0) },
            0
        );
        assert_eq!(LAST_KIND.load(Ordering::SeqCst), ErrorKind::IsNotInitialized as i32);
    }

    #[test]
    fn null_out_params_are_rejected() {
        let _guard = GLOBAL_CONTEXT_LOCK.lock().unwrap();
        assert_eq!(Initialize(), ErrorBool::True);

        assert_eq!(
            unsafe { CreateIPv4UDPSocket(IPv4Address::from(Ipv4Addr::LOCALHOST), std::ptr::null_mut()) },
            0
        );
        assert_eq!(
            unsafe { GetNetworkIPAddressesArray(std::ptr::null_mut(), std::ptr::null_mut()) },
            ErrorBool::Error
        );

        assert_eq!(Shutdown(), ErrorBool::True);
    }

    #[test]
    fn zero_address_is_rejected() {
        let _guard = GLOBAL_CONTEXT_LOCK.lock().unwrap();
        assert_eq!(Initialize(), ErrorBool::True);

        assert_eq!(
            unsafe { CreateIPv4UDPSocket(IPv4Address::ZERO, &mut 0) },
            0
        );
        assert_eq!(LAST_KIND.load(Ordering::SeqCst), ErrorKind::InvalidIPAddress as i32);

        assert_eq!(Shutdown(), ErrorBool::True);
    }

    #[test]
    fn unknown_handle_is_invalid_everywhere() {
        let _guard = GLOBAL_CONTEXT_LOCK.lock().unwrap();
        assert_eq!(Initialize(), ErrorBool::True);

        assert_eq!(DestroySocket(424242), ErrorBool::Error);
        assert_eq!(SetTCPSocketNaglesAlgorithm(424242, true), ErrorBool::Error);
        assert_eq!(SetSocketBroadcast(424242, true), ErrorBool::Error);

        assert_eq!(Shutdown(), ErrorBool::True);
    }

    #[test]
    fn s6_byte_order_known_value() {
        let networked = HostToNetworkBO_16(0x1234);
        if cfg!(target_endian = "little") {
            assert_eq!(networked, 0x3412);
        } else {
            assert_eq!(networked, 0x1234);
        }
        assert_eq!(NetworkToHostBO_16(networked), 0x1234);
    }

    #[test]
    fn s5_address_preference() {
        let _guard = GLOBAL_CONTEXT_LOCK.lock().unwrap();
        assert_eq!(Initialize(), ErrorBool::True);

        let v4 = IPv4Address::from("192.168.1.10".parse::<Ipv4Addr>().unwrap());
        let v6: IPv6Address = "2001:db8::1"
            .parse::<std::net::Ipv6Addr>()
            .unwrap()
            .into();
        assert_eq!(IsIPv4AddressPreferred(v4, v6.to_network_bo()), ErrorBool::True);

        assert_eq!(Shutdown(), ErrorBool::True);
    }
}
