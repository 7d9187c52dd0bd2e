//! Portable error taxonomy and the one-translator-per-host-operation design.
//!
//! Every failure of a platform networking call is converted into exactly one
//! `(ErrorKind, platform_code)` pair and handed to the registered callback
//! (installed and invoked from `context.rs`, which owns the callback slot).

use std::sync::atomic::{AtomicI32, Ordering};

use crate::errno::PosixError;

/// Platform code of the most recent `UnexpectedSystemError` translation.
///
/// The library is explicitly single-threaded (see `context.rs`), so a
/// process-wide slot is enough: `src/ffi.rs` reads it immediately after an
/// internal call returns `Err(ErrorKind::UnexpectedSystemError)`, before
/// anything else can overwrite it, and forwards it as the callback's
/// `platform_code` argument (spec §7).
static LAST_UNEXPECTED_PLATFORM_CODE: AtomicI32 = AtomicI32::new(0);

/// Returns the raw platform code set by the translation that most recently
/// fell back to `UnexpectedSystemError`. Meaningless otherwise.
pub fn last_unexpected_platform_code() -> i32 {
    LAST_UNEXPECTED_PLATFORM_CODE.load(Ordering::Relaxed)
}

////////////////////////////////////////////////////////////////////////////////
//// Structures

/// Portable, frozen error taxonomy (spec §7). Discriminants are frozen at
/// the order in which they were introduced; the first revision of this
/// library left them as TODO, which is an open question resolved here
/// rather than left to the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(i32)]
pub enum ErrorKind {
    Success = 0,
    UnexpectedSystemError,
    NotEnoughMemory,
    SystemSocketLimitIsReached,
    AllDynamicPortsAreTaken,
    PassedPointerIsNull,
    InvalidIPAddress,
    PortNumberIsInvalid,
    InvalidSocketHandle,
    UnsupportedSocketOption,
    IPv4IsNotSupported,
    IPv6IsNotSupported,
    IPv4TCPIsNotSupported,
    IPv4UDPIsNotSupported,
    IPv6TCPIsNotSupported,
    IPv6UDPIsNotSupported,
    UnavailableIPAddress,
    SocketAddressIsTaken,
    CannotReachNetwork,
    CannotReachAnotherHost,
    AnotherHostRejectedConnection,
    CannotEstablishConnection,
    SocketIsAlreadyConnectedOrConnecting,
    SocketIsAlreadyInListeningMode,
    SocketDoesNotSupportListeningMode,
    SocketMustBeInListeningMode,
    SocketMustBeConnected,
    PeerHasDifferentSocketAddress,
    AnotherHostUsesIncompatibleSocketAddress,
    IsAlreadyInitialized,
    IsNotInitialized,
    NotSupportedMachine,
    NetworkSubsystemIsUnavailable,
    NetworkSubsystemFailed,
    TooManyApplicationsAreUsingSystemLibrary,
    ServiceProviderFailed,
}

impl std::error::Error for ErrorKind {}

/// The originating host operation a translator was invoked on behalf of,
/// matching spec §4.3's per-operation translator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    Teardown,
    ProtocolEnumeration,
    AdapterEnumeration,
    Socket,
    Bind,
    GetSockName,
    GetPeerName,
    Listen,
    Accept,
    Connect,
    CloseSocket,
    SetSockOpt,
    GetSockOpt,
}

////////////////////////////////////////////////////////////////////////////////
//// Functions

/// Maps `errno` onto the portable taxonomy for the given originating
/// operation. Unmapped codes become `UnexpectedSystemError`, preserving the
/// raw code in the callback's second argument (the caller does that; this
/// function only picks the `ErrorKind`).
pub fn translate(op: Operation, err: PosixError) -> ErrorKind {
    use ErrorKind::*;
    use PosixError::*;

    match (op, err) {
        (Operation::Initialize, ENOMEM) => NotEnoughMemory,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Initialize, EPROTONOSUPPORT) => NetworkSubsystemIsUnavailable,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Initialize, EUSERS) => TooManyApplicationsAreUsingSystemLibrary,

        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Teardown, ENETDOWN) => NetworkSubsystemFailed,

        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Socket, EAFNOSUPPORT) => IPv4IsNotSupported,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Socket, EPROTONOSUPPORT) => IPv4TCPIsNotSupported,
        (Operation::Socket, EMFILE) | (Operation::Socket, ENFILE) => {
            SystemSocketLimitIsReached
        }
        (Operation::Socket, ENOMEM) => NotEnoughMemory,
        (Operation::Socket, EINVAL) => PassedPointerIsNull,

        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Bind, EADDRNOTAVAIL) => UnavailableIPAddress,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Bind, EADDRINUSE) => SocketAddressIsTaken,
        (Operation::Bind, EACCES) => SocketAddressIsTaken,
        (Operation::Bind, ENOMEM) => AllDynamicPortsAreTaken,

        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Listen, EOPNOTSUPP) => SocketDoesNotSupportListeningMode,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Listen, EISCONN) => SocketIsAlreadyConnectedOrConnecting,

        (Operation::Accept, EINVAL) => SocketMustBeInListeningMode,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Accept, EOPNOTSUPP) => SocketMustBeInListeningMode,

        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Connect, ENETUNREACH) => CannotReachNetwork,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Connect, EHOSTUNREACH) => CannotReachAnotherHost,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Connect, ECONNREFUSED) => AnotherHostRejectedConnection,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Connect, ETIMEDOUT) => CannotEstablishConnection,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Connect, EALREADY) => SocketIsAlreadyConnectedOrConnecting,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::Connect, EISCONN) => SocketIsAlreadyConnectedOrConnecting,

        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::GetPeerName, ENOTCONN) => SocketMustBeConnected,

        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::SetSockOpt, ENOPROTOOPT) => UnsupportedSocketOption,
        (Operation::SetSockOpt, EINVAL) => UnsupportedSocketOption,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (Operation::GetSockOpt, ENOPROTOOPT) => UnsupportedSocketOption,
        (Operation::GetSockOpt, EINVAL) => UnsupportedSocketOption,

        (Operation::ProtocolEnumeration, ENOMEM) => NotEnoughMemory,
        (Operation::AdapterEnumeration, ENOMEM) => NotEnoughMemory,

        (_, EBADF) => InvalidSocketHandle,
        #[cfg(all(target_env = "gnu", target_arch = "x86_64"))]
        (_, ENOTSOCK) => InvalidSocketHandle,

        _ => {
            log::warn!(
                "{op:?} translator saw unmapped errno {err:?} ({}), reporting UnexpectedSystemError",
                err as i32 as i64
            );
            LAST_UNEXPECTED_PLATFORM_CODE.store(err as i32, Ordering::Relaxed);
            UnexpectedSystemError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_code_becomes_unexpected_system_error() {
        assert_eq!(translate(Operation::Initialize, PosixError::EDOM), ErrorKind::UnexpectedSystemError);
    }

    #[test]
    fn out_of_memory_maps_across_operations() {
        assert_eq!(translate(Operation::Initialize, PosixError::ENOMEM), ErrorKind::NotEnoughMemory);
        assert_eq!(translate(Operation::Socket, PosixError::ENOMEM), ErrorKind::NotEnoughMemory);
    }
}
