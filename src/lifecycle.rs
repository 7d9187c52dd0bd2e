//! Process-wide initialization and teardown.
//!
//! On Windows the original source negotiates a Winsock version with
//! `WSAStartup`/`WSACleanup`; POSIX has no equivalent subsystem handshake, so
//! here `Initialize`/`Shutdown` manage only the library's own internal state
//! (see SPEC_FULL.md's platform-target note). `Shutdown` still closes every
//! outstanding socket, matching spec §4.4's "implicitly closes every still-open
//! socket created through the library".

use crate::context::Context;
use crate::error::ErrorKind;

////////////////////////////////////////////////////////////////////////////////
//// Functions

/// Refuses if already initialized. Returns the portable error on failure;
/// `Ok(())` on success.
pub fn initialize(ctx: &mut Context) -> Result<(), ErrorKind> {
    if ctx.initialized {
        return Err(ErrorKind::IsAlreadyInitialized);
    }

    log::debug!("initializing");
    ctx.initialized = true;
    Ok(())
}

/// Refuses if not initialized. Closes every outstanding socket (dropping its
/// `OwnedFd` closes the underlying descriptor) and clears the
/// initialization flag.
pub fn shutdown(ctx: &mut Context) -> Result<(), ErrorKind> {
    if !ctx.initialized {
        return Err(ErrorKind::IsNotInitialized);
    }

    log::debug!("shutting down, closing {} outstanding socket(s)", ctx.sockets.len());
    ctx.sockets.clear();
    ctx.initialized = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn double_initialize_is_rejected() {
        let mut ctx = Context::new();
        assert!(initialize(&mut ctx).is_ok());
        assert_eq!(initialize(&mut ctx), Err(ErrorKind::IsAlreadyInitialized));
        assert!(shutdown(&mut ctx).is_ok());
    }

    #[test]
    fn shutdown_without_init_is_rejected() {
        let mut ctx = Context::new();
        assert_eq!(shutdown(&mut ctx), Err(ErrorKind::IsNotInitialized));
    }

    #[test]
    fn shutdown_clears_outstanding_sockets() {
        let mut ctx = Context::new();
        initialize(&mut ctx).unwrap();
        let udp = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        use std::os::fd::{FromRawFd, IntoRawFd};
        let owned = unsafe { std::os::fd::OwnedFd::from_raw_fd(udp.into_raw_fd()) };
        ctx.insert_socket(owned);
        assert_eq!(ctx.sockets.len(), 1);
        shutdown(&mut ctx).unwrap();
        assert!(ctx.sockets.is_empty());
    }
}
