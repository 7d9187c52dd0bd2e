//! The single process-wide context: initialization flag, error-callback
//! slot, socket table, and reusable enumeration buffers (spec §5 and §9's
//! "Global mutable state → explicit context" design note).
//!
//! Explicitly **not** thread-safe: every field is mutated without
//! synchronization, matching spec §5's disclaimer. Internal code always goes
//! through [`context()`]; only `src/ffi.rs` and the registration entry point
//! touch the raw callback shape.

use std::cell::UnsafeCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::os::fd::{OwnedFd, RawFd};

use crate::address::NetworkIPAddresses;
use crate::buffer::Buffer;
use crate::error::ErrorKind;

////////////////////////////////////////////////////////////////////////////////
//// Structures

pub type ErrorOccuredCallback =
    extern "C" fn(kind: ErrorKind, platform_code: i32, ctx: *mut c_void);

#[derive(Clone, Copy)]
struct CallbackSlot {
    callback: ErrorOccuredCallback,
    ctx: *mut c_void,
}

/// The library's single piece of process-wide mutable state.
pub struct Context {
    pub initialized: bool,
    callback: Option<CallbackSlot>,
    /// Owns every socket created through the factory, keyed by its raw fd.
    /// `Shutdown` drains this, closing every outstanding socket as a side
    /// effect, matching spec §4.4.
    pub sockets: HashMap<RawFd, OwnedFd>,
    /// Reused across `GetNetworkIPAddressesArray` calls to amortize
    /// allocation (spec §5's "protocol-info scratch buffer").
    pub enumeration_scratch: Buffer,
    /// Process-static enumeration result; a second call invalidates the
    /// previous contents (spec §5).
    pub adapter_addresses: Vec<NetworkIPAddresses>,
}

struct ContextCell(UnsafeCell<Option<Context>>);

// SAFETY: the library declares itself not thread-safe (spec §5); this Sync
// impl only exists so a single `static` can hold the cell. All access still
// goes through the single-threaded discipline the caller is required to
// uphold.
unsafe impl Sync for ContextCell {}

static CONTEXT: ContextCell = ContextCell(UnsafeCell::new(None));

////////////////////////////////////////////////////////////////////////////////
//// Implementations

impl Context {
    pub(crate) fn new() -> Self {
        Self {
            initialized: false,
            callback: None,
            sockets: HashMap::new(),
            enumeration_scratch: Buffer::new(),
            adapter_addresses: Vec::new(),
        }
    }

    /// Validates `callback` by invoking it synchronously once with
    /// `ErrorKind::Success` and `platform_code = 0`, then installs it as the
    /// new sink. A callback that unwinds fails registration instead of being
    /// installed (spec §7: "thrown exceptions from Success propagate out of
    /// SetErrorOccuredCallback only as a configuration failure").
    pub fn set_error_callback(
        &mut self,
        callback: ErrorOccuredCallback,
        ctx: *mut c_void,
    ) -> bool {
        let survived =
            std::panic::catch_unwind(|| callback(ErrorKind::Success, 0, ctx))
                .is_ok();

        if survived {
            self.callback = Some(CallbackSlot { callback, ctx });
        }

        survived
    }

    /// Invokes the registered sink, or the default no-op if none is
    /// installed. Every call site in this crate calls this at most once per
    /// public-function invocation (invariant 9 in spec §8).
    pub fn report_error(&self, kind: ErrorKind, platform_code: i32) {
        if let Some(slot) = self.callback {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
                || (slot.callback)(kind, platform_code, slot.ctx),
            ));
        }
    }

    pub fn insert_socket(&mut self, fd: OwnedFd) -> RawFd {
        use std::os::fd::AsRawFd;
        let raw = fd.as_raw_fd();
        self.sockets.insert(raw, fd);
        raw
    }

    pub fn take_socket(&mut self, raw: RawFd) -> Option<OwnedFd> {
        self.sockets.remove(&raw)
    }

    pub fn socket(&self, raw: RawFd) -> Option<&OwnedFd> {
        self.sockets.get(&raw)
    }
}

/// Accessor for the single process-wide context. See the module doc for the
/// non-thread-safety discipline this relies on.
#[allow(clippy::mut_from_ref)]
pub(crate) fn context() -> &'static mut Context {
    unsafe {
        let slot = &mut *CONTEXT.0.get();
        slot.get_or_insert_with(Context::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    static LAST_KIND: AtomicI32 = AtomicI32::new(-1);

    extern "C" fn record(kind: ErrorKind, _platform_code: i32, _ctx: *mut c_void) {
        LAST_KIND.store(kind as i32, Ordering::SeqCst);
    }

    #[test]
    fn registration_self_tests_with_success() {
        let mut ctx = Context::new();
        assert!(ctx.set_error_callback(record, std::ptr::null_mut()));
        assert_eq!(LAST_KIND.load(Ordering::SeqCst), ErrorKind::Success as i32);
    }

    #[test]
    fn report_error_invokes_installed_callback() {
        let mut ctx = Context::new();
        ctx.set_error_callback(record, std::ptr::null_mut());
        ctx.report_error(ErrorKind::InvalidSocketHandle, 0);
        assert_eq!(LAST_KIND.load(Ordering::SeqCst), ErrorKind::InvalidSocketHandle as i32);
    }

    #[test]
    fn report_error_without_callback_is_a_no_op() {
        let ctx = Context::new();
        ctx.report_error(ErrorKind::NotEnoughMemory, 0);
    }
}
