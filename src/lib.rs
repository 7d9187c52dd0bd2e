pub mod address;
pub mod buffer;
pub mod byteorder;
pub mod context;
pub mod errno;
pub mod error;
pub mod ffi;
pub mod iface;
pub mod lifecycle;
pub mod socket;
