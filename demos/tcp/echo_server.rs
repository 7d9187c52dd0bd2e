//! Minimal echo server exercising the public C ABI directly, the way a
//! foreign caller would: set the error callback, `Initialize`, create a
//! listening IPv4 TCP socket, poll `AcceptNewConnection`, echo whatever a
//! client sends, then tear down on Ctrl-C.
//!
//! No CLI-parsing dependency; the single optional argument is the bind port.

use std::ffi::c_void;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use sockshare::address::IPv4Address;
use sockshare::context::ErrorOccuredCallback;
use sockshare::error::ErrorKind;
use sockshare::ffi::{
    AcceptNewConnection, CreateListeningIPv4TCPSocket, DestroySocket, ErrorBool, Initialize,
    SetErrorOccuredCallback, Shutdown, SocketHandle,
};

extern "C" fn on_error(kind: ErrorKind, platform_code: i32, _ctx: *mut c_void) {
    if kind != ErrorKind::Success {
        eprintln!("sockshare error: {kind:?} (platform code {platform_code})");
    }
}

fn handle_via_raw_fd(handle: SocketHandle) {
    // The example borrows the accepted descriptor as a std TcpStream for I/O
    // convenience; the library itself only manages socket lifetime, not data
    // transfer (spec §1's "not a data-plane" non-goal).
    let raw_fd = (handle - 1) as std::os::fd::RawFd;
    let mut stream = unsafe { <TcpStream as std::os::fd::FromRawFd>::from_raw_fd(raw_fd) };

    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if stream.write_all(&buf[..n]).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => break,
        }
    }

    // Ownership of the fd returns to the TcpStream's Drop; tell the library
    // its handle is gone too so its socket table stays consistent.
    std::mem::forget(stream);
    DestroySocket(handle);
}

fn main() {
    let port: u16 = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(8888);

    let callback: ErrorOccuredCallback = on_error;
    assert_eq!(
        SetErrorOccuredCallback(Some(callback), std::ptr::null_mut()),
        ErrorBool::True
    );
    assert_eq!(Initialize(), ErrorBool::True);

    let bind_addr = IPv4Address::from(std::net::Ipv4Addr::new(127, 0, 0, 1));
    let mut bound_port = port;
    let listener = unsafe { CreateListeningIPv4TCPSocket(bind_addr, &mut bound_port, 16) };
    assert_ne!(listener, 0, "failed to create listening socket");
    println!("echo server listening on 127.0.0.1:{bound_port}");

    loop {
        let mut accepted: SocketHandle = 0;
        match unsafe { AcceptNewConnection(listener, &mut accepted) } {
            ErrorBool::True if accepted != 0 => {
                println!("accepted connection, handle={accepted}");
                handle_via_raw_fd(accepted);
            }
            ErrorBool::True => thread::sleep(Duration::from_millis(20)),
            _ => break,
        }
    }

    DestroySocket(listener);
    Shutdown();
}
