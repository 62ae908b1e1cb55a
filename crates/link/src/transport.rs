//! Socket-backed implementation of the [`Transport`] primitives.
//!
//! [`SocketTransport`] wraps a connected `socket2::Socket` (RFCOMM in
//! production, but any connected stream socket works, which is what the
//! tests use via `Socket::pair`).

use std::io::{self, Read};
use std::net::Shutdown;

use socket2::Socket;

use crate::Transport;

#[cfg(any(target_os = "linux", target_os = "android"))]
const SEND_FLAGS: i32 = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SEND_FLAGS: i32 = 0;

/// A connected duplex stream socket.
///
/// All methods take `&self`; concurrent sends are serialized by the kernel's
/// own socket locking, nothing more. [`close`](Transport::close) shuts the
/// socket down in both directions but the file descriptor itself is only
/// released on drop, so a racing writer holding a handle can never touch a
/// reused fd — it just gets `EPIPE`.
pub struct SocketTransport {
    sock: Socket,
}

impl SocketTransport {
    /// Wrap an already-connected socket.
    pub fn new(sock: Socket) -> Self {
        Self { sock }
    }
}

impl Transport for SocketTransport {
    fn send(&self, data: &[u8]) -> io::Result<()> {
        let mut remaining = data;
        while !remaining.is_empty() {
            match self.sock.send_with_flags(remaining, SEND_FLAGS) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => remaining = &remaining[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.sock).read(buf)
    }

    fn flush(&self) -> io::Result<()> {
        // Stream sockets have no userspace buffer to drain; sends above go
        // straight to the kernel. Kept as a primitive so the teardown
        // sequence reads the same across transports.
        Ok(())
    }

    fn shutdown_send(&self) -> io::Result<()> {
        self.sock.shutdown(Shutdown::Write)
    }

    fn shutdown_recv(&self) -> io::Result<()> {
        self.sock.shutdown(Shutdown::Read)
    }

    fn close(&self) -> io::Result<()> {
        self.sock.shutdown(Shutdown::Both)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use socket2::{Domain, Type};

    fn pair() -> (SocketTransport, SocketTransport) {
        let (a, b) = Socket::pair(Domain::UNIX, Type::STREAM, None).unwrap();
        (SocketTransport::new(a), SocketTransport::new(b))
    }

    #[test]
    fn send_recv_round_trip() {
        let (a, b) = pair();
        a.send(&[0x1B, 0x40, 0x0A]).unwrap();
        let mut buf = [0u8; 8];
        let n = b.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x1B, 0x40, 0x0A]);
    }

    #[test]
    fn send_empty_is_ok() {
        let (a, _b) = pair();
        a.send(&[]).unwrap();
    }

    #[test]
    fn shutdown_send_signals_eof_to_peer() {
        let (a, b) = pair();
        a.flush().unwrap();
        a.shutdown_send().unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(b.recv(&mut buf).unwrap(), 0);
    }

    #[test]
    fn send_after_close_errors() {
        let (a, _b) = pair();
        a.close().unwrap();
        assert!(a.send(b"late").is_err());
    }

    #[test]
    fn recv_after_peer_close_returns_zero() {
        let (a, b) = pair();
        drop(a);
        let mut buf = [0u8; 8];
        assert_eq!(b.recv(&mut buf).unwrap(), 0);
    }
}
