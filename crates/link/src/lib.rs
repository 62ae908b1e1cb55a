//! btspp link — connection lifecycle and write serialization for Bluetooth
//! SPP (RFCOMM) receipt printers.
//!
//! The core is [`LinkManager`]: it owns at most one live link to a remote
//! peripheral, serializes state transitions behind a single lock, and keeps
//! every blocking operation (dial, transfer, teardown delay) outside that
//! lock. The API is synchronous (`std` blocking sockets), with no async
//! runtime required; callers wanting non-blocking behavior run the calls on
//! their own worker.
//!
//! Payload bytes are opaque — receipt formatting and printer command
//! dialects (ESC/POS and friends) live with the caller.

mod addr;
mod config;
mod error;
mod events;
mod manager;
#[cfg(all(feature = "rfcomm", target_os = "linux"))]
mod rfcomm;
#[cfg(feature = "rfcomm")]
mod transport;

pub use addr::BdAddr;
pub use config::{DEFAULT_TEARDOWN_DELAY, LinkConfig};
pub use error::{ConnectError, WriteError};
pub use events::{ChannelSink, EventSink, LinkEvent, NullSink};
pub use manager::{LinkManager, LinkState};
#[cfg(all(feature = "rfcomm", target_os = "linux"))]
pub use rfcomm::{DEFAULT_CHANNEL, RfcommDialer, SPP_SERVICE_UUID};
#[cfg(feature = "rfcomm")]
pub use transport::SocketTransport;

use std::io;

// ── Traits ──────────────────────────────────────────────────────────────

/// Raw primitives of one live duplex stream. All transports implement this.
///
/// Methods take `&self`: concurrent sends are serialized only by the
/// underlying stream's own thread safety, never by this trait. No retry and
/// no error interpretation happen here — policy lives in [`LinkManager`].
pub trait Transport: Send + Sync {
    /// Transfer the whole buffer in one blocking write.
    fn send(&self, data: &[u8]) -> io::Result<()>;

    /// Read available bytes into `buf`; `Ok(0)` means end of stream.
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Push any buffered output toward the peer.
    fn flush(&self) -> io::Result<()>;

    /// Shut down the outgoing half of the stream.
    fn shutdown_send(&self) -> io::Result<()>;

    /// Shut down the incoming half of the stream.
    fn shutdown_recv(&self) -> io::Result<()>;

    /// Close the underlying socket. After this, sends fail and receives
    /// report end of stream; the call must be safe to race with them.
    fn close(&self) -> io::Result<()>;
}

/// Establishes new links. The blocking-connect seam of the crate.
pub trait Dialer: Send + Sync {
    /// The stream type produced by a successful dial.
    type Stream: Transport;

    /// Perform one blocking connect attempt to `addr`.
    ///
    /// Returns only on an established, usable stream or an error. The
    /// duration is unbounded and platform-defined; no timeout is enforced
    /// at this layer.
    fn dial(&self, addr: &BdAddr) -> Result<Self::Stream, ConnectError>;
}
