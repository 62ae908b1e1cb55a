//! The connection manager: lifecycle state machine and write serialization.
//!
//! [`LinkManager`] owns zero-or-one live link at a time. One mutex guards
//! the `(state, link)` pair; it is held only for state reads and handle
//! swaps, never across a dial, a byte transfer, or the teardown delay —
//! blocking I/O on one caller must not stall state reads on another.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::events::{EventSink, LinkEvent, NullSink};
use crate::{BdAddr, ConnectError, Dialer, LinkConfig, Transport, WriteError};

/// Lifecycle state of the managed link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No link and no connect in progress.
    Idle,
    /// A blocking connect attempt is in flight.
    Connecting,
    /// A live link is installed and writable.
    Connected,
}

/// One live binding to a remote device: address plus duplex stream.
///
/// Exclusively owned by the manager; callers never see it, so the raw
/// stream cannot be touched without going through the manager's locking.
struct Link<T> {
    remote: BdAddr,
    stream: T,
}

struct Inner<T> {
    state: LinkState,
    link: Option<Arc<Link<T>>>,
}

/// Manages a single logical RFCOMM connection to a remote peripheral.
///
/// All operations are callable from any thread. A `write` issued strictly
/// after a successful `connect` observes the new link; a `write` racing a
/// `disconnect` either transfers on the old link or observes `Idle` and
/// no-ops — which one is not guaranteed. Callers needing stronger ordering
/// across threads must serialize connect/write/disconnect themselves; there
/// is no internal write queue.
pub struct LinkManager<D: Dialer> {
    dialer: D,
    config: LinkConfig,
    sink: Box<dyn EventSink>,
    inner: Mutex<Inner<D::Stream>>,
}

impl<D: Dialer> LinkManager<D> {
    /// Create a manager with default configuration and no event sink.
    pub fn new(dialer: D) -> Self {
        Self::with_config(dialer, LinkConfig::default())
    }

    /// Create a manager with explicit configuration.
    pub fn with_config(dialer: D, config: LinkConfig) -> Self {
        Self {
            dialer,
            config,
            sink: Box::new(NullSink),
            inner: Mutex::new(Inner {
                state: LinkState::Idle,
                link: None,
            }),
        }
    }

    /// Attach a sink for advisory [`LinkEvent`]s.
    #[must_use]
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Current lifecycle state. Pure read, no side effects.
    pub fn state(&self) -> LinkState {
        self.inner.lock().state
    }

    /// Establish a link to `addr`, replacing any existing one.
    ///
    /// An existing link is fully torn down (the whole [`disconnect`]
    /// sequence, teardown delay included) before the new dial begins — a
    /// reconnect discards the old link, it never layers a second one.
    ///
    /// The dial itself is **blocking** and unbounded; the calling thread is
    /// parked until the handshake completes or fails. On failure the state
    /// is left as it was before the attempt (normally `Idle`) and nothing
    /// is installed, so the caller may simply retry.
    ///
    /// [`disconnect`]: Self::disconnect
    pub fn connect(&self, addr: &str) -> Result<(), ConnectError> {
        let addr: BdAddr = addr.parse()?;

        let old = {
            let mut inner = self.inner.lock();
            inner.state = LinkState::Connecting;
            inner.link.take()
        };
        if let Some(old) = old {
            debug!(new = %addr, old = %old.remote, "replacing existing link");
            self.teardown(&old);
            self.sink.notify(LinkEvent::Disconnected { addr: old.remote });
        }

        match self.dialer.dial(&addr) {
            Ok(stream) => {
                let link = Arc::new(Link {
                    remote: addr,
                    stream,
                });
                let displaced = {
                    let mut inner = self.inner.lock();
                    let displaced = inner.link.replace(Arc::clone(&link));
                    inner.state = LinkState::Connected;
                    displaced
                };
                // A concurrent connect can have installed its own link while
                // we were dialing without the lock. At most one may live.
                if let Some(displaced) = displaced {
                    self.teardown(&displaced);
                    self.sink.notify(LinkEvent::Disconnected {
                        addr: displaced.remote,
                    });
                }
                info!(%addr, "link established");
                self.sink.notify(LinkEvent::Connected { addr });
                Ok(())
            }
            Err(err) => {
                {
                    let mut inner = self.inner.lock();
                    // Only revert if no racing connect has since succeeded.
                    if inner.link.is_none() {
                        inner.state = LinkState::Idle;
                    }
                }
                warn!(%addr, error = %err, "connect failed");
                self.sink.notify(LinkEvent::ConnectFailed { addr });
                Err(err)
            }
        }
    }

    /// Transfer `bytes` over the live link.
    ///
    /// While not connected this is a **silent no-op** returning `Ok(())` —
    /// bytes are dropped without signaling the caller, a contract inherited
    /// from the original implementation. Check [`state`](Self::state) first
    /// if you need feedback.
    ///
    /// The transfer is a single blocking full write outside the state lock;
    /// there is no partial-write retry. On failure the error is returned
    /// *and* a [`LinkEvent::WriteFailed`] is emitted, but the link is left
    /// installed — whether to disconnect and redial is the caller's policy.
    pub fn write(&self, bytes: &[u8]) -> Result<(), WriteError> {
        let link = {
            let inner = self.inner.lock();
            if inner.state != LinkState::Connected {
                debug!(len = bytes.len(), "write while not connected; dropped");
                return Ok(());
            }
            let Some(link) = &inner.link else {
                return Ok(());
            };
            Arc::clone(link)
        };

        match link.stream.send(bytes) {
            Ok(()) => Ok(()),
            Err(source) => {
                warn!(addr = %link.remote, error = %source, "write failed");
                self.sink.notify(LinkEvent::WriteFailed { addr: link.remote });
                Err(WriteError::IoFailure(source))
            }
        }
    }

    /// Tear down the live link, if any. Idempotent, never fails.
    pub fn disconnect(&self) {
        let old = {
            let mut inner = self.inner.lock();
            inner.state = LinkState::Idle;
            inner.link.take()
        };
        let Some(link) = old else {
            debug!("disconnect with no live link");
            return;
        };
        self.teardown(&link);
        self.sink.notify(LinkEvent::Disconnected { addr: link.remote });
    }

    /// Ordered best-effort teardown of one link.
    ///
    /// Flush, then shut the send side, then the receive side, then pause
    /// for the configured delay before closing the socket. The pause lets
    /// the peripheral commit an in-flight transaction before the RF link
    /// drops; skipping it leaves some firmware in a state that needs a
    /// power cycle. Individual step failures are logged, never propagated.
    fn teardown(&self, link: &Link<D::Stream>) {
        let addr = link.remote;
        if let Err(e) = link.stream.flush() {
            warn!(%addr, error = %e, "flush during teardown failed");
        }
        if let Err(e) = link.stream.shutdown_send() {
            warn!(%addr, error = %e, "send-side shutdown failed");
        }
        if let Err(e) = link.stream.shutdown_recv() {
            warn!(%addr, error = %e, "receive-side shutdown failed");
        }
        if !self.config.teardown_delay.is_zero() {
            thread::sleep(self.config.teardown_delay);
        }
        if let Err(e) = link.stream.close() {
            warn!(%addr, error = %e, "socket close failed");
        }
        debug!(%addr, "link torn down");
    }
}
