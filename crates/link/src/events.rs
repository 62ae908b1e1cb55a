//! Advisory notifications emitted by the link manager.
//!
//! Events are fire-and-forget: delivery is best-effort, nothing in the
//! manager waits for an acknowledgement, and a sink must never block.

use crate::BdAddr;

/// Something happened on the managed link.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connect attempt succeeded and the link is live.
    Connected {
        /// The remote device.
        addr: BdAddr,
    },
    /// The link was torn down (explicit disconnect or replacement).
    Disconnected {
        /// The remote device the link was bound to.
        addr: BdAddr,
    },
    /// A connect attempt failed; no link was established.
    ConnectFailed {
        /// The remote device that was attempted.
        addr: BdAddr,
    },
    /// A write on a live link failed. The link is left installed.
    WriteFailed {
        /// The remote device.
        addr: BdAddr,
    },
}

impl LinkEvent {
    /// Human-readable message suitable for surfacing to an end user.
    ///
    /// The failure strings match what the original mobile plugin toasted,
    /// so downstream UI copy keeps working.
    pub fn message(&self) -> String {
        match self {
            LinkEvent::Connected { addr } => format!("Connected to {addr}"),
            LinkEvent::Disconnected { addr } => format!("Disconnected from {addr}"),
            LinkEvent::ConnectFailed { .. } => "Unable to connect device".to_string(),
            LinkEvent::WriteFailed { .. } => {
                "Couldn't send data to the other device".to_string()
            }
        }
    }
}

/// Receives [`LinkEvent`]s from the manager.
///
/// Implementations must return quickly; `notify` is called from whichever
/// caller thread triggered the event, never from a dedicated worker.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Failures are the sink's problem, not the manager's.
    fn notify(&self, event: LinkEvent);
}

/// A sink that discards every event. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: LinkEvent) {}
}

/// A sink backed by an unbounded crossbeam channel.
///
/// Sends never block. If the receiving side has gone away the event is
/// dropped silently, matching the advisory delivery contract.
pub struct ChannelSink {
    tx: crossbeam_channel::Sender<LinkEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver it feeds.
    pub fn new() -> (Self, crossbeam_channel::Receiver<LinkEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn notify(&self, event: LinkEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event receiver dropped; notification discarded");
        }
    }
}
