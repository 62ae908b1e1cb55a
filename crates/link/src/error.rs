//! Typed error types for the link manager.

use std::io;

/// Failures while establishing an RFCOMM link.
///
/// A failed connect never changes the manager's state and never installs a
/// resource, so the caller is always free to retry.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The device address string could not be parsed as a `BD_ADDR`.
    #[error("invalid device address: {0}")]
    InvalidAddress(String),

    /// The socket connect / RFCOMM handshake failed.
    #[error("connection failed: {addr}")]
    IoFailure {
        /// The device address that was attempted.
        addr: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The socket connected but the duplex stream could not be brought up.
    ///
    /// The historical implementation logged and swallowed this condition,
    /// leaving a half-broken resource installed. Here the socket is closed,
    /// nothing is installed, and the failure is surfaced.
    #[error("stream unavailable after connect: {addr}")]
    StreamUnavailable {
        /// The device address that was attempted.
        addr: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

impl ConnectError {
    /// Returns `true` if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConnectError::IoFailure { .. } | ConnectError::StreamUnavailable { .. }
        )
    }
}

/// Failures while transferring bytes over an established link.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The byte transfer failed on an assumed-live resource.
    ///
    /// The resource is left installed; whether to disconnect and redial is
    /// the caller's call. See [`LinkManager::write`](crate::LinkManager::write)
    /// for the full contract.
    #[error("write failed: {0}")]
    IoFailure(#[source] io::Error),
}

impl WriteError {
    /// Returns `true` if this error is transient and worth retrying.
    ///
    /// A broken RFCOMM stream rarely recovers without a redial, so this only
    /// reports `true` for interruption/timeout kinds.
    pub fn is_retryable(&self) -> bool {
        let WriteError::IoFailure(source) = self;
        matches!(
            source.kind(),
            io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
        )
    }
}
