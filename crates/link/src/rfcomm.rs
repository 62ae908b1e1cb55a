//! RFCOMM dialer for classic Bluetooth serial connections (Linux / BlueZ).
//!
//! Opens an `AF_BLUETOOTH` stream socket with `BTPROTO_RFCOMM` and performs
//! a blocking connect to the peripheral's serial channel. The connect has no
//! timeout at this layer: the kernel's page/supervision timeouts apply and
//! the calling thread is parked for the duration. Callers that need a bound
//! on connect latency must run the dial on their own worker.

use std::io;
use std::mem;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use uuid::Uuid;

use crate::transport::SocketTransport;
use crate::{BdAddr, ConnectError, Dialer};

/// Serial Port Profile service class UUID.
///
/// Every connect targets this well-known service; it is not configurable
/// per call. SDP resolution of the UUID to a channel number is out of scope
/// here — SPP peripherals (receipt printers included) publish the profile on
/// [`DEFAULT_CHANNEL`] essentially without exception.
pub const SPP_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000_1101_0000_1000_8000_0080_5F9B_34FB);

/// RFCOMM channel the Serial Port Profile is conventionally published on.
pub const DEFAULT_CHANNEL: u8 = 1;

/// `BTPROTO_RFCOMM` from `<bluetooth/bluetooth.h>`; not exposed by libc.
const BTPROTO_RFCOMM: i32 = 3;

/// Dials RFCOMM connections on a fixed channel.
#[derive(Debug, Clone)]
pub struct RfcommDialer {
    channel: u8,
}

impl RfcommDialer {
    /// Dialer for an explicit RFCOMM channel.
    pub fn new(channel: u8) -> Self {
        Self { channel }
    }

    /// Dialer for the standard SPP channel (see [`DEFAULT_CHANNEL`]).
    pub fn spp() -> Self {
        Self::new(DEFAULT_CHANNEL)
    }

    /// The RFCOMM channel this dialer targets.
    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl Dialer for RfcommDialer {
    type Stream = SocketTransport;

    fn dial(&self, addr: &BdAddr) -> Result<SocketTransport, ConnectError> {
        let sock = Socket::new(
            Domain::from(libc::AF_BLUETOOTH),
            Type::STREAM,
            Some(Protocol::from(BTPROTO_RFCOMM)),
        )
        .map_err(|e| ConnectError::IoFailure {
            addr: addr.to_string(),
            source: e,
        })?;

        // Blocking; returns only on an established link or an error.
        sock.connect(&rfcomm_sockaddr(addr, self.channel))
            .map_err(|e| ConnectError::IoFailure {
                addr: addr.to_string(),
                source: e,
            })?;

        // Dropping `sock` on the error path closes the half-open socket, so
        // a failed bring-up never leaks a live link.
        bring_up(&sock).map_err(|e| ConnectError::StreamUnavailable {
            addr: addr.to_string(),
            source: e,
        })?;

        Ok(SocketTransport::new(sock))
    }
}

/// Verify the duplex stream is actually usable after connect.
///
/// The historical implementation swallowed failures at this stage and
/// installed the half-broken link anyway; here they surface as
/// [`ConnectError::StreamUnavailable`].
fn bring_up(sock: &Socket) -> io::Result<()> {
    sock.peer_addr()?;
    sock.set_nonblocking(false)?;
    Ok(())
}

/// Build a `sockaddr_rc` for the given device and channel.
fn rfcomm_sockaddr(addr: &BdAddr, channel: u8) -> SockAddr {
    // struct sockaddr_rc from <bluetooth/rfcomm.h>; libc does not carry the
    // Bluetooth sockaddr types.
    #[repr(C)]
    struct SockaddrRc {
        rc_family: libc::sa_family_t,
        rc_bdaddr: [u8; 6],
        rc_channel: u8,
    }

    let mut storage: libc::sockaddr_storage = unsafe { mem::zeroed() };
    let rc = (&raw mut storage).cast::<SockaddrRc>();
    // SAFETY: sockaddr_storage is sized and aligned for any sockaddr type,
    // and was zeroed above.
    unsafe {
        (*rc).rc_family = libc::AF_BLUETOOTH as libc::sa_family_t;
        (*rc).rc_bdaddr = addr.to_bluez_bytes();
        (*rc).rc_channel = channel;
    }
    // SAFETY: storage holds a valid sockaddr_rc of exactly this length.
    unsafe { SockAddr::new(storage, mem::size_of::<SockaddrRc>() as libc::socklen_t) }
}
