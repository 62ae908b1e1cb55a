//! Bluetooth device address parsing.
//!
//! Handles the canonical colon-separated form peripheral vendors print on
//! their labels: `AA:BB:CC:DD:EE:FF` (case-insensitive).

use std::fmt;
use std::str::FromStr;

use crate::ConnectError;

/// A 48-bit Bluetooth device address (BD_ADDR).
///
/// Stored in display order (most significant octet first). The kernel's
/// `sockaddr_rc` wants the reversed byte order; use
/// [`to_bluez_bytes`](Self::to_bluez_bytes) for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct BdAddr([u8; 6]);

impl BdAddr {
    /// Construct from octets in display order (`AA:BB:...` left to right).
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Octets in display order.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Octets in BlueZ `bdaddr_t` order (least significant first), as the
    /// kernel expects them inside `sockaddr_rc`.
    pub fn to_bluez_bytes(&self) -> [u8; 6] {
        let mut b = self.0;
        b.reverse();
        b
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for BdAddr {
    type Err = ConnectError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(ConnectError::InvalidAddress(
                "device address is empty".into(),
            ));
        }

        let mut octets = [0u8; 6];
        let mut parts = input.split(':');
        for slot in &mut octets {
            let part = parts
                .next()
                .ok_or_else(|| ConnectError::InvalidAddress(input.to_string()))?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ConnectError::InvalidAddress(input.to_string()));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| ConnectError::InvalidAddress(input.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ConnectError::InvalidAddress(input.to_string()));
        }

        Ok(Self(octets))
    }
}

impl From<BdAddr> for String {
    fn from(addr: BdAddr) -> Self {
        addr.to_string()
    }
}

impl TryFrom<String> for BdAddr {
    type Error = ConnectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
