//! Configuration for the link manager.

use std::time::Duration;

/// Default pause between stream shutdown and socket close during teardown.
///
/// Some receipt-printer firmware needs a moment to finish an in-flight
/// transaction before the RF link drops; closing the socket immediately can
/// leave the link in a bad state until the printer is power-cycled. 100ms is
/// enough for every unit we have seen in the field.
pub const DEFAULT_TEARDOWN_DELAY: Duration = Duration::from_millis(100);

/// Tunables for link setup and teardown.
#[non_exhaustive]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Pause between stream shutdown and socket close during teardown.
    ///
    /// See [`DEFAULT_TEARDOWN_DELAY`]. Set to zero for peripherals that do
    /// not need the grace period.
    pub teardown_delay: Duration,
}

impl LinkConfig {
    /// Replace the teardown delay.
    #[must_use]
    pub fn with_teardown_delay(mut self, delay: Duration) -> Self {
        self.teardown_delay = delay;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            teardown_delay: DEFAULT_TEARDOWN_DELAY,
        }
    }
}
