/// Default time (in timer ticks, i.e. microseconds) to wait for the data
/// line to change state.
///
/// Handshake pulses are nominally 80us and a `1` bit is ~70us, so this
/// leaves little margin. Widen it with [`Config::with_timeout_us`] if reads
/// time out on real hardware.
pub const DEFAULT_TIMEOUT_US: u32 = 100;

/// Calibration settings for a [`Dht11`](crate::Dht11) driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum ticks to wait for each line transition.
    ///
    /// A value of `0` never polls the line, so every read times out.
    pub timeout_us: u32,
}

impl Config {
    /// Config with [`DEFAULT_TIMEOUT_US`].
    pub const fn new() -> Self {
        Self {
            timeout_us: DEFAULT_TIMEOUT_US,
        }
    }

    /// Returns a copy of this config with a different wait timeout.
    ///
    /// The timeout is raised to at least one tick.
    pub const fn with_timeout_us(self, timeout_us: u32) -> Self {
        let timeout_us = if timeout_us == 0 { 1 } else { timeout_us };
        Self { timeout_us }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
