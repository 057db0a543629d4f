//! Incremental ABI encoder on a hardware up/down counter
//!
//! The counter runs over three revolutions, `[0, 3 * counts)`, and starts in
//! the middle so an index pulse near either end of a revolution never lands
//! on the wrap point. Only the position inside one revolution is reported.

use embedded_hal::{delay::DelayNs, digital::InputPin};

use crate::{error::ConfigError, hal::IndexSignal};

/// Index settle time before the recheck, four NOPs at 168 MHz
pub const INDEX_SETTLE_NS: u32 = 24;

/// Configuration of the incremental encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureConfig {
    /// Counter increments per mechanical revolution (4x the line count)
    pub counts_per_revolution: u32,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            counts_per_revolution: 10_000,
        }
    }
}

impl QuadratureConfig {
    /// Check that the counter range fits in 32 bits
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroCounts`] or [`ConfigError::CountsOverflow`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = self.counts_per_revolution;
        if counts == 0 {
            return Err(ConfigError::ZeroCounts);
        }
        counts
            .checked_mul(3)
            .map(|_| ())
            .ok_or(ConfigError::CountsOverflow(counts))
    }

    /// Highest counter value before wrapping, `3 * counts - 1`
    #[must_use]
    pub fn auto_reload(&self) -> u32 {
        self.counts_per_revolution.saturating_mul(3).saturating_sub(1)
    }

    /// Counter start value, the middle of the range
    #[must_use]
    pub fn initial_count(&self) -> u32 {
        self.counts_per_revolution.saturating_mul(3) / 2
    }

    /// Angle in degrees, `[0, 360)`, of a raw counter value
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn degrees(&self, count: u32) -> f32 {
        let counts = self.counts_per_revolution.max(1);
        let within = count % counts;
        // f64 so counts above 2^24 keep full resolution
        (f64::from(within) * 360.0 / f64::from(counts)) as f32
    }
}

/// Index input with a short settle-and-recheck
///
/// Pulses that are gone after the settle delay are treated as noise.
#[derive(Debug)]
pub struct DebouncedIndex<P, D> {
    pin: P,
    delay: D,
    settle_ns: u32,
}

impl<P, D> DebouncedIndex<P, D>
where
    P: InputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D, settle_ns: u32) -> Self {
        Self {
            pin,
            delay,
            settle_ns,
        }
    }

    /// Release the pin and delay
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P, D> IndexSignal for DebouncedIndex<P, D>
where
    P: InputPin,
    D: DelayNs,
{
    type Error = P::Error;

    fn confirm(&mut self) -> Result<bool, Self::Error> {
        self.delay.delay_ns(self.settle_ns);
        self.pin.is_high()
    }
}
