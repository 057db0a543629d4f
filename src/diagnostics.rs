//! Fault accounting and the values shared with the control loop
//!
//! The sampling side is the only writer of every cell here and the control
//! loop only reads, so each value is a single atomic word written with a
//! plain store. A reader sees either the newest complete value or an older
//! one, never a torn write, and the sampling interrupt never blocks.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::utils;

/// An `f32` stored in one atomic word
#[derive(Debug, Default)]
pub struct AngleCell(AtomicU32);

impl AngleCell {
    /// Create a cell holding `value`
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    /// Latest stored value
    #[must_use]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Publish a new value
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Fault counter plus an exponentially filtered fault rate in `[0, 1]`
///
/// Every sample moves the rate towards 1.0 on a fault and towards 0.0
/// otherwise. An external supervisor polls the rate and trips the motor if it
/// stays high.
#[derive(Debug)]
pub struct ErrorRateTracker {
    count: AtomicU32,
    rate: AngleCell,
    time_constant: f32,
}

impl ErrorRateTracker {
    /// Create a tracker whose rate filter uses `time_constant` as its gain
    #[must_use]
    pub const fn new(time_constant: f32) -> Self {
        Self {
            count: AtomicU32::new(0),
            rate: AngleCell::new(0.0),
            time_constant,
        }
    }

    /// Account for one sample
    pub fn record(&self, fault: bool) {
        let mut rate = self.rate.load();
        if fault {
            // Single writer, so no read-modify-write
            let count = self.count.load(Ordering::Relaxed);
            self.count.store(count.wrapping_add(1), Ordering::Relaxed);
            utils::low_pass(&mut rate, 1.0, self.time_constant);
        } else {
            utils::low_pass(&mut rate, 0.0, self.time_constant);
        }
        self.rate.store(rate);
    }

    /// Back to no faults and a zero rate
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
        self.rate.store(0.0);
    }

    /// Total faults since the last reset
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Filtered fault rate
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate.load()
    }
}

/// Last raw word clocked in from the serial sensor
#[derive(Debug, Default)]
pub struct RawWord(AtomicU16);

impl RawWord {
    /// Create a cell holding `word`
    #[must_use]
    pub const fn new(word: u16) -> Self {
        Self(AtomicU16::new(word))
    }

    /// Latest stored word
    #[must_use]
    pub fn load(&self) -> u16 {
        self.0.load(Ordering::Relaxed)
    }

    /// Publish a new word
    pub fn store(&self, word: u16) {
        self.0.store(word, Ordering::Relaxed);
    }
}

/// Snapshot of every fault counter and rate
///
/// Values belonging to a mode that is not active read as zero.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Last raw AS5047P frame
    pub spi_raw: u16,
    /// Rejected AS5047P frames
    pub spi_error_count: u32,
    /// Filtered AS5047P rejection rate
    pub spi_error_rate: f32,
    /// Sin/cos samples under the minimum amplitude
    pub sincos_below_min_count: u32,
    /// Filtered rate of too-weak sin/cos samples
    pub sincos_below_min_rate: f32,
    /// Sin/cos samples over the maximum amplitude
    pub sincos_above_max_count: u32,
    /// Filtered rate of saturated sin/cos samples
    pub sincos_above_max_rate: f32,
}
