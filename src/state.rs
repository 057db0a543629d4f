//! State shared between the sampling interrupt and the control loop
//!
//! An [`EncoderState`] is meant to live in a `static`. The sampling side
//! ([`crate::Encoder`]) holds one shared reference and is the only writer;
//! the control loop and the fault supervisor read through their own shared
//! references at any time, without locks and without masking the sampling
//! interrupt. A read racing a sample sees the previous or the new value of
//! each word, never a torn one.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use crate::{
    absolute::As5047p,
    diagnostics::{AngleCell, Diagnostics},
    hal::QuadratureCounter,
    quadrature::QuadratureConfig,
    sincos::SinCosFaults,
};

/// Active sensor technology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EncoderMode {
    /// Unconfigured, every query reads zero
    None = 0,
    /// Incremental ABI encoder on the hardware counter
    Quadrature = 1,
    /// AS5047P over the bit-banged bus
    AbsoluteSpi = 2,
    /// AD2S1205 over the bit-banged bus
    ResolverSpi = 3,
    /// Analog sin/cos pair
    SinCosAnalog = 4,
}

impl EncoderMode {
    const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Quadrature,
            2 => Self::AbsoluteSpi,
            3 => Self::ResolverSpi,
            4 => Self::SinCosAnalog,
            _ => Self::None,
        }
    }
}

/// Angle, mode and fault accounting visible to readers
#[derive(Debug)]
pub struct EncoderState<CNT> {
    counter: CNT,
    mode: AtomicU8,
    pub(crate) counts_per_revolution: AtomicU32,
    pub(crate) angle: AngleCell,
    pub(crate) spi: As5047p,
    pub(crate) sincos: SinCosFaults,
}

impl<CNT> EncoderState<CNT> {
    /// Create an unconfigured state around the quadrature counter
    pub const fn new(counter: CNT) -> Self {
        Self {
            counter,
            mode: AtomicU8::new(EncoderMode::None as u8),
            counts_per_revolution: AtomicU32::new(0),
            angle: AngleCell::new(0.0),
            spi: As5047p::new(),
            sincos: SinCosFaults::new(),
        }
    }

    /// Hardware quadrature counter
    #[must_use]
    pub fn counter(&self) -> &CNT {
        &self.counter
    }

    /// Currently active sensor technology
    #[must_use]
    pub fn mode(&self) -> EncoderMode {
        EncoderMode::from_bits(self.mode.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.mode() != EncoderMode::None
    }

    /// Make `mode` visible to readers; everything stored before is visible with it
    pub(crate) fn publish_mode(&self, mode: EncoderMode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    /// Last raw AS5047P frame, 0 outside that mode
    #[must_use]
    pub fn spi_raw(&self) -> u16 {
        match self.mode() {
            EncoderMode::AbsoluteSpi => self.spi.raw(),
            _ => 0,
        }
    }

    /// Rejected AS5047P frames since init, 0 outside that mode
    #[must_use]
    pub fn spi_error_count(&self) -> u32 {
        match self.mode() {
            EncoderMode::AbsoluteSpi => self.spi.error_count(),
            _ => 0,
        }
    }

    /// Filtered AS5047P rejection rate, 0 outside that mode
    #[must_use]
    pub fn spi_error_rate(&self) -> f32 {
        match self.mode() {
            EncoderMode::AbsoluteSpi => self.spi.error_rate(),
            _ => 0.0,
        }
    }

    /// Too-weak sin/cos samples since init, 0 outside that mode
    #[must_use]
    pub fn sincos_below_min_error_count(&self) -> u32 {
        match self.mode() {
            EncoderMode::SinCosAnalog => self.sincos.below_min_count(),
            _ => 0,
        }
    }

    /// Filtered too-weak sin/cos rate, 0 outside that mode
    #[must_use]
    pub fn sincos_below_min_error_rate(&self) -> f32 {
        match self.mode() {
            EncoderMode::SinCosAnalog => self.sincos.below_min_rate(),
            _ => 0.0,
        }
    }

    /// Saturated sin/cos samples since init, 0 outside that mode
    #[must_use]
    pub fn sincos_above_max_error_count(&self) -> u32 {
        match self.mode() {
            EncoderMode::SinCosAnalog => self.sincos.above_max_count(),
            _ => 0,
        }
    }

    /// Filtered saturated sin/cos rate, 0 outside that mode
    #[must_use]
    pub fn sincos_above_max_error_rate(&self) -> f32 {
        match self.mode() {
            EncoderMode::SinCosAnalog => self.sincos.above_max_rate(),
            _ => 0.0,
        }
    }

    /// All fault counters and rates at once
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            spi_raw: self.spi_raw(),
            spi_error_count: self.spi_error_count(),
            spi_error_rate: self.spi_error_rate(),
            sincos_below_min_count: self.sincos_below_min_error_count(),
            sincos_below_min_rate: self.sincos_below_min_error_rate(),
            sincos_above_max_count: self.sincos_above_max_error_count(),
            sincos_above_max_rate: self.sincos_above_max_error_rate(),
        }
    }
}

impl<CNT: QuadratureCounter> EncoderState<CNT> {
    /// Rotor angle in degrees, `[0, 360)`
    ///
    /// Quadrature mode reads the counter; every other mode returns the last
    /// accepted sample. Never fails: a faulty sensor keeps reporting its last
    /// good angle and `0.0` is reported while unconfigured.
    #[must_use]
    pub fn read_angle_degrees(&self) -> f32 {
        match self.mode() {
            EncoderMode::Quadrature => QuadratureConfig {
                counts_per_revolution: self.counts_per_revolution.load(Ordering::Relaxed),
            }
            .degrees(self.counter.count()),
            _ => self.angle.load(),
        }
    }
}
