//! Rotor position sensing for motor control firmware
//!
//! Four sensor technologies behind one "current angle in degrees" query:
//! an incremental ABI encoder on a hardware counter, an AS5047P absolute
//! encoder and an AD2S1205 resolver both read over a bit-banged SPI bus, and
//! an analog sin/cos encoder. Faults never fail an angle query; they are
//! counted, folded into filtered rates, and the last good angle is held.
//!
//! The sampling interrupt owns an [`Encoder`]; the control loop reads a
//! shared [`EncoderState`] that is typically a `static`.
#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

mod absolute;
mod diagnostics;
mod driver;
mod error;
mod frame;
mod hal;
mod quadrature;
mod resolver;
mod sincos;
mod softspi;
mod state;
mod utils;

/// Rate of the sampling interrupt and of the fault-rate filters
pub const SAMPLE_RATE_HZ: u32 = 20_000;

pub use absolute::SpiSample;
pub use diagnostics::{Diagnostics, ErrorRateTracker};
pub use driver::Encoder;
pub use error::{ConfigError, Error, Fault};
pub use frame::{AS5047P_READ_ANGLECOM, AngleFrame, ResolverFrame};
pub use hal::{Board, IndexSignal, PinMode, QuadratureCounter, SensorPin};
pub use quadrature::{DebouncedIndex, INDEX_SETTLE_NS, QuadratureConfig};
pub use sincos::{SINCOS_MAX_AMPLITUDE, SINCOS_MIN_AMPLITUDE, SinCosCalibration};
pub use softspi::{SoftSpi, Timing, WordTransfer};
pub use state::{EncoderMode, EncoderState};
pub use utils::parity_is_even;
