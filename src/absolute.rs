//! AS5047P absolute encoder read over the bit-banged bus

use crate::{
    SAMPLE_RATE_HZ,
    diagnostics::{ErrorRateTracker, RawWord},
    error::Fault,
    frame::{AngleFrame, DISCONNECTED_WORD},
    utils,
};

/// Outcome of one sampling tick of a serial sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiSample {
    /// Word clocked in from the sensor
    pub raw: u16,
    /// Decoded angle in degrees, or why the frame was dropped
    pub outcome: Result<f32, Fault>,
}

impl SpiSample {
    /// Angle if the frame was accepted
    #[must_use]
    pub fn angle(&self) -> Option<f32> {
        self.outcome.ok()
    }
}

/// Check an `ANGLECOM` response and convert it to degrees
///
/// The all-ones word is what a floating, pulled-up data line reads, so it is
/// rejected even though its parity is even.
///
/// # Errors
///
/// [`Fault::Disconnected`] for the all-ones word, [`Fault::Parity`] for odd parity
pub fn decode(raw: u16) -> Result<f32, Fault> {
    if raw == DISCONNECTED_WORD {
        return Err(Fault::Disconnected);
    }
    if !utils::parity_is_even(raw) {
        return Err(Fault::Parity);
    }
    Ok(AngleFrame(raw).degrees())
}

/// Per-mode state of the AS5047P path
#[derive(Debug)]
pub struct As5047p {
    errors: ErrorRateTracker,
    raw: RawWord,
}

impl Default for As5047p {
    fn default() -> Self {
        Self::new()
    }
}

impl As5047p {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: ErrorRateTracker::new(1.0 / SAMPLE_RATE_HZ as f32),
            raw: RawWord::new(0),
        }
    }

    /// Process one frame, `None` when the transfer itself failed
    ///
    /// A failed transfer is accounted as a disconnected sensor.
    pub fn sample(&self, frame: Option<u16>) -> SpiSample {
        let (raw, outcome) = match frame {
            Some(raw) => (raw, decode(raw)),
            None => (DISCONNECTED_WORD, Err(Fault::Transport)),
        };

        self.raw.store(raw);
        self.errors.record(outcome.is_err());

        #[cfg(feature = "defmt")]
        if let Err(fault) = outcome {
            defmt::trace!("AS5047P frame 0x{:04X} rejected: {}", raw, fault);
        }

        SpiSample { raw, outcome }
    }

    /// Forget the fault history and the last frame
    pub fn reset(&self) {
        self.errors.reset();
        self.raw.store(0);
    }

    /// Last raw frame
    #[must_use]
    pub fn raw(&self) -> u16 {
        self.raw.load()
    }

    /// Rejected frames since the last reset
    #[must_use]
    pub fn error_count(&self) -> u32 {
        self.errors.count()
    }

    /// Filtered rejection rate
    #[must_use]
    pub fn error_rate(&self) -> f32 {
        self.errors.rate()
    }
}
