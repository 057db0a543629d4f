//! Analog sin/cos encoder
//!
//! Raw sine and cosine voltages come from an ADC sampled in sync with the
//! motor PWM. After gain/offset correction the vector magnitude gates the
//! sample: too weak (magnet far, cable off) or too strong (saturated input)
//! samples are dropped and counted separately.

use crate::{SAMPLE_RATE_HZ, diagnostics::ErrorRateTracker, error::Fault, utils};

/// `sqrt(sin^2 + cos^2)` has to be at least this large
pub const SINCOS_MIN_AMPLITUDE: f32 = 1.0;
/// `sqrt(sin^2 + cos^2)` has to be no larger than this
pub const SINCOS_MAX_AMPLITUDE: f32 = 1.65;

/// Gain and offset correction of the two channels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SinCosCalibration {
    /// Multiplier applied to the raw sine voltage
    pub sin_gain: f32,
    /// Subtracted from the sine channel after the gain
    pub sin_offset: f32,
    /// Multiplier applied to the raw cosine voltage
    pub cos_gain: f32,
    /// Subtracted from the cosine channel after the gain
    pub cos_offset: f32,
    /// Gain of the angle low-pass filter, `(0, 1]`; 1.0 disables filtering
    pub filter_time_constant: f32,
}

impl Default for SinCosCalibration {
    fn default() -> Self {
        Self {
            sin_gain: 1.0,
            sin_offset: 0.0,
            cos_gain: 1.0,
            cos_offset: 0.0,
            filter_time_constant: 1.0,
        }
    }
}

/// Fault accounting of the sin/cos path, readable from any context
#[derive(Debug)]
pub struct SinCosFaults {
    below_min: ErrorRateTracker,
    above_max: ErrorRateTracker,
}

impl Default for SinCosFaults {
    fn default() -> Self {
        Self::new()
    }
}

impl SinCosFaults {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            below_min: ErrorRateTracker::new(1.0 / SAMPLE_RATE_HZ as f32),
            above_max: ErrorRateTracker::new(1.0 / SAMPLE_RATE_HZ as f32),
        }
    }

    pub fn reset(&self) {
        self.below_min.reset();
        self.above_max.reset();
    }

    /// Samples dropped for a too-weak signal
    #[must_use]
    pub fn below_min_count(&self) -> u32 {
        self.below_min.count()
    }

    /// Filtered too-weak rate
    #[must_use]
    pub fn below_min_rate(&self) -> f32 {
        self.below_min.rate()
    }

    /// Samples dropped for a saturated signal
    #[must_use]
    pub fn above_max_count(&self) -> u32 {
        self.above_max.count()
    }

    /// Filtered saturation rate
    #[must_use]
    pub fn above_max_rate(&self) -> f32 {
        self.above_max.rate()
    }
}

/// Filter state of the sin/cos path, owned by the sampling side
#[derive(Debug)]
pub struct SinCos {
    calibration: SinCosCalibration,
    filtered: f32,
}

impl SinCos {
    #[must_use]
    pub const fn new(calibration: SinCosCalibration) -> Self {
        Self {
            calibration,
            filtered: 0.0,
        }
    }

    /// Process one pair of raw voltages
    ///
    /// Returns the filtered angle in degrees, `[0, 360)`.
    ///
    /// # Errors
    ///
    /// [`Fault::SignalAboveMax`] or [`Fault::SignalBelowMin`] when the vector
    /// magnitude is outside the valid band; the filtered angle is unchanged
    pub fn update(&mut self, faults: &SinCosFaults, raw_sin: f32, raw_cos: f32) -> Result<f32, Fault> {
        let cal = &self.calibration;
        let sin = raw_sin * cal.sin_gain - cal.sin_offset;
        let cos = raw_cos * cal.cos_gain - cal.cos_offset;

        let magnitude_sq = sin * sin + cos * cos;

        if magnitude_sq > SINCOS_MAX_AMPLITUDE * SINCOS_MAX_AMPLITUDE {
            faults.above_max.record(true);
            return Err(Fault::SignalAboveMax);
        }
        if magnitude_sq < SINCOS_MIN_AMPLITUDE * SINCOS_MIN_AMPLITUDE {
            faults.below_min.record(true);
            return Err(Fault::SignalBelowMin);
        }

        faults.above_max.record(false);
        faults.below_min.record(false);

        let angle = utils::wrap_degrees(libm::atan2f(sin, cos).to_degrees());
        // Filter along the shortest arc so the 0/360 seam is not swept across
        let step = utils::shortest_arc(self.filtered, angle) * cal.filter_time_constant;
        self.filtered = utils::wrap_degrees(self.filtered + step);

        Ok(self.filtered)
    }
}
