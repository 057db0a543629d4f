//! AD2S1205 resolver-to-digital converter read over the bit-banged bus
//!
//! The converter shares clock, data and chip-select with the AS5047P path.
//! Unlike that path no fault counter is kept: an unhealthy frame is dropped
//! and the previous angle is held.

use crate::{absolute::SpiSample, error::Fault, frame::ResolverFrame};

/// Check the status bits of a position frame and convert it to degrees
///
/// # Errors
///
/// [`Fault::StatusInvalid`] unless RDVEL, DOS and LOT all read high
pub fn decode(raw: u16) -> Result<f32, Fault> {
    let frame = ResolverFrame(raw);
    if frame.is_healthy() {
        Ok(frame.degrees())
    } else {
        Err(Fault::StatusInvalid)
    }
}

/// Process one frame, `None` when the transfer itself failed
pub fn sample(frame: Option<u16>) -> SpiSample {
    match frame {
        Some(raw) => SpiSample {
            raw,
            outcome: decode(raw),
        },
        None => SpiSample {
            raw: 0,
            outcome: Err(Fault::Transport),
        },
    }
}
