/// Error type for pin level operations of the bit-banged transport
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A clock, chip-select, data or control pin reported an error
    Pin(E),
}

/// Rejected encoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Counts per revolution must be non-zero
    ZeroCounts,
    /// `3 * counts` does not fit the 32-bit hardware counter
    CountsOverflow(u32),
}

/// Reason a sample was discarded
///
/// Faults never reach the caller of an angle query. They are counted, folded
/// into a filtered rate and the last good angle is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Odd number of ones in an AS5047P frame
    Parity,
    /// AS5047P frame was the all-ones idle word
    Disconnected,
    /// AD2S1205 frame had RDVEL, DOS or LOT cleared
    StatusInvalid,
    /// Sin/cos vector magnitude under the minimum amplitude
    SignalBelowMin,
    /// Sin/cos vector magnitude over the maximum amplitude
    SignalAboveMax,
    /// A pin failed while the frame was being clocked
    Transport,
}
