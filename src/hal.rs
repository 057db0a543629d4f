//! Board services the encoder driver depends on but does not implement
//!
//! Pin muxing, timers and the motor current loop belong to the firmware.
//! The driver only talks to them through these traits.

/// Logical sensor pins the driver reconfigures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorPin {
    /// Encoder channel A, doubles as the soft SPI clock
    EncoderA,
    /// Encoder channel B, doubles as the soft SPI data input
    EncoderB,
    /// Encoder index, doubles as the soft SPI chip-select
    EncoderIndex,
    /// Soft SPI data output
    Mosi,
    /// AD2S1205 SAMPLE line
    ResolverSample,
    /// AD2S1205 RDVEL line
    ResolverRdvel,
}

impl SensorPin {
    /// Every pin, in the order they are released on deinit
    pub const ALL: [SensorPin; 6] = [
        SensorPin::EncoderB,
        SensorPin::EncoderA,
        SensorPin::EncoderIndex,
        SensorPin::Mosi,
        SensorPin::ResolverSample,
        SensorPin::ResolverRdvel,
    ];

    /// Soft SPI clock
    pub const SCK: SensorPin = SensorPin::EncoderA;
    /// Soft SPI data input
    pub const MISO: SensorPin = SensorPin::EncoderB;
    /// Soft SPI chip-select
    pub const CS: SensorPin = SensorPin::EncoderIndex;
}

/// Electrical mode of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Input with pull-up, the safe idle state
    InputPullUp,
    /// Floating input
    Input,
    /// Push-pull output at the highest slew rate
    OutputPushPull,
    /// Routed to the quadrature timer
    Alternate,
}

/// Firmware services used while switching modes and on an index trip
pub trait Board {
    /// Reconfigure one sensor pin; assumed immediate and infallible
    fn set_pin_mode(&mut self, pin: SensorPin, mode: PinMode);

    /// Arm the periodic interrupt that calls `Encoder::on_timer_tick`
    fn start_sample_timer(&mut self, rate_hz: u32);

    /// Disarm the sampling interrupt
    fn stop_sample_timer(&mut self);

    /// Safety action: command zero motor current
    fn command_zero_current(&mut self);
}

/// Free-running hardware quadrature counter
///
/// Register-level access: every method takes `&self` so the counter can sit
/// in the shared [`crate::EncoderState`] and be read from the control loop
/// while the sampling side owns its configuration.
pub trait QuadratureCounter {
    /// Current count, always below the auto-reload boundary
    fn count(&self) -> u32;

    /// Overwrite the count
    fn set_count(&self, count: u32);

    /// Set the highest count before the counter wraps to zero
    fn set_auto_reload(&self, reload: u32);

    /// Start counting edges of channels A and B
    fn enable(&self);

    /// Stop the counter and return the timer to its reset state
    fn disable(&self);
}

/// Source of the encoder index pulse
pub trait IndexSignal {
    type Error;

    /// Whether the index line is still asserted after a settle delay
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be read
    fn confirm(&mut self) -> Result<bool, Self::Error>;
}
