//! Encoder sampling side: one active sensor technology behind one angle query

use core::sync::atomic::Ordering;

use embedded_hal::digital::OutputPin;

use crate::{
    SAMPLE_RATE_HZ,
    absolute::SpiSample,
    diagnostics::Diagnostics,
    error::{ConfigError, Fault},
    frame::AS5047P_READ_ANGLECOM,
    hal::{Board, IndexSignal, PinMode, QuadratureCounter, SensorPin},
    quadrature::QuadratureConfig,
    resolver,
    sincos::{SinCos, SinCosCalibration},
    softspi::{IDLE_WORD, WordTransfer},
    state::{EncoderMode, EncoderState},
};

#[derive(Debug)]
enum Mode {
    None,
    Quadrature(QuadratureConfig),
    AbsoluteSpi,
    ResolverSpi,
    SinCos(SinCos),
}

/// Rotor position driver
///
/// Owns the bit-banged bus, the resolver SAMPLE and RDVEL lines, the index
/// input and the board services, and switches between the four sensor
/// technologies. Angles and fault counters are published into a shared
/// [`EncoderState`]; the control loop reads them from there through its own
/// `&EncoderState` while this driver keeps sampling.
///
/// ```ignore
/// static STATE: EncoderState<Tim2Counter> = EncoderState::new(Tim2Counter);
///
/// let mut encoder = Encoder::new(&STATE, bus, rdvel, sample, index, board);
/// encoder.init_absolute_spi();
/// // sampling interrupt:  encoder.on_timer_tick();
/// // control loop:        STATE.read_angle_degrees();
/// ```
#[derive(Debug)]
pub struct Encoder<'a, BUS, RDVEL, SAMPLE, CNT, IDX, B> {
    state: &'a EncoderState<CNT>,
    bus: BUS,
    rdvel: RDVEL,
    sample: SAMPLE,
    index: IDX,
    board: B,
    mode: Mode,
}

impl<'a, BUS, RDVEL, SAMPLE, CNT, IDX, B> Encoder<'a, BUS, RDVEL, SAMPLE, CNT, IDX, B>
where
    BUS: WordTransfer,
    RDVEL: OutputPin,
    SAMPLE: OutputPin,
    CNT: QuadratureCounter,
    IDX: IndexSignal,
    B: Board,
{
    /// Create an unconfigured driver publishing into `state`; no hardware is touched
    pub fn new(
        state: &'a EncoderState<CNT>,
        bus: BUS,
        rdvel: RDVEL,
        sample: SAMPLE,
        index: IDX,
        board: B,
    ) -> Self {
        state.publish_mode(EncoderMode::None);
        state.angle.store(0.0);

        Self {
            state,
            bus,
            rdvel,
            sample,
            index,
            board,
            mode: Mode::None,
        }
    }

    /// Release all peripherals, consuming the driver
    ///
    /// Call [`Self::deinit`] first to leave the pins in their idle state.
    pub fn release(self) -> (BUS, RDVEL, SAMPLE, IDX, B) {
        (self.bus, self.rdvel, self.sample, self.index, self.board)
    }

    /// Shared state readers use; the reference outlives any borrow of the driver
    #[must_use]
    pub fn state(&self) -> &'a EncoderState<CNT> {
        self.state
    }

    /// Currently active sensor technology
    #[must_use]
    pub fn mode(&self) -> EncoderMode {
        self.state.mode()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.state.is_configured()
    }

    /// See [`EncoderState::read_angle_degrees`]
    #[must_use]
    pub fn read_angle_degrees(&self) -> f32 {
        self.state.read_angle_degrees()
    }

    /// See [`EncoderState::diagnostics`]
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        self.state.diagnostics()
    }

    /// Switch to the incremental encoder
    ///
    /// Programs the counter to wrap at `3 * counts` and seeds it with the
    /// middle of that range.
    ///
    /// # Errors
    ///
    /// Returns an error for zero counts or a range that overflows the counter;
    /// the driver is left unconfigured in that case
    pub fn init_quadrature(&mut self, counts_per_revolution: u32) -> Result<(), ConfigError> {
        let config = QuadratureConfig {
            counts_per_revolution,
        };
        self.teardown();
        config.validate()?;

        self.board.set_pin_mode(SensorPin::EncoderA, PinMode::Alternate);
        self.board.set_pin_mode(SensorPin::EncoderB, PinMode::Alternate);
        self.board
            .set_pin_mode(SensorPin::EncoderIndex, PinMode::InputPullUp);

        let counter = self.state.counter();
        counter.set_auto_reload(config.auto_reload());
        counter.enable();
        counter.set_count(config.initial_count());

        self.state
            .counts_per_revolution
            .store(counts_per_revolution, Ordering::Relaxed);
        self.mode = Mode::Quadrature(config);
        self.state.publish_mode(EncoderMode::Quadrature);

        #[cfg(feature = "defmt")]
        defmt::info!("Quadrature encoder, {} counts/rev", counts_per_revolution);

        Ok(())
    }

    /// Switch to the AS5047P on the bit-banged bus and arm sampling
    pub fn init_absolute_spi(&mut self) {
        self.teardown();
        self.configure_bus();

        self.state.spi.reset();
        self.mode = Mode::AbsoluteSpi;
        self.state.publish_mode(EncoderMode::AbsoluteSpi);
        self.board.start_sample_timer(SAMPLE_RATE_HZ);

        #[cfg(feature = "defmt")]
        defmt::info!("AS5047P encoder, sampling at {} Hz", SAMPLE_RATE_HZ);
    }

    /// Switch to the AD2S1205 on the bit-banged bus and arm sampling
    ///
    /// SAMPLE is parked high, ready for the falling edge the PWM sync
    /// produces, and RDVEL high selects position reads.
    pub fn init_resolver_spi(&mut self) {
        self.teardown();
        self.configure_bus();

        self.board
            .set_pin_mode(SensorPin::ResolverSample, PinMode::OutputPushPull);
        self.board
            .set_pin_mode(SensorPin::ResolverRdvel, PinMode::OutputPushPull);
        if self.sample.set_high().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to drive SAMPLE high");
        }
        if self.rdvel.set_high().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to drive RDVEL high");
        }

        self.mode = Mode::ResolverSpi;
        self.state.publish_mode(EncoderMode::ResolverSpi);
        self.board.start_sample_timer(SAMPLE_RATE_HZ);

        #[cfg(feature = "defmt")]
        defmt::info!("AD2S1205 resolver, sampling at {} Hz", SAMPLE_RATE_HZ);
    }

    /// Switch to the analog sin/cos sensor
    ///
    /// Samples arrive through [`Self::on_analog_sample`]; no timer is armed.
    pub fn init_sincos(&mut self, calibration: SinCosCalibration) {
        self.teardown();

        self.state.sincos.reset();
        self.mode = Mode::SinCos(SinCos::new(calibration));
        self.state.publish_mode(EncoderMode::SinCosAnalog);

        #[cfg(feature = "defmt")]
        defmt::info!("Sin/cos encoder, {}", calibration);
    }

    /// Stop sampling, release every sensor pin to input-pull-up and forget
    /// all mode state
    pub fn deinit(&mut self) {
        self.state.publish_mode(EncoderMode::None);

        self.board.stop_sample_timer();
        self.state.counter().disable();

        for pin in SensorPin::ALL {
            self.board.set_pin_mode(pin, PinMode::InputPullUp);
        }

        self.mode = Mode::None;
        self.state.angle.store(0.0);
        self.state.spi.reset();
        self.state.sincos.reset();

        #[cfg(feature = "defmt")]
        defmt::info!("Encoder released");
    }

    /// Change the quadrature divisor while running
    ///
    /// Only the counter wrap point is reprogrammed, the count is kept. Does
    /// nothing outside quadrature mode or when the value is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error for zero counts or a range that overflows the counter;
    /// the previous setting stays active
    pub fn set_counts(&mut self, counts_per_revolution: u32) -> Result<(), ConfigError> {
        let Mode::Quadrature(config) = &mut self.mode else {
            return Ok(());
        };
        if config.counts_per_revolution == counts_per_revolution {
            return Ok(());
        }

        let next = QuadratureConfig {
            counts_per_revolution,
        };
        next.validate()?;
        *config = next;
        self.state.counter().set_auto_reload(next.auto_reload());
        self.state
            .counts_per_revolution
            .store(counts_per_revolution, Ordering::Relaxed);

        #[cfg(feature = "defmt")]
        defmt::debug!("Quadrature encoder now {} counts/rev", counts_per_revolution);

        Ok(())
    }

    /// Sampling interrupt body, to be called at [`SAMPLE_RATE_HZ`]
    ///
    /// Clocks one frame from the serial sensor of the active mode. Returns
    /// `None` when no serial sensor is active.
    pub fn on_timer_tick(&mut self) -> Option<SpiSample> {
        let sample = match &self.mode {
            Mode::AbsoluteSpi => self
                .state
                .spi
                .sample(self.bus.transfer_word(AS5047P_READ_ANGLECOM).ok()),
            Mode::ResolverSpi => {
                // The converter reads position, not velocity, while RDVEL is high
                let frame = match self.rdvel.set_high() {
                    Ok(()) => self.bus.transfer_word(IDLE_WORD).ok(),
                    Err(_) => None,
                };
                let sample = resolver::sample(frame);
                #[cfg(feature = "defmt")]
                if let Err(fault) = sample.outcome {
                    defmt::trace!("AD2S1205 frame 0x{:04X} dropped: {}", sample.raw, fault);
                }
                sample
            }
            Mode::None | Mode::Quadrature(_) | Mode::SinCos(_) => return None,
        };

        if let Ok(angle) = sample.outcome {
            self.state.angle.store(angle);
        }

        Some(sample)
    }

    /// Feed one pair of raw sin/cos voltages, sampled in sync with the PWM
    ///
    /// Returns `None` outside sin/cos mode, otherwise the filtered angle or
    /// the reason the sample was dropped.
    pub fn on_analog_sample(&mut self, raw_sin: f32, raw_cos: f32) -> Option<Result<f32, Fault>> {
        let Mode::SinCos(sensor) = &mut self.mode else {
            return None;
        };

        let result = sensor.update(&self.state.sincos, raw_sin, raw_cos);
        match result {
            Ok(angle) => self.state.angle.store(angle),
            #[cfg(feature = "defmt")]
            Err(fault) => defmt::trace!("Sin/cos sample dropped: {}", fault),
            #[cfg(not(feature = "defmt"))]
            Err(_) => {}
        }

        Some(result)
    }

    /// Index pulse interrupt body
    ///
    /// The pulse is a safety trip: if the line is still high after the settle
    /// delay, zero motor current is commanded. Returns whether it tripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the index line cannot be read; nothing is commanded
    pub fn on_index_pulse(&mut self) -> Result<bool, IDX::Error> {
        if !self.index.confirm()? {
            return Ok(false);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("Index pulse confirmed, commanding zero current");

        self.board.command_zero_current();
        Ok(true)
    }

    /// Shut down the hardware of the current mode and drop its state
    fn teardown(&mut self) {
        self.state.publish_mode(EncoderMode::None);
        match self.mode {
            Mode::Quadrature(_) => self.state.counter().disable(),
            Mode::AbsoluteSpi | Mode::ResolverSpi => self.board.stop_sample_timer(),
            Mode::None | Mode::SinCos(_) => {}
        }
        self.mode = Mode::None;
        self.state.angle.store(0.0);
    }

    fn configure_bus(&mut self) {
        self.board.set_pin_mode(SensorPin::MISO, PinMode::Input);
        self.board.set_pin_mode(SensorPin::SCK, PinMode::OutputPushPull);
        self.board.set_pin_mode(SensorPin::CS, PinMode::OutputPushPull);
        self.board.set_pin_mode(SensorPin::Mosi, PinMode::OutputPushPull);

        if self.bus.idle().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to drive the sensor bus idle");
        }
    }
}
