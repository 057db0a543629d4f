//! Bit-banged 16-bit SPI master with oversampled reads
//!
//! Used where the sensor lines are not routed to a hardware SPI peripheral.
//! Each received bit is sampled five times after the rising clock edge and
//! resolved by majority vote, which rejects short glitches on an unbuffered
//! line that has no setup/hold guarantees.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::error::Error;

/// Samples taken per received bit
const SAMPLES_PER_BIT: u8 = 5;

/// Word sent when the caller has nothing to transmit
pub const IDLE_WORD: u16 = 0xFFFF;

/// Delays of the bit-banged clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Delay after each clock edge
    pub half_period_ns: u32,
    /// Gap between consecutive samples of the data line, 0 for back-to-back reads
    pub sample_spacing_ns: u32,
}

impl Default for Timing {
    fn default() -> Self {
        // Four NOPs at 168 MHz between edges, one between samples
        Self {
            half_period_ns: 24,
            sample_spacing_ns: 6,
        }
    }
}

/// Single-word exchange used by the sampling tick
pub trait WordTransfer {
    /// Error reported by the underlying lines
    type Error;

    /// Send one word and return the word clocked in alongside it
    ///
    /// # Errors
    ///
    /// Returns an error if a line fails during the transfer
    fn transfer_word(&mut self, word: u16) -> Result<u16, Self::Error>;

    /// Leave the lines in their idle state: chip-select released, data high
    ///
    /// # Errors
    ///
    /// Returns an error if a line cannot be driven
    fn idle(&mut self) -> Result<(), Self::Error>;
}

/// Software SPI master, mode 1 style (sample while clock is high), MSB first
#[derive(Debug)]
pub struct SoftSpi<SCK, MISO, MOSI, CS, D> {
    sck: SCK,
    miso: MISO,
    mosi: MOSI,
    cs: CS,
    delay: D,
    timing: Timing,
}

impl<SCK, MISO, MOSI, CS, D, E> SoftSpi<SCK, MISO, MOSI, CS, D>
where
    SCK: OutputPin<Error = E>,
    MISO: InputPin<Error = E>,
    MOSI: OutputPin<Error = E>,
    CS: OutputPin<Error = E>,
    D: DelayNs,
{
    /// Create a transport from already configured pins
    pub fn new(sck: SCK, miso: MISO, mosi: MOSI, cs: CS, delay: D, timing: Timing) -> Self {
        Self {
            sck,
            miso,
            mosi,
            cs,
            delay,
            timing,
        }
    }

    /// Release the pins and delay, consuming the transport
    pub fn release(self) -> (SCK, MISO, MOSI, CS, D) {
        (self.sck, self.miso, self.mosi, self.cs, self.delay)
    }

    /// Drive the lines to their idle levels: chip-select deasserted, MOSI high,
    /// clock low
    ///
    /// # Errors
    ///
    /// Returns an error if a pin cannot be driven
    pub fn idle(&mut self) -> Result<(), Error<E>> {
        self.cs.set_high().map_err(Error::Pin)?;
        self.mosi.set_high().map_err(Error::Pin)?;
        self.sck.set_low().map_err(Error::Pin)
    }

    /// Exchange `N` words inside one chip-select assertion
    ///
    /// With `out` set to `None` the data line is held high for every bit.
    /// Chip-select is released even if a pin fails mid-transfer.
    ///
    /// # Errors
    ///
    /// Returns the first pin error encountered
    pub fn transfer<const N: usize>(&mut self, out: Option<&[u16; N]>) -> Result<[u16; N], Error<E>> {
        self.cs.set_low().map_err(Error::Pin)?;

        let shifted = self.shift_words(out);
        let released = self.cs.set_high().map_err(Error::Pin);
        let received = shifted?;
        released?;

        Ok(received)
    }

    fn shift_words<const N: usize>(&mut self, out: Option<&[u16; N]>) -> Result<[u16; N], Error<E>> {
        let mut received = [0u16; N];
        for (i, slot) in received.iter_mut().enumerate() {
            let send = out.map_or(IDLE_WORD, |words| words[i]);
            *slot = self.shift_word(send)?;
        }
        Ok(received)
    }

    fn shift_word(&mut self, mut send: u16) -> Result<u16, Error<E>> {
        let mut receive = 0u16;

        for _ in 0..16 {
            if send & 0x8000 == 0 {
                self.mosi.set_low().map_err(Error::Pin)?;
            } else {
                self.mosi.set_high().map_err(Error::Pin)?;
            }
            send <<= 1;

            self.sck.set_high().map_err(Error::Pin)?;
            self.delay.delay_ns(self.timing.half_period_ns);

            receive <<= 1;
            if self.sample_bit()? {
                receive |= 1;
            }

            self.sck.set_low().map_err(Error::Pin)?;
            self.delay.delay_ns(self.timing.half_period_ns);
        }

        Ok(receive)
    }

    /// Majority vote over five reads of the data line
    fn sample_bit(&mut self) -> Result<bool, Error<E>> {
        let mut high = 0u8;

        for n in 0..SAMPLES_PER_BIT {
            if n > 0 && self.timing.sample_spacing_ns > 0 {
                self.delay.delay_ns(self.timing.sample_spacing_ns);
            }
            if self.miso.is_high().map_err(Error::Pin)? {
                high += 1;
            }
        }

        Ok(high > SAMPLES_PER_BIT / 2)
    }
}

impl<SCK, MISO, MOSI, CS, D, E> WordTransfer for SoftSpi<SCK, MISO, MOSI, CS, D>
where
    SCK: OutputPin<Error = E>,
    MISO: InputPin<Error = E>,
    MOSI: OutputPin<Error = E>,
    CS: OutputPin<Error = E>,
    D: DelayNs,
{
    type Error = Error<E>;

    fn transfer_word(&mut self, word: u16) -> Result<u16, Self::Error> {
        self.transfer(Some(&[word])).map(|[received]| received)
    }

    fn idle(&mut self) -> Result<(), Self::Error> {
        SoftSpi::idle(self)
    }
}
