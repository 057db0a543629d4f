//! Frame layouts of the serial position sensors.

/// AS5047P `ANGLECOM` read command
///
/// Address 0x3FFF with the read and parity bits set, which is simply all ones.
pub const AS5047P_READ_ANGLECOM: u16 = 0x3FFF | 0x4000 | 0x8000;

/// Word read back from an idle (pulled-up, disconnected) data line
pub const DISCONNECTED_WORD: u16 = 0xFFFF;

/// AS5047P angle resolution (14-bit: 0-16383, representing 0-360°)
pub const AS5047P_COUNTS: u16 = 0x3FFF + 1;

/// AD2S1205 position resolution (12-bit)
pub const AD2S1205_COUNTS: u16 = 0x0FFF + 1;

bitfield::bitfield! {
    /// AS5047P response to `ANGLECOM`
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct AngleFrame(u16);
    impl Debug;
    u16;
    /// Even parity over the whole frame
    pub parity, _: 15;
    /// Error flag of the previous command
    pub error_flag, _: 14;
    /// Angle with dynamic angle error compensation
    pub daecang, _: 13, 0;
}

impl AngleFrame {
    /// Angle in degrees, `[0, 360)`
    #[must_use]
    pub fn degrees(&self) -> f32 {
        f32::from(self.daecang()) * 360.0 / f32::from(AS5047P_COUNTS)
    }
}

bitfield::bitfield! {
    /// AD2S1205 position frame
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct ResolverFrame(u16);
    impl Debug;
    u16;
    /// 12-bit position
    pub position, _: 15, 4;
    /// Set when the frame carries position rather than velocity
    pub rdvel, _: 3;
    /// Degradation of signal, active low
    pub dos, _: 2;
    /// Loss of tracking, active low
    pub lot, _: 1;
    /// Odd parity over the frame (not checked)
    pub parity, _: 0;
}

impl ResolverFrame {
    /// True when the frame is a position read with no DOS or LOT condition
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.rdvel() && self.dos() && self.lot()
    }

    /// Angle in degrees, `[0, 360)`
    #[must_use]
    pub fn degrees(&self) -> f32 {
        f32::from(self.position()) * 360.0 / f32::from(AD2S1205_COUNTS)
    }
}
