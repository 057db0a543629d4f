/// Fold a 16-bit frame down to its parity bit and report even parity
///
/// Returns `true` for an even number of ones, which the AS5047P datasheet
/// defines as a frame without parity error.
#[must_use]
pub const fn parity_is_even(frame: u16) -> bool {
    let mut x = frame;
    x ^= x >> 8;
    x ^= x >> 4;
    x ^= x >> 2;
    x ^= x >> 1;
    (!x) & 1 == 1
}

/// One step of a first-order low-pass filter
///
/// `value` moves towards `sample` by `constant` of the remaining distance.
/// For `constant` in `(0, 1]` the output never overshoots `sample`.
#[inline]
pub fn low_pass(value: &mut f32, sample: f32, constant: f32) {
    *value -= constant * (*value - sample);
}

/// Map any angle in degrees into `[0, 360)`
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = libm::fmodf(angle, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // fmodf(-tiny) + 360 rounds back up to 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest distance from `from` to `to`, in `(-180, 180]`
#[must_use]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let delta = wrap_degrees(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}
