//! Raw ratio conversions
//!
//! The resistance register holds the RTD/reference ratio scaled to 15 bits.
//! Temperatures use a linear approximation of one count per 1/32 °C with
//! 0 counts at -256 °C. It is not the Callendar–Van Dusen curve.

/// Full scale of the 15-bit ratio used for resistance.
pub const RATIO_FULL_SCALE: f32 = 32767.0;
/// Counts per degree Celsius
pub const COUNTS_PER_DEGREE: f32 = 32.0;
/// Temperature at a raw ratio of zero
pub const TEMP_OFFSET: f32 = 256.0;

/// Largest value the 15-bit ratio can take.
pub const RATIO_MAX: u16 = 0x7FFF;

/// Strips the fault bit from a resistance register word.
pub fn ratio_from_word(word: u16) -> u16 {
    word >> 1
}

/// Resistance in the units of `scale`
pub fn resistance(ratio: u16, scale: u16) -> f32 {
    (ratio as u32 * scale as u32) as f32 / RATIO_FULL_SCALE
}

/// Temperature in degrees Celsius
pub fn temperature(ratio: u16) -> f32 {
    ratio as f32 / COUNTS_PER_DEGREE - TEMP_OFFSET
}

/// Ratio for a temperature in degrees Celsius. Out of range inputs saturate.
pub fn ratio_from_temperature(celsius: f32) -> u16 {
    libm::roundf((celsius + TEMP_OFFSET) * COUNTS_PER_DEGREE) as u16
}

/// Threshold register word for a temperature in degrees Celsius.
///
/// No range check: anything outside -256 °C..=768 °C loses bits.
pub fn threshold(celsius: f32) -> u16 {
    ratio_from_temperature(celsius) << 1
}

/// Like [`threshold`], but `None` when the temperature does not fit the
/// 15-bit ratio.
pub fn threshold_checked(celsius: f32) -> Option<u16> {
    let counts = libm::roundf((celsius + TEMP_OFFSET) * COUNTS_PER_DEGREE);
    if counts.is_nan() || counts < 0.0 || counts > RATIO_MAX as f32 {
        return None;
    }
    Some((counts as u16) << 1)
}

/// Temperature represented by a threshold register word.
pub fn threshold_temperature(word: u16) -> f32 {
    temperature(ratio_from_word(word))
}
