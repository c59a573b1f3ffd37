//! Scalar color-space conversions
//!
//! The gamma curve here is the cheap square/square-root approximation, not
//! the IEC 61966-2-1 sRGB transfer function. It only has to make error
//! diffusion roughly perceptual, and it round-trips exactly on perfect squares.

use super::rgb::Color;

/// Largest linear channel value (`255²`).
pub const LINEAR_MAX: f64 = 255.0 * 255.0;

/// Luma weights applied to linear channel values.
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Snap a channel value to the nearest level of an N-bit channel.
///
/// `bits` is clamped to `1..=8`; `bits == 8` is the identity on integral
/// values. Levels are spread evenly over 0..=255, so 0 and 255 are always
/// representable.
///
/// ```
/// use tile_quant::color::to_nbit;
///
/// assert_eq!(to_nbit(255.0, 2), 255.0);
/// assert_eq!(to_nbit(100.0, 2), 85.0);
/// ```
#[inline]
pub fn to_nbit(value: f64, bits: u8) -> f64 {
    let bits = bits.clamp(1, 8);
    let alpha = 255.0 / ((1u32 << bits) - 1) as f64;
    ((value / alpha).round() * alpha).round()
}

/// Gamma value to linear (`x²`).
#[inline]
pub fn to_linear(x: f64) -> f64 {
    x * x
}

/// Linear value back to gamma (`√x`).
#[inline]
pub fn to_srgb(x: f64) -> f64 {
    x.sqrt()
}

/// Luma of a color whose channels are already linear.
#[inline]
pub fn brightness(linear: &Color) -> f64 {
    LUMA_R * linear.r + LUMA_G * linear.g + LUMA_B * linear.b
}
