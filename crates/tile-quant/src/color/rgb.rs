//! Three-channel color vector

use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use super::space::{to_linear, to_nbit, to_srgb, LINEAR_MAX};
use crate::api::ParseColorError;

/// Per-channel weights of [`Color::distance`]. Green dominates because the
/// eye is most sensitive to it.
const WEIGHT_R: f64 = 2.0;
const WEIGHT_G: f64 = 4.0;
const WEIGHT_B: f64 = 1.0;

/// An RGB color with real-valued channels.
///
/// Channels live in 0..=255 in gamma space. The same type carries linear
/// values (0..=65025) inside the dithering walk; which space a value is in
/// is tracked by the caller, not the type.
///
/// `Color` is `Copy`: cloning a palette entry before mutating it is a plain
/// value copy, never an alias.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    /// Red channel
    pub r: f64,
    /// Green channel
    pub g: f64,
    /// Blue channel
    pub b: f64,
}

impl Color {
    /// Black, also the zero vector.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit channel values.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64, g as f64, b as f64)
    }

    /// Create a color from an `[R, G, B]` byte array.
    #[inline]
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::from_u8(bytes[0], bytes[1], bytes[2])
    }

    /// Round and clamp to an `[R, G, B]` byte array.
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Weighted squared Euclidean distance (R=2, G=4, B=1).
    ///
    /// No square root is taken; ordering is preserved so every comparison in
    /// the crate works on squared distance.
    #[inline]
    pub fn distance(&self, other: &Color) -> f64 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        WEIGHT_R * dr * dr + WEIGHT_G * dg * dg + WEIGHT_B * db * db
    }

    /// Snap every channel to the nearest N-bit level.
    #[inline]
    pub fn to_nbit(self, bits: u8) -> Self {
        Self::new(to_nbit(self.r, bits), to_nbit(self.g, bits), to_nbit(self.b, bits))
    }

    /// Gamma to linear, per channel.
    #[inline]
    pub fn to_linear(self) -> Self {
        Self::new(to_linear(self.r), to_linear(self.g), to_linear(self.b))
    }

    /// Linear to gamma, per channel.
    #[inline]
    pub fn to_srgb(self) -> Self {
        Self::new(to_srgb(self.r), to_srgb(self.g), to_srgb(self.b))
    }

    /// Clamp every channel of a linear color to `0..=255²`.
    #[inline]
    pub fn clamp_linear(self) -> Self {
        Self::new(
            self.r.clamp(0.0, LINEAR_MAX),
            self.g.clamp(0.0, LINEAR_MAX),
            self.b.clamp(0.0, LINEAR_MAX),
        )
    }

    /// Move toward `target` by learning rate `alpha`:
    /// `self = (1 - alpha) * self + alpha * target`.
    #[inline]
    pub fn move_closer(&mut self, target: &Color, alpha: f64) {
        self.r = (1.0 - alpha) * self.r + alpha * target.r;
        self.g = (1.0 - alpha) * self.g + alpha * target.g;
        self.b = (1.0 - alpha) * self.b + alpha * target.b;
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB` (case-insensitive).
    ///
    /// ```
    /// use tile_quant::Color;
    ///
    /// let magenta: Color = "#F0F".parse().unwrap();
    /// assert_eq!(magenta.to_bytes(), [255, 0, 255]);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }

        match s.len() {
            3 => {
                let r = u8::from_str_radix(&s[0..1], 16)? * 17;
                let g = u8::from_str_radix(&s[1..2], 16)? * 17;
                let b = u8::from_str_radix(&s[2..3], 16)? * 17;
                Ok(Self::from_u8(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&s[0..2], 16)?;
                let g = u8::from_str_radix(&s[2..4], 16)?;
                let b = u8::from_str_radix(&s[4..6], 16)?;
                Ok(Self::from_u8(r, g, b))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

impl Add for Color {
    type Output = Color;

    #[inline]
    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    #[inline]
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Sub for Color {
    type Output = Color;

    #[inline]
    fn sub(self, rhs: Color) -> Color {
        Color::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: f64) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}
