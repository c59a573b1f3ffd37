//! Error types for the tile-quant public API.
//!
//! [`QuantizeError`] covers everything a run can reject. Configuration
//! problems are always reported by [`QuantizationOptions::validate`] before
//! any pixel is touched.
//!
//! [`QuantizationOptions::validate`]: crate::QuantizationOptions::validate

use std::num::ParseIntError;

use thiserror::Error;

/// Errors returned by [`TiledQuantizer`](crate::TiledQuantizer).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantizeError {
    /// An option is outside its documented range.
    #[error("invalid option {name}: {value} (expected {range})")]
    InvalidOption {
        /// Option name
        name: &'static str,
        /// Offending value, formatted
        value: String,
        /// Accepted range, formatted
        range: &'static str,
    },

    /// The RGBA buffer length does not match the image dimensions.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// `width * height * 4`
        expected: usize,
        /// Actual buffer length
        actual: usize,
    },

    /// Width or height is zero.
    #[error("empty image: {width}x{height}")]
    EmptyImage {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Every pixel was excluded by the color-zero policy.
    #[error("no eligible pixels: every pixel is transparent under the color-zero policy")]
    NoEligiblePixels,
}

/// Error returned when parsing a hex color string fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    /// Not 3 or 6 hex digits after stripping `#`
    #[error("invalid hex color length (expected 3 or 6 characters)")]
    InvalidLength,
    /// Invalid hexadecimal character
    #[error("invalid hex character: {0}")]
    InvalidHex(#[from] ParseIntError),
}

/// Error returned when parsing an option name (dither mode, pattern, policy).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseOptionError {
    /// What was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
    /// Accepted spellings
    pub expected: &'static str,
}
