//! Output types.
//!
//! [`QuantizedImage`] is the result of every run: the finished palettes, a
//! flat `(palette, slot)` index per pixel and a reconstructed RGBA preview.

mod quantized_image;

pub use quantized_image::{QuantizedImage, TABLE_ENTRIES};
