//! Color types and color-space math
//!
//! All palette learning happens on [`Color`], a plain three-channel `f64`
//! vector in the 0..=255 range. Two representations are used:
//!
//! - **Gamma space**: the values as they appear in the image. Distances,
//!   palette storage and bit-depth reduction all operate here.
//! - **Linear space**: each channel squared ([`to_linear`]). Only the
//!   dithering error walk and brightness ranking use it, because light adds
//!   linearly and the quantization error must be accumulated that way.
//!
//! # Example
//!
//! ```
//! use tile_quant::Color;
//!
//! let a = Color::new(100.0, 150.0, 200.0);
//! let b = Color::new(120.0, 140.0, 190.0);
//! assert_eq!(a.distance(&b), 1300.0);
//! ```

mod rgb;
mod space;

pub use rgb::Color;
pub use space::{brightness, to_linear, to_nbit, to_srgb, LINEAR_MAX};
