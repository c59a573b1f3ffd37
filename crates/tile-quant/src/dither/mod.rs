//! Palette lookups, plain and dithered.
//!
//! Both lookups implement [`ColorFinder`](crate::palette::ColorFinder):
//!
//! - [`NearestColorFinder`]: nearest color by weighted distance, scored on
//!   the tile histogram.
//! - [`DitherNearestColorFinder`]: ordered dithering over candidates found by
//!   an error-diffusion walk in linear space, scored per pixel.
//!
//! # Dithered lookup
//!
//! For one pixel the walk runs `levels` steps (2 or 4, from the
//! [`DitherPattern`](crate::DitherPattern)). Each step adds
//! `weight * error` to the linear pixel, converts back to gamma space and
//! takes the nearest palette color as a candidate. The running error grows by
//! the difference between the pixel and the bit-depth reduced candidate.
//! Candidates are then ranked by brightness and the 2×2 pattern picks one by
//! pixel position:
//!
//! ```text
//! Diagonal4   Horizontal4   Vertical4   Diagonal2   Horizontal2   Vertical2
//!   0 2          0 1           0 3         0 1         0 0           0 1
//!   3 1          3 2           1 2         1 0         1 1           0 1
//! ```

mod nearest;
mod ordered;

pub use nearest::NearestColorFinder;
pub use ordered::{DitherCandidate, DitherNearestColorFinder, MAX_LEVELS};

use crate::options::QuantizationOptions;
use crate::palette::ColorFinder;

/// Pick the lookup used for a whole run.
pub fn color_finder(options: &QuantizationOptions) -> Box<dyn ColorFinder> {
    if options.dither.is_enabled() {
        Box::new(DitherNearestColorFinder::new(
            options.dither_pattern,
            options.dither_weight,
            options.bits_per_channel,
        ))
    } else {
        Box::new(NearestColorFinder)
    }
}
