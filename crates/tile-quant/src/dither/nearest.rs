//! Plain nearest-color lookup

use crate::palette::{ColorFinder, Palette};
use crate::tile::{Pixel, Tile};

/// Nearest color by weighted distance.
///
/// Tile error is computed from the histogram, so repeated colors cost one
/// lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestColorFinder;

impl ColorFinder for NearestColorFinder {
    #[inline]
    fn find(&self, palette: &Palette, pixel: &Pixel) -> usize {
        palette.nearest(&pixel.color).0
    }

    fn tile_error(&self, palette: &Palette, tile: &Tile) -> f64 {
        tile.histogram()
            .map(|(color, count)| palette.nearest(color).1 * count as f64)
            .sum()
    }
}
