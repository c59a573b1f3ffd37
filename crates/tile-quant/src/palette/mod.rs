//! Palette types and the palette learner
//!
//! [`PaletteEngine`] grows and refines a [`PaletteSet`] over the tiles of a
//! [`TileIndex`](crate::TileIndex). Every palette lookup goes through a
//! [`ColorFinder`], chosen once per run, so the learner itself never branches
//! on the dither mode.

mod engine;
mod palette;

pub use engine::PaletteEngine;
pub use palette::{Palette, PaletteSet};

use crate::tile::{Pixel, Tile};

/// Maps pixels to palette slots.
///
/// Implemented by [`NearestColorFinder`](crate::dither::NearestColorFinder)
/// for plain lookups and by
/// [`DitherNearestColorFinder`](crate::dither::DitherNearestColorFinder) for
/// error-diffused ones.
pub trait ColorFinder {
    /// Slot of `palette` the pixel is drawn with.
    fn find(&self, palette: &Palette, pixel: &Pixel) -> usize;

    /// Total weighted distance of drawing `tile` with `palette`.
    fn tile_error(&self, palette: &Palette, tile: &Tile) -> f64;

    /// Index of the palette that draws `tile` with the least error.
    ///
    /// A single palette short-circuits to index 0.
    fn nearest_palette(&self, palettes: &PaletteSet, tile: &Tile) -> usize {
        if palettes.len() <= 1 {
            return 0;
        }
        let mut best = (0, f64::INFINITY);
        for (i, palette) in palettes.iter().enumerate() {
            let error = self.tile_error(palette, tile);
            if error < best.1 {
                best = (i, error);
            }
        }
        best.0
    }
}
