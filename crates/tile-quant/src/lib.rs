#![allow(clippy::needless_range_loop, clippy::module_inception)]

//! tile-quant: tiled palette quantization
//!
//! Converts a full-color image into the representation used by tile-based
//! retro graphics hardware: the image is cut into fixed-size tiles, a small
//! set of palettes is learned, and every tile is drawn with exactly one of
//! them.
//!
//! # Quick Start
//!
//! [`TiledQuantizer`] is the entry point:
//!
//! ```
//! use tile_quant::{QuantizationOptions, TiledQuantizer};
//!
//! let options = QuantizationOptions::new()
//!     .tile_size(8, 8)
//!     .palettes(2, 4)
//!     .bits_per_channel(5)
//!     .seed(1);
//! let quantizer = TiledQuantizer::new(options).unwrap();
//!
//! // 16×8 image: left half black, right half white
//! let mut rgba = Vec::new();
//! for _y in 0..8 {
//!     for x in 0..16 {
//!         let v = if x < 8 { 0 } else { 255 };
//!         rgba.extend_from_slice(&[v, v, v, 255]);
//!     }
//! }
//!
//! let image = quantizer.quantize(&rgba, 16, 8).unwrap();
//! assert_eq!(image.palette_count(), 2);
//! assert_eq!(image.colors_per_palette(), 4);
//! assert_eq!(image.color_at(0, 0), [0, 0, 0]);
//! assert_eq!(image.color_at(15, 7), [255, 255, 255]);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! RGBA buffer
//!     |
//!     v
//! TileIndex            (tiles, histograms, transparency, bit-depth reduction)
//!     |
//!     v
//! PaletteEngine        (seed -> split -> weak replacement -> refine -> k-means)
//!     |
//!     v
//! PaletteSorter        (palette order, slot correspondence)
//!     |
//!     v
//! QuantizedImage       (palettes, flat indices, RGBA preview)
//! ```
//!
//! Every palette lookup goes through a [`ColorFinder`]: plain nearest color,
//! or the dithered lookup that ranks error-diffusion candidates by brightness
//! and picks one with a 2×2 pattern.
//!
//! # Color Distance
//!
//! Distances are squared Euclidean with channel weights R=2, G=4, B=1 in
//! gamma space. Dithering error is accumulated in linear space, where the
//! gamma curve is approximated by squaring.
//!
//! # Reproducibility
//!
//! Runs are random. Set [`QuantizationOptions::seed`] for identical output
//! across runs.

pub mod api;
pub mod color;
pub mod dither;
pub mod options;
pub mod output;
pub mod palette;
pub mod shuffle;
pub mod sort;
pub mod tile;


pub use api::{NoProgress, ParseColorError, ParseOptionError, Progress, QuantizeError, TiledQuantizer};
pub use color::Color;
pub use dither::{DitherNearestColorFinder, NearestColorFinder};
pub use options::{ColorZeroBehavior, DitherMode, DitherPattern, QuantizationOptions};
pub use output::{QuantizedImage, TABLE_ENTRIES};
pub use palette::{ColorFinder, Palette, PaletteEngine, PaletteSet};
pub use shuffle::RandomShuffle;
pub use sort::PaletteSorter;
pub use tile::{Pixel, Tile, TileIndex};
