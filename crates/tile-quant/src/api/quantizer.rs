//! TiledQuantizer: the end-to-end pipeline.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::QuantizeError;
use super::progress::{NoProgress, Progress, ProgressTracker};
use crate::dither::color_finder;
use crate::options::QuantizationOptions;
use crate::output::QuantizedImage;
use crate::palette::{ColorFinder, PaletteEngine, PaletteSet};
use crate::sort::PaletteSorter;
use crate::tile::TileIndex;

/// Tiled palette quantizer.
///
/// Options are validated once in [`new`](Self::new); a quantizer can then be
/// reused for any number of images.
///
/// # Pipeline
///
/// 1. Tile extraction (with bit-depth reduction when dithering is off)
/// 2. Palette learning: seed, split, weak replacement, refinement, k-means
/// 3. Palette and slot sorting
/// 4. Remapping every pixel against the sorted palettes
///
/// # Example
///
/// ```
/// use tile_quant::{QuantizationOptions, TiledQuantizer};
///
/// let options = QuantizationOptions::new()
///     .tile_size(4, 4)
///     .palettes(1, 2)
///     .seed(7);
/// let quantizer = TiledQuantizer::new(options).unwrap();
///
/// let rgba = [255u8, 0, 0, 255].repeat(8 * 8);
/// let image = quantizer.quantize(&rgba, 8, 8).unwrap();
///
/// assert_eq!(image.palette_count(), 1);
/// assert_eq!(image.color_at(3, 3), [255, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct TiledQuantizer {
    options: QuantizationOptions,
}

impl TiledQuantizer {
    /// Create a quantizer.
    ///
    /// # Errors
    ///
    /// [`QuantizeError::InvalidOption`] for any option outside its range.
    pub fn new(options: QuantizationOptions) -> Result<Self, QuantizeError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The validated options.
    #[inline]
    pub fn options(&self) -> &QuantizationOptions {
        &self.options
    }

    /// Quantize a row-major RGBA buffer.
    pub fn quantize(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<QuantizedImage, QuantizeError> {
        self.quantize_with_progress(rgba, width, height, NoProgress)
    }

    /// Quantize a row-major RGBA buffer, reporting progress.
    ///
    /// `progress` sees a non-decreasing sequence ending at 100 on success.
    pub fn quantize_with_progress<P: Progress>(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        progress: P,
    ) -> Result<QuantizedImage, QuantizeError> {
        let mut progress = ProgressTracker::new(progress);
        progress.report(0);
        tracing::info!(
            width,
            height,
            palettes = self.options.palette_count,
            colors = self.options.colors_per_palette,
            dither = %self.options.dither,
            "Quantizing image"
        );

        let index = TileIndex::extract(rgba, width, height, &self.options)?;
        progress.report(5);

        let finder = color_finder(&self.options);
        let rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut engine = PaletteEngine::new(&index, &self.options, finder.as_ref(), rng);
        engine.seed();
        progress.report(20);
        engine.split();
        progress.report(35);
        engine.replace_weak();
        progress.report(70);
        engine.refine();
        progress.report(85);
        engine.polish();
        progress.report(90);
        let (learned, mut rng) = engine.finish();

        let sorter = PaletteSorter::new(self.options.color_zero.pinned_slots());
        let sorted = sorter.sort(&learned, &mut rng);
        progress.report(95);

        let image = self.remap(rgba, &index, &sorted, finder.as_ref());
        progress.report(100);
        tracing::info!(mse = image.mse(), "Quantized image");
        Ok(image)
    }

    /// Draw every pixel with the best palette of its tile.
    ///
    /// Transparent pixels, and every pixel of a dropped tile, take slot 0 of
    /// the tile's palette (palette 0 for dropped tiles) and keep their RGBA.
    fn remap(
        &self,
        rgba: &[u8],
        index: &TileIndex,
        palettes: &PaletteSet,
        finder: &dyn ColorFinder,
    ) -> QuantizedImage {
        let width = index.width() as usize;
        let cpp = self.options.colors_per_palette;
        let reserved = self.options.color_zero.reserved_slots();
        let transparent = self.options.color_zero.is_transparent();

        let zero = self
            .options
            .zero()
            .to_nbit(self.options.bits_per_channel)
            .to_bytes();
        let table: Vec<Vec<[u8; 3]>> = palettes
            .iter()
            .map(|palette| {
                let mut entries = Vec::with_capacity(cpp);
                if transparent {
                    entries.push(zero);
                }
                entries.extend(palette.colors().iter().map(|c| c.to_bytes()));
                entries
            })
            .collect();

        let mut indices = vec![0u16; rgba.len() / 4];
        let mut out = rgba.to_vec();
        let mut total = 0.0;

        for tile in index.tiles() {
            let p = finder.nearest_palette(palettes, tile);
            let palette = &palettes[p];
            let base = p * cpp;

            for y in tile.y..tile.y + tile.height {
                let row = y as usize * width;
                for x in tile.x..tile.x + tile.width {
                    indices[row + x as usize] = base as u16;
                }
            }

            for pixel in &tile.pixels {
                let slot = finder.find(palette, pixel);
                total += pixel.color.distance(&palette[slot]);

                let i = pixel.y as usize * width + pixel.x as usize;
                indices[i] = (base + slot + reserved) as u16;
                let [r, g, b] = table[p][slot + reserved];
                out[i * 4..i * 4 + 4].copy_from_slice(&[r, g, b, 255]);
            }
        }

        let mse = total / index.pixel_count() as f64;
        QuantizedImage::new(
            index.width(),
            index.height(),
            table,
            indices,
            out,
            transparent,
            mse,
        )
    }
}
