//! Tile extraction and per-tile color histograms.
//!
//! [`TileIndex`] owns every [`Tile`] of a run in a flat arena. A [`Pixel`]
//! refers back to its tile by arena index, never by reference. Tiles are
//! built once and are read-only afterwards.

use std::collections::HashMap;

use crate::api::QuantizeError;
use crate::color::Color;
use crate::options::{ColorZeroBehavior, QuantizationOptions};

/// One eligible image sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    /// Sample color, already bit-depth reduced when dithering is off.
    pub color: Color,
    /// Image column.
    pub x: u32,
    /// Image row.
    pub y: u32,
    /// Arena index of the owning tile.
    pub tile: usize,
}

/// A rectangular image region with at least one eligible pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width after clipping at the right image edge.
    pub width: u32,
    /// Height after clipping at the bottom image edge.
    pub height: u32,
    /// Distinct colors seen in the tile.
    pub colors: Vec<Color>,
    /// Occurrences of each entry of `colors` (same index).
    pub counts: Vec<usize>,
    /// Eligible pixels in row-major order.
    pub pixels: Vec<Pixel>,
}

impl Tile {
    /// Histogram entries as `(color, count)` pairs.
    pub fn histogram(&self) -> impl Iterator<Item = (&Color, usize)> + '_ {
        self.colors.iter().zip(self.counts.iter().copied())
    }
}

/// Decides which input pixels take part in learning.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Eligibility {
    behavior: ColorZeroBehavior,
    zero: [u8; 3],
    reduce_bits: Option<u8>,
}

impl Eligibility {
    pub(crate) fn new(options: &QuantizationOptions) -> Self {
        let reduce_bits = (!options.dither.is_enabled()).then_some(options.bits_per_channel);
        let zero = match reduce_bits {
            Some(bits) => options.zero().to_nbit(bits).to_bytes(),
            None => options.zero_color,
        };
        Self {
            behavior: options.color_zero,
            zero,
            reduce_bits,
        }
    }

    /// Working color of an RGBA sample.
    #[inline]
    pub(crate) fn color(&self, rgba: [u8; 4]) -> Color {
        let color = Color::from_u8(rgba[0], rgba[1], rgba[2]);
        match self.reduce_bits {
            Some(bits) => color.to_nbit(bits),
            None => color,
        }
    }

    /// True when the sample maps to the reserved transparent slot.
    #[inline]
    pub(crate) fn is_transparent(&self, rgba: [u8; 4]) -> bool {
        match self.behavior {
            ColorZeroBehavior::TransparentFromAlpha => rgba[3] < 255,
            ColorZeroBehavior::TransparentFromColor => self.color(rgba).to_bytes() == self.zero,
            ColorZeroBehavior::Unique | ColorZeroBehavior::Shared => false,
        }
    }
}

/// All tiles of one image plus the flat pixel stream used for sampling.
#[derive(Debug, Clone)]
pub struct TileIndex {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
    /// Arena index per tile window, `None` for dropped windows.
    grid: Vec<Option<usize>>,
    /// `(tile, pixel)` address of every eligible pixel.
    samples: Vec<(usize, usize)>,
}

impl TileIndex {
    /// Partition an RGBA buffer into tiles.
    ///
    /// Windows are clipped at the right and bottom edges. Windows without an
    /// eligible pixel are dropped.
    ///
    /// # Errors
    ///
    /// - [`QuantizeError::EmptyImage`] if either dimension is zero
    /// - [`QuantizeError::BufferSizeMismatch`] if `rgba.len() != width * height * 4`
    /// - [`QuantizeError::NoEligiblePixels`] if every pixel is transparent
    pub fn extract(
        rgba: &[u8],
        width: u32,
        height: u32,
        options: &QuantizationOptions,
    ) -> Result<Self, QuantizeError> {
        if width == 0 || height == 0 {
            return Err(QuantizeError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(QuantizeError::BufferSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }

        let eligibility = Eligibility::new(options);
        let tile_width = options.tile_width;
        let tile_height = options.tile_height;
        let columns = width.div_ceil(tile_width);
        let rows = height.div_ceil(tile_height);

        let mut tiles = Vec::new();
        let mut grid = Vec::with_capacity((columns * rows) as usize);
        let mut samples = Vec::new();

        for row in 0..rows {
            for column in 0..columns {
                let x0 = column * tile_width;
                let y0 = row * tile_height;
                let id = tiles.len();
                let tile = extract_tile(
                    rgba,
                    width,
                    x0,
                    y0,
                    tile_width.min(width - x0),
                    tile_height.min(height - y0),
                    id,
                    &eligibility,
                );
                if tile.pixels.is_empty() {
                    grid.push(None);
                    continue;
                }
                samples.extend((0..tile.pixels.len()).map(|i| (id, i)));
                grid.push(Some(id));
                tiles.push(tile);
            }
        }

        if samples.is_empty() {
            return Err(QuantizeError::NoEligiblePixels);
        }

        tracing::debug!(
            tiles = tiles.len(),
            dropped = grid.len() - tiles.len(),
            pixels = samples.len(),
            "Extracted tiles"
        );

        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            columns,
            rows,
            tiles,
            grid,
            samples,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tile windows per row and per column, including dropped ones.
    #[inline]
    pub fn grid_size(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Kept tiles, in row-major window order.
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile by arena index.
    #[inline]
    pub fn tile(&self, id: usize) -> &Tile {
        &self.tiles[id]
    }

    /// Arena index of the window at grid position `(column, row)`.
    #[inline]
    pub fn tile_at(&self, column: u32, row: u32) -> Option<usize> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.grid[(row * self.columns + column) as usize]
    }

    /// Arena index of the window containing image pixel `(x, y)`.
    #[inline]
    pub fn tile_for_pixel(&self, x: u32, y: u32) -> Option<usize> {
        self.tile_at(x / self.tile_width, y / self.tile_height)
    }

    /// Number of eligible pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.samples.len()
    }

    /// Eligible pixel by flat sample index.
    #[inline]
    pub fn pixel(&self, index: usize) -> &Pixel {
        let (tile, i) = self.samples[index];
        &self.tiles[tile].pixels[i]
    }

    /// Iterate every eligible pixel in tile order.
    pub fn pixels(&self) -> impl Iterator<Item = &Pixel> + '_ {
        self.tiles.iter().flat_map(|t| t.pixels.iter())
    }

    /// Unweighted mean of every eligible pixel.
    pub fn mean_color(&self) -> Color {
        let mut sum = Color::BLACK;
        for pixel in self.pixels() {
            sum += pixel.color;
        }
        sum * (1.0 / self.samples.len() as f64)
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_tile(
    rgba: &[u8],
    image_width: u32,
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    id: usize,
    eligibility: &Eligibility,
) -> Tile {
    let mut tile = Tile {
        x: x0,
        y: y0,
        width,
        height,
        colors: Vec::new(),
        counts: Vec::new(),
        pixels: Vec::with_capacity((width * height) as usize),
    };
    let mut slots: HashMap<[u8; 3], usize> = HashMap::new();

    for y in y0..y0 + height {
        for x in x0..x0 + width {
            let offset = (y as usize * image_width as usize + x as usize) * 4;
            let sample = [
                rgba[offset],
                rgba[offset + 1],
                rgba[offset + 2],
                rgba[offset + 3],
            ];
            if eligibility.is_transparent(sample) {
                continue;
            }

            let color = eligibility.color(sample);
            match slots.get(&color.to_bytes()) {
                Some(&slot) => tile.counts[slot] += 1,
                None => {
                    slots.insert(color.to_bytes(), tile.colors.len());
                    tile.colors.push(color);
                    tile.counts.push(1);
                }
            }
            tile.pixels.push(Pixel {
                color,
                x,
                y,
                tile: id,
            });
        }
    }
    tile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DitherMode;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat((width * height) as usize)
    }

    #[test]
    fn test_clipped_edge_tiles() {
        let options = QuantizationOptions::new().tile_size(8, 8);
        let index = TileIndex::extract(&solid(20, 10, [10, 20, 30, 255]), 20, 10, &options).unwrap();

        assert_eq!(index.grid_size(), (3, 2));
        assert_eq!(index.tiles().len(), 6);
        let corner = index.tile(index.tile_at(2, 1).unwrap());
        assert_eq!((corner.width, corner.height), (4, 2));
        assert_eq!(index.pixel_count(), 200);
        assert_eq!(index.tile_for_pixel(19, 9), index.tile_at(2, 1));
    }

    #[test]
    fn test_histogram_dedups_exact_colors() {
        let mut rgba = solid(4, 4, [0, 0, 0, 255]);
        rgba[0..4].copy_from_slice(&[255, 255, 255, 255]);
        rgba[4..8].copy_from_slice(&[255, 255, 255, 255]);
        let options = QuantizationOptions::new()
            .tile_size(4, 4)
            .bits_per_channel(8);
        let index = TileIndex::extract(&rgba, 4, 4, &options).unwrap();

        let tile = index.tile(0);
        assert_eq!(tile.colors.len(), tile.counts.len());
        assert_eq!(tile.colors.len(), 2);
        assert_eq!(tile.counts.iter().sum::<usize>(), 16);
        let white = tile
            .histogram()
            .find(|(c, _)| c.to_bytes() == [255, 255, 255])
            .map(|(_, n)| n);
        assert_eq!(white, Some(2));
    }

    #[test]
    fn test_reduces_bit_depth_without_dither() {
        // 5 and 8 both snap to level 8 at 5 bits
        let mut rgba = solid(2, 1, [5, 5, 5, 255]);
        rgba[4..8].copy_from_slice(&[8, 8, 8, 255]);
        let options = QuantizationOptions::new().tile_size(2, 1).bits_per_channel(5);
        let index = TileIndex::extract(&rgba, 2, 1, &options).unwrap();
        assert_eq!(index.tile(0).colors, vec![Color::new(8.0, 8.0, 8.0)]);

        let dithered = options.dither(DitherMode::Fast);
        let index = TileIndex::extract(&rgba, 2, 1, &dithered).unwrap();
        assert_eq!(index.tile(0).colors.len(), 2);
    }

    #[test]
    fn test_transparent_from_alpha_drops_tiles() {
        let mut rgba = solid(16, 8, [0, 0, 0, 0]);
        // one opaque pixel in the right tile
        let offset = (3 * 16 + 12) * 4;
        rgba[offset..offset + 4].copy_from_slice(&[200, 10, 10, 255]);

        let options = QuantizationOptions::new()
            .tile_size(8, 8)
            .color_zero(ColorZeroBehavior::TransparentFromAlpha, [0, 0, 0]);
        let index = TileIndex::extract(&rgba, 16, 8, &options).unwrap();

        assert_eq!(index.tiles().len(), 1);
        assert_eq!(index.tile_at(0, 0), None);
        assert_eq!(index.tile_at(1, 0), Some(0));
        let pixel = index.pixel(0);
        assert_eq!((pixel.x, pixel.y, pixel.tile), (12, 3, 0));
    }

    #[test]
    fn test_transparent_from_color_uses_reduced_zero() {
        // (3,3,3) reduces to black at 5 bits and matches the black zero color
        let mut rgba = solid(2, 1, [3, 3, 3, 255]);
        rgba[4..8].copy_from_slice(&[90, 90, 90, 255]);
        let options = QuantizationOptions::new()
            .tile_size(2, 1)
            .color_zero(ColorZeroBehavior::TransparentFromColor, [0, 0, 0]);
        let index = TileIndex::extract(&rgba, 2, 1, &options).unwrap();
        assert_eq!(index.pixel_count(), 1);
    }

    #[test]
    fn test_all_transparent_is_an_error() {
        let options = QuantizationOptions::new()
            .color_zero(ColorZeroBehavior::TransparentFromAlpha, [0, 0, 0]);
        let err = TileIndex::extract(&solid(8, 8, [1, 2, 3, 0]), 8, 8, &options).unwrap_err();
        assert_eq!(err, QuantizeError::NoEligiblePixels);
    }

    #[test]
    fn test_rejects_bad_buffers() {
        let options = QuantizationOptions::new();
        assert_eq!(
            TileIndex::extract(&[0; 12], 2, 2, &options).unwrap_err(),
            QuantizeError::BufferSizeMismatch {
                expected: 16,
                actual: 12
            }
        );
        assert_eq!(
            TileIndex::extract(&[], 0, 5, &options).unwrap_err(),
            QuantizeError::EmptyImage {
                width: 0,
                height: 5
            }
        );
    }

    #[test]
    fn test_mean_color() {
        let mut rgba = solid(2, 1, [0, 0, 0, 255]);
        rgba[4..8].copy_from_slice(&[255, 255, 255, 255]);
        let options = QuantizationOptions::new().bits_per_channel(8);
        let index = TileIndex::extract(&rgba, 2, 1, &options).unwrap();
        assert_eq!(index.mean_color(), Color::new(127.5, 127.5, 127.5));
    }
}
