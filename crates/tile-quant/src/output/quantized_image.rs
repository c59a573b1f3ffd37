//! QuantizedImage: finished palettes plus per-pixel flat indices.
//!
//! Indices are flat: pixel `i` is drawn with slot `indices[i] % C` of
//! palette `indices[i] / C`, where `C` is the colors per palette. Every
//! palette is stored at full length, so transparent policies keep the zero
//! color in slot 0.

/// Entries in an indexed color table.
pub const TABLE_ENTRIES: usize = 256;

/// The result of one quantization run.
///
/// # Example
///
/// ```
/// use tile_quant::QuantizedImage;
///
/// // 2×1 image, one palette of two colors
/// let image = QuantizedImage::new(
///     2,
///     1,
///     vec![vec![[0, 0, 0], [255, 255, 255]]],
///     vec![0, 1],
///     vec![0, 0, 0, 255, 255, 255, 255, 255],
///     false,
///     0.0,
/// );
///
/// assert_eq!(image.entry_count(), 2);
/// assert_eq!(image.color_at(1, 0), [255, 255, 255]);
/// assert_eq!(image.palette_table().unwrap().len(), 256 * 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedImage {
    width: u32,
    height: u32,
    /// One entry per palette, each `colors_per_palette` long.
    palettes: Vec<Vec<[u8; 3]>>,
    /// Flat palette index per pixel, row-major.
    indices: Vec<u16>,
    /// Reconstructed RGBA, transparent pixels passed through.
    rgba: Vec<u8>,
    transparent: bool,
    mse: f64,
}

impl QuantizedImage {
    /// Assemble an image from its parts.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts matching buffer lengths and uniform palette lengths.
    pub fn new(
        width: u32,
        height: u32,
        palettes: Vec<Vec<[u8; 3]>>,
        indices: Vec<u16>,
        rgba: Vec<u8>,
        transparent: bool,
        mse: f64,
    ) -> Self {
        let pixels = width as usize * height as usize;
        debug_assert_eq!(indices.len(), pixels, "one index per pixel");
        debug_assert_eq!(rgba.len(), pixels * 4, "four bytes per pixel");
        debug_assert!(
            palettes.windows(2).all(|w| w[0].len() == w[1].len()),
            "palettes must share one length"
        );
        Self {
            width,
            height,
            palettes,
            indices,
            rgba,
            transparent,
            mse,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of palettes.
    #[inline]
    pub fn palette_count(&self) -> usize {
        self.palettes.len()
    }

    /// Slots per palette, reserved slot 0 included.
    #[inline]
    pub fn colors_per_palette(&self) -> usize {
        self.palettes.first().map_or(0, Vec::len)
    }

    /// Palettes as RGB triples.
    #[inline]
    pub fn palettes(&self) -> &[Vec<[u8; 3]>] {
        &self.palettes
    }

    /// `palette_count * colors_per_palette`.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.palette_count() * self.colors_per_palette()
    }

    /// Flat per-pixel indices, row-major.
    #[inline]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Reconstructed RGBA buffer.
    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// True when slot 0 of every palette stands for transparency.
    #[inline]
    pub fn has_transparency(&self) -> bool {
        self.transparent
    }

    /// Mean weighted distance per eligible pixel.
    #[inline]
    pub fn mse(&self) -> f64 {
        self.mse
    }

    /// All palettes concatenated in order.
    pub fn flat_palette(&self) -> Vec<[u8; 3]> {
        self.palettes.iter().flatten().copied().collect()
    }

    /// Palette the pixel at `(x, y)` is drawn with.
    #[inline]
    pub fn palette_at(&self, x: u32, y: u32) -> usize {
        self.flat_index(x, y) / self.colors_per_palette().max(1)
    }

    /// Palette color of the pixel at `(x, y)`.
    #[inline]
    pub fn color_at(&self, x: u32, y: u32) -> [u8; 3] {
        let flat = self.flat_index(x, y);
        let cpp = self.colors_per_palette().max(1);
        self.palettes[flat / cpp][flat % cpp]
    }

    /// 256-entry `(B, G, R, 0)` table as used by 8-bit indexed bitmaps.
    ///
    /// Returns `None` when the palettes need more than 256 entries. Unused
    /// entries are zero.
    pub fn palette_table(&self) -> Option<Vec<u8>> {
        if self.entry_count() > TABLE_ENTRIES {
            return None;
        }
        let mut table = vec![0u8; TABLE_ENTRIES * 4];
        for (entry, [r, g, b]) in table.chunks_exact_mut(4).zip(self.flat_palette()) {
            entry[0] = b;
            entry[1] = g;
            entry[2] = r;
        }
        Some(table)
    }

    #[inline]
    fn flat_index(&self, x: u32, y: u32) -> usize {
        self.indices[y as usize * self.width as usize + x as usize] as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_palettes() -> QuantizedImage {
        QuantizedImage::new(
            2,
            2,
            vec![
                vec![[0, 0, 0], [10, 20, 30]],
                vec![[100, 100, 100], [250, 240, 230]],
            ],
            vec![0, 1, 2, 3],
            vec![0; 16],
            false,
            1.5,
        )
    }

    #[test]
    fn test_accessors() {
        let image = two_palettes();
        assert_eq!(image.palette_count(), 2);
        assert_eq!(image.colors_per_palette(), 2);
        assert_eq!(image.entry_count(), 4);
        assert_eq!(image.palette_at(1, 0), 0);
        assert_eq!(image.palette_at(0, 1), 1);
        assert_eq!(image.color_at(1, 1), [250, 240, 230]);
        assert_eq!(image.mse(), 1.5);
    }

    #[test]
    fn test_palette_table_is_bgr0() {
        let table = two_palettes().palette_table().unwrap();
        assert_eq!(table.len(), 1024);
        assert_eq!(&table[4..8], &[30, 20, 10, 0]);
        assert_eq!(&table[12..16], &[230, 240, 250, 0]);
        assert!(table[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_palette_table_requires_256_entries_or_fewer() {
        let image = QuantizedImage::new(
            1,
            1,
            vec![vec![[1, 1, 1]; 16]; 17],
            vec![0],
            vec![0; 4],
            false,
            0.0,
        );
        assert_eq!(image.entry_count(), 272);
        assert!(image.palette_table().is_none());
    }
}
