//! Quantization options and configuration.
//!
//! [`QuantizationOptions`] is immutable for the duration of a run: it is
//! validated once by [`QuantizationOptions::validate`] and then only read.

use std::fmt;
use std::str::FromStr;

use crate::api::{ParseOptionError, QuantizeError};
use crate::color::Color;

/// Whether, and how carefully, palettes are learned for dithered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherMode {
    /// Plain nearest-color mapping. The image is reduced to the target bit
    /// depth before learning and palettes get a final k-means polish.
    #[default]
    Off,
    /// Dithered lookups with the regular learning rates.
    Fast,
    /// Dithered lookups with smaller learning rates and a fifth of the
    /// samples per pass.
    Slow,
}

impl DitherMode {
    /// True for [`Fast`](Self::Fast) and [`Slow`](Self::Slow).
    #[inline]
    pub fn is_enabled(self) -> bool {
        self != DitherMode::Off
    }
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DitherMode::Off => "off",
            DitherMode::Fast => "fast",
            DitherMode::Slow => "slow",
        };
        f.write_str(name)
    }
}

impl FromStr for DitherMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(DitherMode::Off),
            "fast" => Ok(DitherMode::Fast),
            "slow" => Ok(DitherMode::Slow),
            _ => Err(ParseOptionError {
                kind: "dither mode",
                value: s.to_string(),
                expected: "off, fast, slow",
            }),
        }
    }
}

/// Spatial 2×2 pattern used to pick among brightness-ranked dither
/// candidates.
///
/// The `*4` patterns rank four candidates, the `*2` patterns two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherPattern {
    /// Bayer-style diagonal order over four candidates.
    #[default]
    Diagonal4,
    /// Dark pair on even rows, bright pair on odd rows.
    Horizontal4,
    /// Dark pair on even columns, bright pair on odd columns.
    Vertical4,
    /// Checkerboard over two candidates.
    Diagonal2,
    /// Alternating rows over two candidates.
    Horizontal2,
    /// Alternating columns over two candidates.
    Vertical2,
}

impl DitherPattern {
    /// All patterns, in declaration order.
    pub const ALL: [DitherPattern; 6] = [
        DitherPattern::Diagonal4,
        DitherPattern::Horizontal4,
        DitherPattern::Vertical4,
        DitherPattern::Diagonal2,
        DitherPattern::Horizontal2,
        DitherPattern::Vertical2,
    ];

    /// Rank matrix indexed `[y % 2][x % 2]`.
    #[inline]
    pub fn matrix(self) -> [[usize; 2]; 2] {
        match self {
            DitherPattern::Diagonal4 => [[0, 2], [3, 1]],
            DitherPattern::Horizontal4 => [[0, 1], [3, 2]],
            DitherPattern::Vertical4 => [[0, 3], [1, 2]],
            DitherPattern::Diagonal2 => [[0, 1], [1, 0]],
            DitherPattern::Horizontal2 => [[0, 0], [1, 1]],
            DitherPattern::Vertical2 => [[0, 1], [0, 1]],
        }
    }

    /// Number of candidates the pattern ranks (2 or 4).
    #[inline]
    pub fn levels(self) -> usize {
        match self {
            DitherPattern::Diagonal4 | DitherPattern::Horizontal4 | DitherPattern::Vertical4 => 4,
            DitherPattern::Diagonal2 | DitherPattern::Horizontal2 | DitherPattern::Vertical2 => 2,
        }
    }

    /// Candidate rank for the pixel at `(x, y)`.
    #[inline]
    pub fn rank(self, x: u32, y: u32) -> usize {
        self.matrix()[(y % 2) as usize][(x % 2) as usize]
    }
}

impl fmt::Display for DitherPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DitherPattern::Diagonal4 => "diagonal4",
            DitherPattern::Horizontal4 => "horizontal4",
            DitherPattern::Vertical4 => "vertical4",
            DitherPattern::Diagonal2 => "diagonal2",
            DitherPattern::Horizontal2 => "horizontal2",
            DitherPattern::Vertical2 => "vertical2",
        };
        f.write_str(name)
    }
}

impl FromStr for DitherPattern {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DitherPattern::ALL
            .into_iter()
            .find(|p| p.to_string() == wanted)
            .ok_or_else(|| ParseOptionError {
                kind: "dither pattern",
                value: s.to_string(),
                expected: "diagonal4, horizontal4, vertical4, diagonal2, horizontal2, vertical2",
            })
    }
}

/// How slot 0 of every palette is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorZeroBehavior {
    /// Slot 0 is an ordinary learned color.
    #[default]
    Unique,
    /// Slot 0 holds the configured zero color in every palette and is never
    /// moved or reordered.
    Shared,
    /// Pixels with alpha below 255 are transparent and map to slot 0.
    TransparentFromAlpha,
    /// Pixels equal to the configured zero color are transparent and map to
    /// slot 0.
    TransparentFromColor,
}

impl ColorZeroBehavior {
    /// True when slot 0 is reserved for transparency and not learned.
    #[inline]
    pub fn is_transparent(self) -> bool {
        matches!(
            self,
            ColorZeroBehavior::TransparentFromAlpha | ColorZeroBehavior::TransparentFromColor
        )
    }

    /// Slots that precede the learned colors in the output palette.
    #[inline]
    pub fn reserved_slots(self) -> usize {
        usize::from(self.is_transparent())
    }

    /// Leading learned slots that must never be moved or reordered.
    #[inline]
    pub fn pinned_slots(self) -> usize {
        usize::from(self == ColorZeroBehavior::Shared)
    }
}

impl fmt::Display for ColorZeroBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorZeroBehavior::Unique => "unique",
            ColorZeroBehavior::Shared => "shared",
            ColorZeroBehavior::TransparentFromAlpha => "transparent-from-alpha",
            ColorZeroBehavior::TransparentFromColor => "transparent-from-color",
        };
        f.write_str(name)
    }
}

impl FromStr for ColorZeroBehavior {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unique" => Ok(ColorZeroBehavior::Unique),
            "shared" => Ok(ColorZeroBehavior::Shared),
            "transparent-from-alpha" | "transparent-from-transparent" => {
                Ok(ColorZeroBehavior::TransparentFromAlpha)
            }
            "transparent-from-color" => Ok(ColorZeroBehavior::TransparentFromColor),
            _ => Err(ParseOptionError {
                kind: "color-zero behavior",
                value: s.to_string(),
                expected: "unique, shared, transparent-from-alpha, transparent-from-color",
            }),
        }
    }
}

/// Configuration of one quantization run.
///
/// # Defaults
///
/// - 8×8 tiles, 8 palettes of 4 colors, 5 bits per channel
/// - 10% of the pixels sampled per refinement pass
/// - Dithering off, [`DitherPattern::Diagonal4`], weight 0.5
/// - [`ColorZeroBehavior::Unique`], zero color black, unseeded
///
/// # Example
///
/// ```
/// use tile_quant::{DitherMode, QuantizationOptions};
///
/// let options = QuantizationOptions::new()
///     .tile_size(8, 8)
///     .palettes(4, 16)
///     .bits_per_channel(5)
///     .dither(DitherMode::Fast)
///     .seed(42);
///
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizationOptions {
    /// Tile width in pixels (1..=256).
    pub tile_width: u32,
    /// Tile height in pixels (1..=256).
    pub tile_height: u32,
    /// Number of palettes (1..=256).
    pub palette_count: usize,
    /// Colors per palette including any reserved slot 0 (2..=256).
    pub colors_per_palette: usize,
    /// Bits per output channel (2..=8).
    pub bits_per_channel: u8,
    /// Share of the pixel count sampled per refinement pass (0.0..=1.0).
    pub fraction_of_pixels: f64,
    /// Dithering mode.
    pub dither: DitherMode,
    /// Spatial dither pattern.
    pub dither_pattern: DitherPattern,
    /// Strength of error diffusion between dither candidates (0.0..=1.0).
    pub dither_weight: f64,
    /// Slot 0 policy.
    pub color_zero: ColorZeroBehavior,
    /// Color used by [`ColorZeroBehavior::Shared`] and the transparent
    /// policies.
    pub zero_color: [u8; 3],
    /// Seed for a reproducible run. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for QuantizationOptions {
    fn default() -> Self {
        Self {
            tile_width: 8,
            tile_height: 8,
            palette_count: 8,
            colors_per_palette: 4,
            bits_per_channel: 5,
            fraction_of_pixels: 0.1,
            dither: DitherMode::Off,
            dither_pattern: DitherPattern::Diagonal4,
            dither_weight: 0.5,
            color_zero: ColorZeroBehavior::Unique,
            zero_color: [0, 0, 0],
            seed: None,
        }
    }
}

impl QuantizationOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tile dimensions.
    #[inline]
    pub fn tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    /// Set the palette count and the colors per palette.
    #[inline]
    pub fn palettes(mut self, count: usize, colors_per_palette: usize) -> Self {
        self.palette_count = count;
        self.colors_per_palette = colors_per_palette;
        self
    }

    /// Set the bits per output channel.
    #[inline]
    pub fn bits_per_channel(mut self, bits: u8) -> Self {
        self.bits_per_channel = bits;
        self
    }

    /// Set the share of pixels sampled per refinement pass.
    #[inline]
    pub fn fraction_of_pixels(mut self, fraction: f64) -> Self {
        self.fraction_of_pixels = fraction;
        self
    }

    /// Set the dithering mode.
    #[inline]
    pub fn dither(mut self, mode: DitherMode) -> Self {
        self.dither = mode;
        self
    }

    /// Set the spatial dither pattern.
    #[inline]
    pub fn dither_pattern(mut self, pattern: DitherPattern) -> Self {
        self.dither_pattern = pattern;
        self
    }

    /// Set the error diffusion weight.
    #[inline]
    pub fn dither_weight(mut self, weight: f64) -> Self {
        self.dither_weight = weight;
        self
    }

    /// Set the slot 0 policy and its color.
    #[inline]
    pub fn color_zero(mut self, behavior: ColorZeroBehavior, color: [u8; 3]) -> Self {
        self.color_zero = behavior;
        self.zero_color = color;
        self
    }

    /// Make the run reproducible.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every option against its documented range.
    pub fn validate(&self) -> Result<(), QuantizeError> {
        check_range("tile_width", self.tile_width as usize, 1, 256)?;
        check_range("tile_height", self.tile_height as usize, 1, 256)?;
        check_range("palette_count", self.palette_count, 1, 256)?;
        check_range("colors_per_palette", self.colors_per_palette, 2, 256)?;
        check_range("bits_per_channel", self.bits_per_channel as usize, 2, 8)?;

        if !(0.0..=1.0).contains(&self.fraction_of_pixels) {
            return Err(QuantizeError::InvalidOption {
                name: "fraction_of_pixels",
                value: self.fraction_of_pixels.to_string(),
                range: "0.0..=1.0",
            });
        }
        if !(0.0..=1.0).contains(&self.dither_weight) {
            return Err(QuantizeError::InvalidOption {
                name: "dither_weight",
                value: self.dither_weight.to_string(),
                range: "0.0..=1.0",
            });
        }
        Ok(())
    }

    /// Colors the engine learns per palette (reserved transparent slot
    /// excluded, pinned shared slot included).
    #[inline]
    pub fn learned_colors(&self) -> usize {
        self.colors_per_palette - self.color_zero.reserved_slots()
    }

    /// The configured zero color as a [`Color`].
    #[inline]
    pub fn zero(&self) -> Color {
        Color::from_bytes(self.zero_color)
    }
}

fn check_range(
    name: &'static str,
    value: usize,
    min: usize,
    max: usize,
) -> Result<(), QuantizeError> {
    if value < min || value > max {
        let range = match (min, max) {
            (1, 256) => "1..=256",
            (2, 256) => "2..=256",
            (2, 8) => "2..=8",
            _ => "see documentation",
        };
        return Err(QuantizeError::InvalidOption {
            name,
            value: value.to_string(),
            range,
        });
    }
    Ok(())
}
