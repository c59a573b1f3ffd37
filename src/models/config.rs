use crate::error::AppError;
use serde::Deserialize;
use std::path::Path;
use tile_quant::{
    Color, ColorZeroBehavior, DitherMode, DitherPattern, QuantizationOptions,
};

/// Quantization preset loaded from a YAML file.
///
/// Every field is optional in the file; missing fields take the library
/// defaults. Enum-like fields are kebab-case strings, colors are hex.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct QuantizeConfig {
    /// Tile width in pixels
    pub tile_width: u32,

    /// Tile height in pixels
    pub tile_height: u32,

    /// Number of palettes
    pub palettes: usize,

    /// Colors per palette, including a reserved slot 0
    pub colors: usize,

    /// Bits per output channel
    pub bits: u8,

    /// Share of pixels sampled per refinement pass
    pub fraction: f64,

    /// "off", "fast" or "slow"
    pub dither: String,

    /// Spatial dither pattern name (e.g. "diagonal4")
    pub pattern: String,

    /// Error diffusion weight
    pub dither_weight: f64,

    /// "unique", "shared", "transparent-from-alpha" or "transparent-from-color"
    pub color_zero: String,

    /// Hex color used by the shared and transparent policies
    pub zero_color: String,

    /// Seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        let defaults = QuantizationOptions::default();
        let [r, g, b] = defaults.zero_color;
        Self {
            tile_width: defaults.tile_width,
            tile_height: defaults.tile_height,
            palettes: defaults.palette_count,
            colors: defaults.colors_per_palette,
            bits: defaults.bits_per_channel,
            fraction: defaults.fraction_of_pixels,
            dither: defaults.dither.to_string(),
            pattern: defaults.dither_pattern.to_string(),
            dither_weight: defaults.dither_weight,
            color_zero: defaults.color_zero.to_string(),
            zero_color: format!("#{r:02X}{g:02X}{b:02X}"),
            seed: defaults.seed,
        }
    }
}

impl QuantizeConfig {
    /// Parse a preset from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, AppError> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a preset file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            palettes = config.palettes,
            colors = config.colors,
            "Loaded preset"
        );
        Ok(config)
    }

    /// Convert to library options. Values are range-checked later by the
    /// quantizer; only names and colors are parsed here.
    pub fn to_options(&self) -> Result<QuantizationOptions, AppError> {
        let dither: DitherMode = self
            .dither
            .parse()
            .map_err(|e: tile_quant::ParseOptionError| AppError::Config(e.to_string()))?;
        let pattern: DitherPattern = self
            .pattern
            .parse()
            .map_err(|e: tile_quant::ParseOptionError| AppError::Config(e.to_string()))?;
        let color_zero: ColorZeroBehavior = self
            .color_zero
            .parse()
            .map_err(|e: tile_quant::ParseOptionError| AppError::Config(e.to_string()))?;
        let zero: Color = self
            .zero_color
            .parse()
            .map_err(|e| AppError::Config(format!("zero_color '{}': {e}", self.zero_color)))?;

        let mut options = QuantizationOptions::new()
            .tile_size(self.tile_width, self.tile_height)
            .palettes(self.palettes, self.colors)
            .bits_per_channel(self.bits)
            .fraction_of_pixels(self.fraction)
            .dither(dither)
            .dither_pattern(pattern)
            .dither_weight(self.dither_weight)
            .color_zero(color_zero, zero.to_bytes());
        options.seed = self.seed;
        Ok(options)
    }
}
