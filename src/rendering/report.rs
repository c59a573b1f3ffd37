use serde::Serialize;
use tile_quant::QuantizedImage;

/// JSON summary of a finished run, written by `--report`.
#[derive(Debug, Serialize, PartialEq)]
pub struct PaletteReport {
    pub width: u32,
    pub height: u32,
    pub palette_count: usize,
    pub colors_per_palette: usize,
    pub transparent_slot_zero: bool,
    pub mse: f64,
    /// Palettes as `#RRGGBB` strings.
    pub palettes: Vec<Vec<String>>,
    /// Number of tiles drawn with each palette.
    pub tiles_per_palette: Vec<usize>,
}

impl PaletteReport {
    pub fn from_image(image: &QuantizedImage, tile_width: u32, tile_height: u32) -> Self {
        let palettes = image
            .palettes()
            .iter()
            .map(|palette| palette.iter().map(|&rgb| hex(rgb)).collect())
            .collect();

        let mut tiles_per_palette = vec![0; image.palette_count()];
        for y in (0..image.height()).step_by(tile_height.max(1) as usize) {
            for x in (0..image.width()).step_by(tile_width.max(1) as usize) {
                tiles_per_palette[image.palette_at(x, y)] += 1;
            }
        }

        Self {
            width: image.width(),
            height: image.height(),
            palette_count: image.palette_count(),
            colors_per_palette: image.colors_per_palette(),
            transparent_slot_zero: image.has_transparency(),
            mse: image.mse(),
            palettes,
            tiles_per_palette,
        }
    }
}

/// Pretty-printed JSON report for `image`.
pub fn palette_report(
    image: &QuantizedImage,
    tile_width: u32,
    tile_height: u32,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PaletteReport::from_image(image, tile_width, tile_height))
}

fn hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}
