//! Image file formats: PNG in, indexed BMP / PNG out, JSON palette report.

pub mod bmp;
pub mod png_io;
pub mod report;

use std::path::Path;

use tile_quant::{QuantizedImage, TABLE_ENTRIES};

use crate::error::AppError;

pub use bmp::encode_indexed_bmp;
pub use png_io::{decode_png, encode_indexed_png, encode_rgba_png, RgbaImage};
pub use report::{palette_report, PaletteReport};

/// Output file format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    IndexedBmp,
    IndexedPng,
    RgbaPng,
}

impl OutputFormat {
    /// Format for writing `image` to `path`.
    pub fn for_path(path: &Path, image: &QuantizedImage) -> Result<Self, AppError> {
        Self::for_entries(path, image.entry_count())
    }

    /// Format for a palette set of `entries` colors in total, known before
    /// quantizing. `.bmp` is always indexed and fails above 256 entries;
    /// `.png` is indexed up to 256 entries and truecolor beyond.
    pub fn for_entries(path: &Path, entries: usize) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "bmp" if entries <= TABLE_ENTRIES => Ok(OutputFormat::IndexedBmp),
            "bmp" => Err(AppError::PaletteTooLarge { entries }),
            "png" if entries <= TABLE_ENTRIES => Ok(OutputFormat::IndexedPng),
            "png" => Ok(OutputFormat::RgbaPng),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn encode(self, image: &QuantizedImage) -> Result<Vec<u8>, AppError> {
        match self {
            OutputFormat::IndexedBmp => encode_indexed_bmp(image),
            OutputFormat::IndexedPng => encode_indexed_png(image),
            OutputFormat::RgbaPng => encode_rgba_png(image),
        }
    }
}
