//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use tile_quant::QuantizedImage;

/// Read a little-endian u32 at `offset`.
pub fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Assert `bytes` starts with a PNG signature.
pub fn assert_png(bytes: &[u8]) {
    assert!(
        bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "Expected PNG image, got {} bytes starting with {:?}",
        bytes.len(),
        &bytes[..8.min(bytes.len())]
    );
}

/// Assert `bytes` is an 8-bit indexed BMP of the given size.
pub fn assert_indexed_bmp(bytes: &[u8], width: u32, height: u32) {
    assert_eq!(&bytes[0..2], b"BM", "Missing BMP signature");
    let row_stride = (width as usize + 3) & !3;
    assert_eq!(u32_at(bytes, 10), 1078, "Pixel data offset");
    assert_eq!(bytes.len(), 1078 + row_stride * height as usize);
    assert_eq!(u32_at(bytes, 18), width);
    assert_eq!(u32_at(bytes, 22), height);
    assert_eq!(u16::from_le_bytes([bytes[28], bytes[29]]), 8, "Bits per pixel");
}

/// Assert every pixel of a tile is drawn from one palette and every flat
/// index is inside the palette set.
pub fn assert_tile_consistent(image: &QuantizedImage, tile_width: u32, tile_height: u32) {
    let entries = image.entry_count();
    assert!(
        image.indices().iter().all(|&i| (i as usize) < entries),
        "Index outside {entries} palette entries"
    );

    for ty in (0..image.height()).step_by(tile_height as usize) {
        for tx in (0..image.width()).step_by(tile_width as usize) {
            let palette = image.palette_at(tx, ty);
            for y in ty..(ty + tile_height).min(image.height()) {
                for x in tx..(tx + tile_width).min(image.width()) {
                    assert_eq!(
                        image.palette_at(x, y),
                        palette,
                        "Pixel ({x},{y}) leaves the palette of tile ({tx},{ty})"
                    );
                }
            }
        }
    }
}
