//! 8-bit indexed BMP writer.
//!
//! Layout: 14-byte file header, 40-byte BITMAPINFOHEADER, a 256-entry
//! `(B, G, R, 0)` color table, then rows bottom to top, each padded to a
//! multiple of 4 bytes.

use tile_quant::QuantizedImage;

use crate::error::AppError;

const FILE_HEADER_SIZE: usize = 14;
const INFO_HEADER_SIZE: u32 = 40;
const BITS_PER_PIXEL: u16 = 8;

/// Encode `image` as an 8-bit indexed bitmap.
///
/// Fails with [`AppError::PaletteTooLarge`] when the palettes need more than
/// 256 table entries.
pub fn encode_indexed_bmp(image: &QuantizedImage) -> Result<Vec<u8>, AppError> {
    let table = image
        .palette_table()
        .ok_or(AppError::PaletteTooLarge {
            entries: image.entry_count(),
        })?;

    let width = image.width() as usize;
    let height = image.height() as usize;
    let row_stride = (width + 3) & !3;
    let pixel_data_size = row_stride * height;
    let pixel_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE as usize + table.len();
    let file_size = pixel_offset + pixel_data_size;

    let mut out = Vec::with_capacity(file_size);

    // File header
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // Reserved
    out.extend_from_slice(&(pixel_offset as u32).to_le_bytes());

    // Info header, positive height means bottom-up
    out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // Planes
    out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes()); // X pixels per meter
    out.extend_from_slice(&0i32.to_le_bytes()); // Y pixels per meter
    out.extend_from_slice(&0u32.to_le_bytes()); // Colors used: all
    out.extend_from_slice(&0u32.to_le_bytes()); // Important colors

    out.extend_from_slice(&table);

    let padding = row_stride - width;
    for row in image.indices().chunks_exact(width.max(1)).rev() {
        out.extend(row.iter().map(|&i| i as u8));
        out.extend(std::iter::repeat(0u8).take(padding));
    }

    tracing::debug!(
        width,
        height,
        bytes = out.len(),
        "Encoded indexed BMP"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    /// 3×2 image, two palettes of two colors.
    fn sample() -> QuantizedImage {
        QuantizedImage::new(
            3,
            2,
            vec![
                vec![[1, 2, 3], [4, 5, 6]],
                vec![[7, 8, 9], [10, 11, 12]],
            ],
            vec![0, 1, 0, 2, 3, 3],
            vec![0; 24],
            false,
            0.0,
        )
    }

    #[test]
    fn test_headers() {
        let bmp = encode_indexed_bmp(&sample()).unwrap();

        assert_eq!(&bmp[0..2], b"BM");
        // 14 + 40 + 1024 header bytes, two rows padded to 4
        assert_eq!(u32_at(&bmp, 10), 1078);
        assert_eq!(u32_at(&bmp, 2), 1078 + 8);
        assert_eq!(bmp.len(), 1078 + 8);

        assert_eq!(u32_at(&bmp, 14), 40);
        assert_eq!(u32_at(&bmp, 18), 3);
        assert_eq!(u32_at(&bmp, 22), 2);
        assert_eq!(u16_at(&bmp, 26), 1);
        assert_eq!(u16_at(&bmp, 28), 8);
        assert_eq!(u32_at(&bmp, 30), 0);
        assert_eq!(u32_at(&bmp, 34), 8);
    }

    #[test]
    fn test_color_table() {
        let bmp = encode_indexed_bmp(&sample()).unwrap();
        let table = &bmp[54..1078];

        assert_eq!(&table[0..4], &[3, 2, 1, 0]);
        assert_eq!(&table[4..8], &[6, 5, 4, 0]);
        assert_eq!(&table[8..12], &[9, 8, 7, 0]);
        assert_eq!(&table[12..16], &[12, 11, 10, 0]);
        assert!(table[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rows_bottom_up_and_padded() {
        let bmp = encode_indexed_bmp(&sample()).unwrap();
        let pixels = &bmp[1078..];

        // Bottom row first
        assert_eq!(pixels, &[2, 3, 3, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_too_many_entries() {
        let image = QuantizedImage::new(
            1,
            1,
            vec![vec![[0, 0, 0]; 16]; 17],
            vec![0],
            vec![0, 0, 0, 255],
            false,
            0.0,
        );
        match encode_indexed_bmp(&image) {
            Err(AppError::PaletteTooLarge { entries }) => assert_eq!(entries, 272),
            other => panic!("Expected PaletteTooLarge, got {other:?}"),
        }
    }
}
