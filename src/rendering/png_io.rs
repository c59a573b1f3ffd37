use std::io::Cursor;

use tile_quant::{QuantizedImage, TABLE_ENTRIES};

use crate::error::AppError;

/// Decoded 8-bit RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode a PNG into 8-bit RGBA.
///
/// Palette, grayscale, gray+alpha and RGB images are expanded; 16-bit
/// channels are stripped to 8 bits.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, AppError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(AppError::Decode(format!(
            "unexpected bit depth {:?} after expansion",
            info.bit_depth
        )));
    }

    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Indexed => {
            return Err(AppError::Decode(
                "indexed data left unexpanded".to_string(),
            ))
        }
    };

    tracing::debug!(
        width = info.width,
        height = info.height,
        color_type = ?info.color_type,
        "Decoded PNG"
    );

    Ok(RgbaImage {
        width: info.width,
        height: info.height,
        pixels,
    })
}

/// Encode the reconstructed RGBA buffer as a truecolor PNG.
pub fn encode_rgba_png(image: &QuantizedImage) -> Result<Vec<u8>, AppError> {
    encode_png(
        image.width(),
        image.height(),
        png::ColorType::Rgba,
        None,
        None,
        image.rgba(),
    )
}

/// Encode the flat indices as an 8-bit indexed PNG.
///
/// All palettes are written back to back into PLTE. With a transparent
/// color-zero policy, slot 0 of every palette block is marked fully
/// transparent in tRNS.
pub fn encode_indexed_png(image: &QuantizedImage) -> Result<Vec<u8>, AppError> {
    let entries = image.entry_count();
    if entries > TABLE_ENTRIES {
        return Err(AppError::PaletteTooLarge { entries });
    }

    let plte: Vec<u8> = image.flat_palette().into_iter().flatten().collect();
    let trns = image.has_transparency().then(|| {
        let cpp = image.colors_per_palette();
        (0..entries)
            .map(|i| if i % cpp == 0 { 0 } else { 255 })
            .collect::<Vec<u8>>()
    });
    let data: Vec<u8> = image.indices().iter().map(|&i| i as u8).collect();

    encode_png(
        image.width(),
        image.height(),
        png::ColorType::Indexed,
        Some(plte),
        trns,
        &data,
    )
}

fn encode_png(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    plte: Option<Vec<u8>>,
    trns: Option<Vec<u8>>,
    data: &[u8],
) -> Result<Vec<u8>, AppError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        if let Some(trns) = trns {
            encoder.set_trns(trns);
        }
        let mut writer = encoder.write_header()?;
        writer.write_image_data(data)?;
    }
    Ok(buf.into_inner())
}
