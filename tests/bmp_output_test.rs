//! Indexed bitmap output for quantized images.

mod common;

use common::fixtures;
use pretty_assertions::assert_eq;
use tile_quant::{ColorZeroBehavior, QuantizationOptions, TiledQuantizer};
use tilepal::rendering::encode_indexed_bmp;

#[test]
fn test_indexed_bmp_matches_quantized_image() {
    let (width, height) = (64, 32);
    let options = QuantizationOptions::new()
        .tile_size(8, 8)
        .palettes(8, 4)
        .seed(21);
    let image = TiledQuantizer::new(options)
        .unwrap()
        .quantize(&fixtures::gradient(width, height), width, height)
        .unwrap();

    let bmp = encode_indexed_bmp(&image).unwrap();
    common::assert_indexed_bmp(&bmp, width, height);

    // Color table is the flattened palettes, unused entries zero
    let table = &bmp[54..1078];
    assert_eq!(table, image.palette_table().unwrap().as_slice());
    for (i, [r, g, b]) in image.flat_palette().into_iter().enumerate() {
        assert_eq!(&table[i * 4..i * 4 + 4], &[b, g, r, 0]);
    }
    assert!(table[32 * 4..].iter().all(|&v| v == 0));

    // Rows are stored bottom to top; width 64 needs no padding
    let pixels = &bmp[1078..];
    for y in 0..height as usize {
        let stored = &pixels[(height as usize - 1 - y) * 64..][..64];
        let expected: Vec<u8> = image.indices()[y * 64..(y + 1) * 64]
            .iter()
            .map(|&i| i as u8)
            .collect();
        assert_eq!(stored, expected.as_slice(), "row {y}");
    }
    assert!(pixels.iter().all(|&i| i < 32));
    common::assert_tile_consistent(&image, 8, 8);
}

#[test]
fn test_indexed_bmp_pads_odd_width() {
    let (width, height) = (10, 6);
    let options = QuantizationOptions::new()
        .tile_size(5, 3)
        .palettes(2, 4)
        .seed(22);
    let image = TiledQuantizer::new(options)
        .unwrap()
        .quantize(&fixtures::gradient(width, height), width, height)
        .unwrap();

    let bmp = encode_indexed_bmp(&image).unwrap();
    common::assert_indexed_bmp(&bmp, width, height);

    for row in bmp[1078..].chunks_exact(12) {
        assert_eq!(&row[10..], &[0, 0]);
    }
}

#[test]
fn test_transparent_slot_zero_in_every_block() {
    let (width, height) = (32, 32);
    let options = QuantizationOptions::new()
        .tile_size(8, 8)
        .palettes(4, 4)
        .color_zero(ColorZeroBehavior::TransparentFromAlpha, [255, 0, 255])
        .seed(23);
    let rgba = fixtures::framed_gradient(width, height, 4);
    let image = TiledQuantizer::new(options)
        .unwrap()
        .quantize(&rgba, width, height)
        .unwrap();

    let bmp = encode_indexed_bmp(&image).unwrap();
    let table = &bmp[54..1078];
    for block in 0..4 {
        assert_eq!(&table[block * 16..block * 16 + 4], &[255, 0, 255, 0]);
    }

    // Transparent pixels point at slot 0 of their block
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        if px[3] == 0 {
            assert_eq!(image.indices()[i] % 4, 0, "pixel {i}");
        }
    }
    common::assert_tile_consistent(&image, 8, 8);
}
