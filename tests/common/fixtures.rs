//! Synthetic test images.

use std::io::Cursor;

/// Horizontal red ramp over a vertical blue ramp.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(2).saturating_sub(1)).min(255) as u8;
            let b = (y * 255 / height.max(2).saturating_sub(1)).min(255) as u8;
            rgba.extend_from_slice(&[r, 128, b, 255]);
        }
    }
    rgba
}

/// Four flat color quadrants.
pub fn quadrants(size: u32) -> Vec<u8> {
    const COLORS: [[u8; 4]; 4] = [
        [255, 0, 0, 255],
        [0, 255, 0, 255],
        [0, 0, 255, 255],
        [255, 255, 0, 255],
    ];
    let half = size / 2;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let q = (y / half) * 2 + x / half;
            rgba.extend_from_slice(&COLORS[q as usize]);
        }
    }
    rgba
}

/// Gradient with a fully transparent frame `border` pixels wide.
pub fn framed_gradient(width: u32, height: u32, border: u32) -> Vec<u8> {
    let mut rgba = gradient(width, height);
    for y in 0..height {
        for x in 0..width {
            let inside = x >= border && y >= border && x < width - border && y < height - border;
            if !inside {
                rgba[((y * width + x) * 4 + 3) as usize] = 0;
            }
        }
    }
    rgba
}

/// Encode an RGBA buffer as an 8-bit RGBA PNG.
pub fn rgba_png(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    encode(rgba, width, height, png::ColorType::Rgba)
}

/// Encode an RGB buffer as an 8-bit RGB PNG.
pub fn rgb_png(rgb: &[u8], width: u32, height: u32) -> Vec<u8> {
    encode(rgb, width, height, png::ColorType::Rgb)
}

fn encode(data: &[u8], width: u32, height: u32, color_type: png::ColorType) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }
    buf.into_inner()
}

/// Preset exercising every field.
pub const FULL_PRESET: &str = r##"
tile_width: 8
tile_height: 8
palettes: 4
colors: 8
bits: 5
fraction: 0.2
dither: fast
pattern: diagonal2
dither_weight: 0.5
color_zero: transparent-from-alpha
zero_color: "#FF00FF"
seed: 7
"##;
