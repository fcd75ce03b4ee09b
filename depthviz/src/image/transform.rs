//! Depth field transformations: min-max normalization, inversion, colorization

use imageproc::image::{imageops, GrayImage, Luma, Rgb, RgbImage};

use crate::depth::DepthMap;

/// Jet color map lookup table
/// Built once on first use; 256 entries from dark blue through cyan, green
/// and yellow to dark red
static JET_LUT: std::sync::OnceLock<[[u8; 3]; 256]> = std::sync::OnceLock::new();

fn jet_lut() -> &'static [[u8; 3]; 256] {
    JET_LUT.get_or_init(|| {
        let channel = |t: f32, offset: f32| {
            let v = (1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0);
            (v * 255.0).round() as u8
        };

        let mut lut = [[0u8; 3]; 256];
        for (i, color) in lut.iter_mut().enumerate() {
            let t = i as f32 / 255.0;
            *color = [channel(t, 3.0), channel(t, 2.0), channel(t, 1.0)];
        }
        lut
    })
}

/// Jet color for a single 8-bit intensity
#[inline]
pub fn jet(value: u8) -> Rgb<u8> {
    Rgb(jet_lut()[value as usize])
}

/// Stretch the depth field linearly so its minimum maps to 0 and its maximum to 255
///
/// Halfway levels round to even. A uniform field has no range to stretch
/// and comes back all zeros.
pub fn normalize(depth: &DepthMap) -> GrayImage {
    let (width, height) = depth.dimensions();

    let (min, max) = depth
        .pixels()
        .map(|p| p[0])
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    // Only stretch if there's a range to work with
    let range = max - min;
    if range.is_nan() || range <= f32::EPSILON {
        log::debug!("Depth field is uniform ({min}), normalizing to zeros");
        return GrayImage::new(width, height);
    }

    let scale = 255.0 / range;
    GrayImage::from_fn(width, height, |x, y| {
        let v = (depth.get_pixel(x, y)[0] - min) * scale;
        Luma([v.round_ties_even().clamp(0.0, 255.0) as u8])
    })
}

/// Replace every level `v` with `255 - v`
pub fn invert(mut img: GrayImage) -> GrayImage {
    imageops::colorops::invert(&mut img);
    img
}

/// Map every level through the jet color map
pub fn colorize(img: &GrayImage) -> RgbImage {
    imageproc::map::map_colors(img, |pixel| jet(pixel[0]))
}
