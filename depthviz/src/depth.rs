//! Depth estimation models
//!
//! A depth model turns an RGB image into a single-channel intensity field
//! of the same size. Larger values are treated as "closer" by the
//! colorization stage. The only model shipped here is [`GrayBlurModel`],
//! a stand-in that uses smoothed luminance as a depth proxy until a real
//! estimator is plugged in.

use anyhow::{ensure, Result};
use imageproc::image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// Single-channel depth field with the same dimensions as the source image
pub type DepthMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Kernel size used when no other is configured
pub const DEFAULT_KERNEL_SIZE: u32 = 7;

/// Anything that can estimate a depth field for an RGB image.
///
/// Plain functions and closures with the matching signature are models
/// too, so a real estimator can be dropped in without a wrapper type.
pub trait DepthModel {
    fn name(&self) -> &str {
        "custom"
    }

    fn estimate(&self, image: &RgbImage) -> Result<DepthMap>;
}

impl<F> DepthModel for F
where
    F: Fn(&RgbImage) -> Result<DepthMap>,
{
    fn estimate(&self, image: &RgbImage) -> Result<DepthMap> {
        self(image)
    }
}

/// Placeholder depth model: grayscale luminance smoothed by a Gaussian blur
#[derive(Debug, Clone, PartialEq)]
pub struct GrayBlurModel {
    kernel: Vec<f32>,
}

impl Default for GrayBlurModel {
    fn default() -> Self {
        Self {
            kernel: gaussian_kernel(DEFAULT_KERNEL_SIZE),
        }
    }
}

impl GrayBlurModel {
    /// Build the model with a square blur kernel of `kernel_size` pixels.
    /// The size must be odd so the kernel has a center tap.
    pub fn new(kernel_size: u32) -> Result<Self> {
        ensure!(
            kernel_size % 2 == 1,
            "blur kernel size must be odd, got {kernel_size}"
        );
        Ok(Self {
            kernel: gaussian_kernel(kernel_size),
        })
    }

    pub fn kernel_size(&self) -> u32 {
        self.kernel.len() as u32
    }
}

impl DepthModel for GrayBlurModel {
    fn name(&self) -> &str {
        "gray-blur"
    }

    fn estimate(&self, image: &RgbImage) -> Result<DepthMap> {
        let gray = to_grayscale(image);
        Ok(separable_blur(&gray, &self.kernel))
    }
}

/// BT.601 luma with the usual 14-bit fixed point weights
#[inline]
pub fn luminance(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
    y as u8
}

pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    imageproc::map::map_colors(image, |pixel| Luma([luminance(pixel)]))
}

/// 1-D Gaussian weights for an odd `size`, with sigma derived from the size.
///
/// Sizes up to 7 use the fixed binomial-like tables; larger sizes sample
/// the Gaussian with `sigma = 0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    match size {
        1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
        _ => {
            let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
            let center = (size / 2) as f32;
            let weights: Vec<f32> = (0..size)
                .map(|i| {
                    let x = i as f32 - center;
                    (-(x * x) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let sum: f32 = weights.iter().sum();
            weights.into_iter().map(|w| w / sum).collect()
        }
    }
}

/// Mirror an out-of-range index back into `0..len` without repeating the edge
/// sample (`dcb|abcd|cba`)
#[inline]
fn reflect_101(index: i64, len: i64) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}

/// Horizontal then vertical pass of `kernel`, rounded back to 8-bit levels
fn separable_blur(gray: &GrayImage, kernel: &[f32]) -> DepthMap {
    let (width, height) = gray.dimensions();
    let radius = (kernel.len() / 2) as i64;

    let mut horizontal = vec![0f32; width as usize * height as usize];
    for y in 0..height {
        for x in 0..width {
            let acc: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sx = reflect_101(x as i64 + k as i64 - radius, width as i64);
                    weight * gray.get_pixel(sx, y)[0] as f32
                })
                .sum();
            horizontal[y as usize * width as usize + x as usize] = acc;
        }
    }

    DepthMap::from_fn(width, height, |x, y| {
        let acc: f32 = kernel
            .iter()
            .enumerate()
            .map(|(k, weight)| {
                let sy = reflect_101(y as i64 + k as i64 - radius, height as i64);
                weight * horizontal[sy as usize * width as usize + x as usize]
            })
            .sum();
        Luma([acc.round().clamp(0.0, 255.0)])
    })
}
