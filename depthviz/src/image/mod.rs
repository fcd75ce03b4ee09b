//! Pseudo-depth rendering pipeline
//!
//! depth model -> normalize -> (invert) -> colorize -> PNG -> base64
//!
//! Every stage is a pure function of its input, so the same image and
//! options always produce byte-identical output.

pub mod decode;
mod encode;
mod transform;

// Re-export public API
pub use encode::{compress_to_png, encode_png, encode_png_base64, to_base64, PngCompression};
pub use transform::{colorize, invert, jet, normalize};

use imageproc::image::{GrayImage, RgbImage};

use crate::depth::{DepthModel, GrayBlurModel};
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Flip the depth levels so near and far swap colors
    pub invert: bool,
    pub png_compression: PngCompression,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            invert: true,
            png_compression: PngCompression::Default,
        }
    }
}

/// Render `image` through the stand-in depth model and return a base64 PNG
pub fn render_pseudo_depth(image: &RgbImage, invert: bool) -> Result<String, PipelineError> {
    let options = RenderOptions {
        invert,
        ..RenderOptions::default()
    };
    render_with(&GrayBlurModel::default(), image, &options)
}

/// Render `image` through `model` and return a base64 PNG
pub fn render_with<M>(
    model: &M,
    image: &RgbImage,
    options: &RenderOptions,
) -> Result<String, PipelineError>
where
    M: DepthModel + ?Sized,
{
    let colored = render_image(model, image, options.invert)?;
    encode_png_base64(&colored, options.png_compression).map_err(PipelineError::Encoding)
}

/// Color-mapped depth image, before encoding
pub fn render_image<M>(
    model: &M,
    image: &RgbImage,
    invert: bool,
) -> Result<RgbImage, PipelineError>
where
    M: DepthModel + ?Sized,
{
    let levels = depth_levels(model, image, invert)?;
    Ok(colorize(&levels))
}

/// Normalized (and optionally inverted) 8-bit depth levels, before colorization
pub fn depth_levels<M>(
    model: &M,
    image: &RgbImage,
    invert: bool,
) -> Result<GrayImage, PipelineError>
where
    M: DepthModel + ?Sized,
{
    let (width, height) = image.dimensions();
    log::debug!(
        "Estimating depth for {width}x{height} image with `{}` model",
        model.name()
    );

    let depth = model.estimate(image).map_err(PipelineError::Model)?;

    if depth.dimensions() != image.dimensions() {
        return Err(PipelineError::DimensionMismatch {
            expected: image.dimensions(),
            actual: depth.dimensions(),
        });
    }

    let levels = normalize(&depth);
    Ok(if invert {
        transform::invert(levels)
    } else {
        levels
    })
}
