//! Image encoding: PNG bytes and base64 text

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use imageproc::image::codecs::png::{CompressionType, FilterType, PngEncoder};
use imageproc::image::{ExtendedColorType, ImageEncoder, ImageResult, RgbImage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// Compress an RGB image to PNG with the specified compression level
pub fn compress_to_png<W>(
    img: &RgbImage,
    writer: &mut W,
    compression: PngCompression,
) -> ImageResult<()>
where
    W: std::io::Write,
{
    let compression_type = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };

    let encoder = PngEncoder::new_with_quality(writer, compression_type, FilterType::Adaptive);

    encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
}

/// Encode an RGB image into an in-memory PNG buffer
pub fn encode_png(img: &RgbImage, compression: PngCompression) -> ImageResult<Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut buffer = Vec::with_capacity(width as usize * height as usize);
    compress_to_png(img, &mut buffer, compression)?;

    log::trace!("Encoded {width}x{height} PNG ({} bytes)", buffer.len());
    Ok(buffer)
}

/// Standard padded base64, suitable for `data:` URIs
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encode an RGB image as PNG and wrap it in base64 text
pub fn encode_png_base64(img: &RgbImage, compression: PngCompression) -> ImageResult<String> {
    encode_png(img, compression).map(|png| to_base64(&png))
}
