//! Image decoding

use imageproc::image::{DynamicImage, ImageDecoder, ImageReader, Limits, RgbImage};

use std::io::Cursor;

use crate::error::TransferError;

/// Decode uploaded bytes into an RGB pixel array
///
/// Any format the image crate can guess from the content is accepted.
/// EXIF orientation is applied, so a rotated phone photo comes out upright
/// with its width and height swapped accordingly. Alpha and extra channels
/// are dropped.
pub fn decode(data: &[u8], limits: Limits) -> Result<RgbImage, TransferError> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransferError::Decode(e.into()))?;
    reader.limits(limits);

    let mut decoder = reader.into_decoder().map_err(TransferError::Decode)?;
    let orientation = decoder.orientation().map_err(TransferError::Decode)?;

    let mut img = DynamicImage::from_decoder(decoder).map_err(TransferError::Decode)?;
    img.apply_orientation(orientation);

    Ok(img.into_rgb8())
}

/// Read image dimensions from the header without decoding pixel data
pub fn dimensions(data: &[u8]) -> Result<(u32, u32), TransferError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransferError::Decode(e.into()))?
        .into_dimensions()
        .map_err(TransferError::Decode)
}
