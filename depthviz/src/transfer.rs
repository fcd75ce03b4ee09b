//! Upload handling: turns a submitted form into a pair of displayable images

use imageproc::image::{Limits, RgbImage};

use std::collections::HashMap;

use crate::config::DepthConfig;
use crate::error::{PipelineError, TransferError};
use crate::image::{self, decode};

/// Form field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// Files submitted with a multipart form, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    files: HashMap<String, Vec<u8>>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form with the image field set to `bytes`
    pub fn with_image(bytes: impl Into<Vec<u8>>) -> Self {
        let mut form = Self::new();
        form.insert(IMAGE_FIELD, bytes);
        form
    }

    pub fn insert(&mut self, field: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(field.into(), bytes.into());
    }

    pub fn get(&self, field: &str) -> Option<&[u8]> {
        self.files.get(field).map(Vec::as_slice)
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.get(IMAGE_FIELD)
    }
}

/// Result of a successful conversion, both images as base64 PNG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub original_base64: String,
    pub depth_base64: String,
    pub dimensions: (u32, u32),
}

/// Decode the uploaded image and render its pseudo-depth visualization
pub fn convert(form: &UploadForm, config: &DepthConfig) -> Result<Conversion, TransferError> {
    let bytes = form.image().ok_or(TransferError::MissingUpload)?;
    log::debug!("Received upload of {} bytes", bytes.len());

    let rgb = decode_upload(bytes, config)?;
    let dimensions = rgb.dimensions();

    let model = config
        .depth_model()
        .map_err(|e| TransferError::Pipeline(PipelineError::Model(e)))?;
    let depth_base64 = image::render_with(&model, &rgb, &config.render_options())?;

    // The original is re-encoded so the page can always embed it as PNG
    let original_base64 = image::encode_png_base64(&rgb, config.png_compression)
        .map_err(|e| TransferError::Pipeline(PipelineError::Encoding(e)))?;

    log::info!("Converted {}x{} upload", dimensions.0, dimensions.1);

    Ok(Conversion {
        original_base64,
        depth_base64,
        dimensions,
    })
}

/// Decode uploaded bytes to RGB, enforcing the configured pixel limit
///
/// Without a limit the decoder's own allocation caps are lifted too, so
/// any image that fits in memory is accepted.
pub fn decode_upload(bytes: &[u8], config: &DepthConfig) -> Result<RgbImage, TransferError> {
    let limits = match config.max_pixels {
        Some(limit) => {
            check_pixel_limit(bytes, limit)?;
            Limits::default()
        }
        None => Limits::no_limits(),
    };

    decode::decode(bytes, limits)
}

/// Reject oversized images using only the header, before any pixels are decoded
fn check_pixel_limit(bytes: &[u8], limit: u64) -> Result<(), TransferError> {
    let (width, height) = decode::dimensions(bytes)?;

    if width as u64 * height as u64 > limit {
        log::warn!("Rejecting {width}x{height} upload, limit is {limit} pixels");
        return Err(TransferError::TooLarge {
            width,
            height,
            limit,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PngCompression;
    use imageproc::image::codecs::jpeg::JpegEncoder;
    use imageproc::image::{load_from_memory, Rgb};

    fn jpeg_with_orientation(width: u32, height: u32, orientation: u8) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| Rgb([x as u8 * 30, 90, 160]));
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, 95)
            .encode_image(&img)
            .unwrap();

        // APP1 segment: "Exif\0\0" + little-endian TIFF with one IFD entry
        let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
        app1.extend_from_slice(b"Exif\0\0");
        app1.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        app1.extend_from_slice(&[0x01, 0x00]);
        app1.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
        app1.extend_from_slice(&[orientation, 0x00, 0x00, 0x00]);
        app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        // Right after SOI
        jpeg.splice(2..2, app1);
        jpeg
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8 * 40, y as u8 * 40, 7]));
        image::encode_png(&img, PngCompression::Fast).unwrap()
    }

    #[test]
    fn missing_field_is_reported() {
        let mut form = UploadForm::new();
        form.insert("photo", png_bytes(2, 2));

        let err = convert(&form, &DepthConfig::default()).unwrap_err();
        assert!(matches!(err, TransferError::MissingUpload));
        assert_eq!(err.to_string(), "No image uploaded");
    }

    #[test]
    fn non_image_bytes_are_rejected() {
        let form = UploadForm::with_image(b"definitely not a picture".to_vec());

        let err = convert(&form, &DepthConfig::default()).unwrap_err();
        assert!(matches!(err, TransferError::Decode(_)));
        assert_eq!(err.to_string(), "Invalid image file");
        assert!(err.is_client_error());
    }

    #[test]
    fn empty_upload_is_invalid() {
        let form = UploadForm::with_image(Vec::new());

        let err = convert(&form, &DepthConfig::default()).unwrap_err();
        assert!(matches!(err, TransferError::Decode(_)));
    }

    #[test]
    fn oversized_upload_is_rejected_before_decoding() {
        let config = DepthConfig {
            max_pixels: Some(15),
            ..DepthConfig::default()
        };

        let err = convert(&UploadForm::with_image(png_bytes(4, 4)), &config).unwrap_err();
        assert!(matches!(
            err,
            TransferError::TooLarge {
                width: 4,
                height: 4,
                limit: 15
            }
        ));

        assert!(convert(&UploadForm::with_image(png_bytes(5, 3)), &config).is_ok());
    }

    #[test]
    fn exif_orientation_is_applied() {
        let form = UploadForm::with_image(jpeg_with_orientation(8, 4, 6));
        let conversion = convert(&form, &DepthConfig::default()).unwrap();

        assert_eq!(conversion.dimensions, (4, 8));
    }

    #[test]
    fn unrotated_jpeg_keeps_its_shape() {
        let form = UploadForm::with_image(jpeg_with_orientation(8, 4, 1));
        let conversion = convert(&form, &DepthConfig::default()).unwrap();

        assert_eq!(conversion.dimensions, (8, 4));
    }

    #[test]
    fn original_uses_configured_compression() {
        let img = RgbImage::from_fn(6, 5, |x, y| Rgb([x as u8 * 40, y as u8 * 50, 3]));
        let upload = image::encode_png(&img, PngCompression::Fast).unwrap();
        let config = DepthConfig {
            png_compression: PngCompression::Best,
            ..DepthConfig::default()
        };

        let conversion = convert(&UploadForm::with_image(upload), &config).unwrap();

        let expected = image::encode_png_base64(&img, PngCompression::Best).unwrap();
        assert_eq!(conversion.original_base64, expected);
    }

    #[test]
    fn decode_upload_without_limit_accepts_png() {
        let upload = png_bytes(7, 3);
        let rgb = decode_upload(&upload, &DepthConfig::default()).unwrap();

        assert_eq!(rgb, load_from_memory(&upload).unwrap().into_rgb8());
    }

    #[test]
    fn invalid_kernel_surfaces_as_processing_failure() {
        let config = DepthConfig {
            blur_kernel: 8,
            ..DepthConfig::default()
        };

        let err = convert(&UploadForm::with_image(png_bytes(3, 3)), &config).unwrap_err();
        assert!(!err.is_client_error());
        assert!(err.to_string().starts_with("Processing failed: "));
    }

    #[test]
    fn conversion_carries_both_images() {
        let form = UploadForm::with_image(png_bytes(6, 4));
        let conversion = convert(&form, &DepthConfig::default()).unwrap();

        assert_eq!(conversion.dimensions, (6, 4));
        assert!(!conversion.original_base64.is_empty());
        assert!(!conversion.depth_base64.is_empty());
        assert_ne!(conversion.original_base64, conversion.depth_base64);
    }
}
