//! Error types for the depth pipeline and the upload front end.
//!
//! The pipeline reports what went wrong while rendering. The transfer
//! service wraps those failures together with the upload-side ones, and
//! its `Display` output is the message shown to the user.

use imageproc::image::ImageError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("depth model failed: {0:#}")]
    Model(anyhow::Error),

    #[error("depth map is {actual:?} but the image is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Failed to encode depth image: {0}")]
    Encoding(#[source] ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("No image uploaded")]
    MissingUpload,

    #[error("Invalid image file")]
    Decode(#[source] ImageError),

    #[error("Image too large: {width}x{height} exceeds the limit of {limit} pixels")]
    TooLarge { width: u32, height: u32, limit: u64 },

    #[error("Processing failed: {0}")]
    Pipeline(#[from] PipelineError),
}

impl TransferError {
    /// Whether the failure came from the upload itself rather than processing.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TransferError::Pipeline(_))
    }
}
