pub mod config;
pub mod depth;
pub mod error;
pub mod image;
pub mod page;
pub mod service;
pub mod transfer;

// Re-export commonly used types
pub use config::DepthConfig;
pub use depth::{DepthMap, DepthModel, GrayBlurModel};
pub use error::{PipelineError, TransferError};
pub use image::{render_pseudo_depth, render_with, PngCompression, RenderOptions};
pub use transfer::{Conversion, UploadForm};
