use anyhow::{ensure, Context, Result};

use std::fs;
use std::path::{Path, PathBuf};

use crate::depth::{GrayBlurModel, DEFAULT_KERNEL_SIZE};
use crate::image::{PngCompression, RenderOptions};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    pub invert: bool,
    // Odd blur kernel size for the stand-in depth model
    pub blur_kernel: u32,
    pub png_compression: PngCompression,
    // Reject uploads with more pixels than this; no bound when unset
    pub max_pixels: Option<u64>,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            invert: true,
            blur_kernel: DEFAULT_KERNEL_SIZE,
            png_compression: PngCompression::Default,
            max_pixels: None,
        }
    }
}

impl DepthConfig {
    /// Load the user config, if there is one and it parses
    pub fn load() -> Option<Self> {
        let config_path = Self::config_path().filter(|path| path.exists())?;

        Self::load_from(&config_path)
            .map_err(|e| log::warn!("Ignoring config {}: {e:#}", config_path.display()))
            .ok()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path().context("Could not locate home directory")?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn config_path() -> Option<PathBuf> {
        let home = std::env::home_dir()?;
        Some(home.join(".config").join("depthviz").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.blur_kernel % 2 == 1,
            "Blur kernel must be an odd number of pixels, got {}",
            self.blur_kernel
        );
        ensure!(self.max_pixels != Some(0), "Pixel limit must be positive");
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            invert: self.invert,
            png_compression: self.png_compression,
        }
    }

    pub fn depth_model(&self) -> Result<GrayBlurModel> {
        GrayBlurModel::new(self.blur_kernel)
    }
}
