//! Immutable plate raster

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GrayImage};
use plategate_types::Result;

/// Cropped plate image. Never mutated; transforms return a new crop.
#[derive(Debug, Clone)]
pub struct PlateCrop {
    image: Arc<DynamicImage>,
}

impl PlateCrop {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        Self::new(DynamicImage::ImageLuma8(gray))
    }

    /// Load a crop from an image file
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(image::open(path)?))
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn to_gray(&self) -> GrayImage {
        self.image.to_luma8()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Write the crop as PNG
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}
