//! Fixed, ordered preprocessing variants of a plate crop
//!
//! Every transform upscales the crop 2x (cubic) and converts it to grayscale
//! before its own processing. The order of [`PREPROCESSING_VARIANTS`] is the
//! evaluation order of the consensus selector and decides ties.

use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::{bilateral_filter, gaussian_blur_f32, median_filter};
use imageproc::morphology::dilate;

use crate::crop::PlateCrop;
use crate::filters::{adaptive_gaussian_threshold, clahe, mean_intensity};

pub type Transform = fn(&PlateCrop) -> PlateCrop;

/// Named pure transform of a plate crop
#[derive(Clone, Copy)]
pub struct PreprocessingVariant {
    pub name: &'static str,
    pub transform: Transform,
}

impl std::fmt::Debug for PreprocessingVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreprocessingVariant")
            .field("name", &self.name)
            .finish()
    }
}

impl PreprocessingVariant {
    pub fn apply(&self, crop: &PlateCrop) -> PlateCrop {
        (self.transform)(crop)
    }
}

/// Evaluation order matters: the first variant wins on equal confidence.
pub const PREPROCESSING_VARIANTS: [PreprocessingVariant; 5] = [
    PreprocessingVariant {
        name: "adaptive",
        transform: adaptive,
    },
    PreprocessingVariant {
        name: "invert",
        transform: invert,
    },
    PreprocessingVariant {
        name: "otsu",
        transform: otsu,
    },
    PreprocessingVariant {
        name: "standard",
        transform: standard,
    },
    PreprocessingVariant {
        name: "morphology",
        transform: morphology,
    },
];

const CLAHE_GRID: u32 = 8;
const ADAPTIVE_CLIP_LIMIT: f32 = 2.0;
const INVERT_CLIP_LIMIT: f32 = 3.0;
// Sigma of an 11px Gaussian block
const ADAPTIVE_SIGMA: f32 = 2.0;
const ADAPTIVE_OFFSET: f32 = 2.0;
// Sigma of a 5x5 Gaussian kernel
const OTSU_BLUR_SIGMA: f32 = 1.1;
const DARK_PLATE_MEAN: f64 = 127.0;
const BILATERAL_WINDOW: u32 = 11;
const BILATERAL_SIGMA: f32 = 17.0;
const CANNY_LOW: f32 = 30.0;
const CANNY_HIGH: f32 = 200.0;

fn upscale_gray(crop: &PlateCrop) -> GrayImage {
    let gray = crop.to_gray();
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }
    imageops::resize(&gray, gray.width() * 2, gray.height() * 2, FilterType::CatmullRom)
}

/// CLAHE contrast enhancement followed by adaptive thresholding
fn adaptive(crop: &PlateCrop) -> PlateCrop {
    let gray = upscale_gray(crop);
    let enhanced = clahe(&gray, ADAPTIVE_CLIP_LIMIT, CLAHE_GRID);
    PlateCrop::from_gray(adaptive_gaussian_threshold(&enhanced, ADAPTIVE_SIGMA, ADAPTIVE_OFFSET))
}

/// Dark plates with light text are inverted, then contrast-enhanced
fn invert(crop: &PlateCrop) -> PlateCrop {
    let mut gray = upscale_gray(crop);
    if mean_intensity(&gray) < DARK_PLATE_MEAN {
        imageops::invert(&mut gray);
    }
    PlateCrop::from_gray(clahe(&gray, INVERT_CLIP_LIMIT, CLAHE_GRID))
}

/// Gaussian blur then global Otsu threshold
fn otsu(crop: &PlateCrop) -> PlateCrop {
    let gray = upscale_gray(crop);
    if gray.width() == 0 || gray.height() == 0 {
        return PlateCrop::from_gray(gray);
    }
    let blurred = gaussian_blur_f32(&gray, OTSU_BLUR_SIGMA);
    let level = otsu_level(&blurred);
    PlateCrop::from_gray(threshold(&blurred, level, ThresholdType::Binary))
}

/// Denoise only
fn standard(crop: &PlateCrop) -> PlateCrop {
    let gray = upscale_gray(crop);
    if gray.width() == 0 || gray.height() == 0 {
        return PlateCrop::from_gray(gray);
    }
    PlateCrop::from_gray(median_filter(&gray, 1, 1))
}

/// Edge-preserving smoothing, edge detection, then dilation to join strokes
fn morphology(crop: &PlateCrop) -> PlateCrop {
    let gray = upscale_gray(crop);
    if gray.width() == 0 || gray.height() == 0 {
        return PlateCrop::from_gray(gray);
    }
    let filtered = bilateral_filter(&gray, BILATERAL_WINDOW, BILATERAL_SIGMA, BILATERAL_SIGMA);
    let edges = canny(&filtered, CANNY_LOW, CANNY_HIGH);
    PlateCrop::from_gray(dilate(&edges, Norm::LInf, 1))
}
