//! Grayscale filters not provided by imageproc

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Mean pixel intensity, 0 for an empty image
pub fn mean_intensity(image: &GrayImage) -> f64 {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
    sum as f64 / count as f64
}

/// Gaussian-weighted adaptive threshold: a pixel is white when it exceeds its
/// blurred neighbourhood minus `offset`.
pub fn adaptive_gaussian_threshold(image: &GrayImage, sigma: f32, offset: f32) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let local = gaussian_blur_f32(image, sigma);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y)[0] as f32;
        let threshold = local.get_pixel(x, y)[0] as f32 - offset;
        if value > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Contrast limited adaptive histogram equalization.
///
/// The image is split into at most `grid x grid` tiles, each tile gets a
/// clipped histogram equalization lookup table, and pixels are mapped by
/// bilinear interpolation between the four nearest tile centres.
pub fn clahe(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tile_w = width.div_ceil(grid.clamp(1, width));
    let tile_h = height.div_ceil(grid.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w) as usize;
    let tiles_y = height.div_ceil(tile_h) as usize;

    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx as u32 * tile_w;
            let y0 = ty as u32 * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts[ty * tiles_x + tx] = tile_lut(image, x0, y0, x1, y1, clip_limit);
        }
    }

    let locate = |pos: u32, tile: u32, tiles: usize| -> (usize, usize, f32) {
        let g = (pos as f32 + 0.5) / tile as f32 - 0.5;
        let g = g.clamp(0.0, (tiles - 1) as f32);
        let lo = g.floor() as usize;
        let hi = (lo + 1).min(tiles - 1);
        (lo, hi, g - lo as f32)
    };

    GrayImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0] as usize;
        let (tx0, tx1, fx) = locate(x, tile_w, tiles_x);
        let (ty0, ty1, fy) = locate(y, tile_h, tiles_y);

        let at = |tx: usize, ty: usize| luts[ty * tiles_x + tx][v] as f32;
        let top = at(tx0, ty0) * (1.0 - fx) + at(tx1, ty0) * fx;
        let bottom = at(tx0, ty1) * (1.0 - fx) + at(tx1, ty1) * fx;
        let out = top * (1.0 - fy) + bottom * fy;
        Luma([out.round().clamp(0.0, 255.0) as u8])
    })
}

fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[image.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);
    let clip = ((clip_limit * area as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    let spread = excess / 256;
    let residual = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += spread;
        if i < residual {
            *bin += 1;
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    for (i, bin) in hist.iter().enumerate() {
        cumulative += bin;
        lut[i] = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([(x * 255 / (width - 1)) as u8]))
    }

    #[test]
    fn test_mean_intensity() {
        let img = GrayImage::from_pixel(4, 4, Luma([100]));
        assert_eq!(mean_intensity(&img), 100.0);
        assert_eq!(mean_intensity(&GrayImage::new(0, 0)), 0.0);
    }

    #[test]
    fn test_clahe_keeps_dimensions() {
        let img = gradient(37, 11);
        let out = clahe(&img, 2.0, 8);
        assert_eq!(out.dimensions(), (37, 11));
    }

    #[test]
    fn test_clahe_handles_tiny_image() {
        let img = GrayImage::from_pixel(1, 1, Luma([42]));
        assert_eq!(clahe(&img, 3.0, 8).dimensions(), (1, 1));
    }

    #[test]
    fn test_clahe_preserves_ordering_of_gradient() {
        let img = gradient(64, 8);
        let out = clahe(&img, 2.0, 8);
        assert!(out.get_pixel(0, 4)[0] <= out.get_pixel(63, 4)[0]);
    }

    #[test]
    fn test_adaptive_threshold_is_binary() {
        let img = gradient(30, 12);
        let out = adaptive_gaussian_threshold(&img, 2.0, 2.0);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
