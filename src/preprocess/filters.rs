//! Smoothing and binarization filters
//!
//! Separable Gaussian convolution over 8-bit grayscale images, plus the
//! Gaussian-weighted adaptive threshold built on top of it.

use image::{GrayImage, ImageBuffer, Luma};

/// How samples outside the image are synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// `gfedcb|abcdefgh|gfedcba` (edge sample not repeated)
    Reflect101,
    /// `aaaaaa|abcdefgh|hhhhhhh`
    Replicate,
}

impl Border {
    fn index(self, i: i64, len: i64) -> usize {
        if len == 1 {
            return 0;
        }
        match self {
            Border::Replicate => i.clamp(0, len - 1) as usize,
            Border::Reflect101 => {
                let period = 2 * (len - 1);
                let i = i.rem_euclid(period);
                (if i >= len { period - i } else { i }) as usize
            }
        }
    }
}

/// 1-D Gaussian kernel of odd `size` with sigma derived from the size.
///
/// Sizes up to 7 use the fixed binomial-style tables; larger sizes use
/// `sigma = 0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f64> {
    match size {
        1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![
            0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
        ],
        _ => {
            let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
            let center = (size / 2) as f64;
            let weights: Vec<f64> = (0..size)
                .map(|i| {
                    let x = i as f64 - center;
                    (-(x * x) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            let total: f64 = weights.iter().sum();
            weights.into_iter().map(|w| w / total).collect()
        }
    }
}

/// Separable Gaussian blur with a square `kernel_size` window
pub fn gaussian_smooth(image: &GrayImage, kernel_size: u32, border: Border) -> GrayImage {
    let kernel = gaussian_kernel(kernel_size);
    let radius = (kernel.len() / 2) as i64;
    let (width, height) = image.dimensions();
    let (w, h) = (width as i64, height as i64);
    let src = image.as_raw();

    let mut horizontal = vec![0f64; src.len()];
    for y in 0..h {
        let row = &src[(y * w) as usize..((y + 1) * w) as usize];
        for x in 0..w {
            horizontal[(y * w + x) as usize] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| weight * row[border.index(x + k as i64 - radius, w)] as f64)
                .sum();
        }
    }

    ImageBuffer::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let value: f64 = kernel
            .iter()
            .enumerate()
            .map(|(k, weight)| {
                let sy = border.index(y + k as i64 - radius, h) as i64;
                weight * horizontal[(sy * w + x) as usize]
            })
            .sum();
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Binarize against a Gaussian-weighted local mean.
///
/// A pixel becomes 255 when `value - mean > -bias`, otherwise 0. The mean is
/// taken over a `block_size` window with replicated borders.
pub fn adaptive_threshold_gaussian(image: &GrayImage, block_size: u32, bias: f64) -> GrayImage {
    let mean = gaussian_smooth(image, block_size, Border::Replicate);

    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y)[0] as f64;
        let local = mean.get_pixel(x, y)[0] as f64;
        if value - local > -bias {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
