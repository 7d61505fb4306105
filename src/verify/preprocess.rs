//! Decode-escalation image transforms.
//!
//! Matrix-code decoders are brittle to resolution and contrast, so the
//! locator retries each page through a graduated sequence of image fixes.
//! Every pass is a pure image-to-image transform with no I/O, ordered
//! cheapest first so clean documents never pay for the expensive ones.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Side of the square window used for local threshold estimation.
const THRESHOLD_WINDOW: u32 = 11;

/// Offset subtracted from the local weighted mean before thresholding.
const THRESHOLD_OFFSET: f32 = 2.0;

/// Gaussian sigma for the denoising blur (3x3-kernel equivalent).
const DENOISE_SIGMA: f32 = 0.8;

/// One preprocessing pass of the decode escalation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePass {
    /// The raster as rendered, untouched.
    Native,
    /// 2x linear upscale with cubic (CatmullRom) interpolation. Recovers
    /// codes whose modules rendered below the decoder's sampling floor.
    Upscale2x,
    /// Light Gaussian blur to suppress rasterization noise.
    Denoise,
    /// Grayscale + adaptive locally-thresholded binarization. Recovers
    /// codes printed on tinted or unevenly lit backgrounds.
    Binarize,
}

impl DecodePass {
    /// Escalation order, tried until a decoder succeeds.
    pub const SEQUENCE: [DecodePass; 4] = [
        DecodePass::Native,
        DecodePass::Upscale2x,
        DecodePass::Denoise,
        DecodePass::Binarize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecodePass::Native => "native",
            DecodePass::Upscale2x => "upscale2x",
            DecodePass::Denoise => "denoise",
            DecodePass::Binarize => "binarize",
        }
    }

    /// Apply this pass to a page raster.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        match self {
            DecodePass::Native => image.clone(),
            DecodePass::Upscale2x => imageops::resize(
                image,
                image.width() * 2,
                image.height() * 2,
                FilterType::CatmullRom,
            ),
            DecodePass::Denoise => imageops::blur(image, DENOISE_SIGMA),
            DecodePass::Binarize => {
                let gray = rgb_to_gray(image);
                let binary = adaptive_threshold(&gray, THRESHOLD_WINDOW, THRESHOLD_OFFSET);
                gray_to_rgb(&binary)
            }
        }
    }
}

/// Convert RGB image to grayscale using ITU-R BT.601 luminance.
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (w, h) = (rgb.width(), rgb.height());
    let mut gray = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = rgb.get_pixel(x, y);
            let luma = (0.299 * p.0[0] as f32
                + 0.587 * p.0[1] as f32
                + 0.114 * p.0[2] as f32) as u8;
            gray.put_pixel(x, y, Luma([luma]));
        }
    }
    gray
}

/// Widen a grayscale image back to RGB so all passes share one raster type.
fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    let (w, h) = (gray.width(), gray.height());
    let mut rgb = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = gray.get_pixel(x, y).0[0];
            rgb.put_pixel(x, y, Rgb([v, v, v]));
        }
    }
    rgb
}

/// Adaptive binarization against a Gaussian-weighted local mean.
///
/// A pixel becomes white when it exceeds the weighted mean of its
/// `window` x `window` neighborhood minus `offset`, black otherwise.
/// The weighted mean is computed with a separable Gaussian whose sigma
/// tapers the kernel to near-zero at the window edge. Edges replicate.
///
/// Pure Rust implementation — no `imageproc` dependency.
pub fn adaptive_threshold(img: &GrayImage, window: u32, offset: f32) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return img.clone();
    }

    let radius = (window / 2) as i32;
    let sigma = 0.3 * ((window as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|d| (-((d * d) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let weight_sum: f32 = weights.iter().sum();

    // Horizontal pass
    let mut horizontal = vec![0.0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (i, weight) in weights.iter().enumerate() {
                let sx = (x as i32 + i as i32 - radius).clamp(0, w as i32 - 1) as u32;
                acc += weight * img.get_pixel(sx, y).0[0] as f32;
            }
            horizontal[(y * w + x) as usize] = acc / weight_sum;
        }
    }

    // Vertical pass + threshold
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (i, weight) in weights.iter().enumerate() {
                let sy = (y as i32 + i as i32 - radius).clamp(0, h as i32 - 1) as u32;
                acc += weight * horizontal[(sy * w + x) as usize];
            }
            let local_mean = acc / weight_sum;
            let value = if img.get_pixel(x, y).0[0] as f32 > local_mean - offset {
                255
            } else {
                0
            };
            out.put_pixel(x, y, Luma([value]));
        }
    }
    out
}
