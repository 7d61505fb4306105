//! Machine-readable code decoders.
//!
//! Two-stage decoding: `rqrr` runs first (fast finder-pattern search built
//! for QR matrices), `bardecoder` second (slower general-purpose detector
//! that occasionally recovers codes the finder-pattern search misses).

use image::{DynamicImage, RgbImage};
use tracing::debug;

use super::preprocess::rgb_to_gray;
use super::types::CodeDecoder;

/// Primary decoder: rqrr's QR grid detector on a grayscale view.
pub struct RqrrDecoder;

impl CodeDecoder for RqrrDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn decode(&self, image: &RgbImage) -> Option<String> {
        let gray = rgb_to_gray(image);
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| {
            gray.get_pixel(x as u32, y as u32).0[0]
        });

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_, content)) if !content.is_empty() => return Some(content),
                Ok(_) => continue,
                Err(e) => {
                    debug!(error = %e, "grid detected but decode failed");
                    continue;
                }
            }
        }
        None
    }
}

/// Secondary detector: bardecoder's general-purpose pipeline.
pub struct BardecoderFallback;

impl CodeDecoder for BardecoderFallback {
    fn name(&self) -> &'static str {
        "bardecoder"
    }

    fn decode(&self, image: &RgbImage) -> Option<String> {
        let dynamic = DynamicImage::ImageRgb8(image.clone());
        let decoder = bardecoder::default_decoder();
        decoder
            .decode(&dynamic)
            .into_iter()
            .filter_map(Result::ok)
            .find(|data: &String| !data.is_empty())
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Scripted decoder for locator tests.
///
/// `only_after_binarization` simulates a code that decoders cannot read
/// from the raw raster: it answers only for images that are pure black
/// and white with some black content, i.e. after the binarization pass.
pub struct MockDecoder {
    payload: Option<String>,
    require_binarized: bool,
}

impl MockDecoder {
    pub fn always(payload: &str) -> Self {
        Self {
            payload: Some(payload.to_string()),
            require_binarized: false,
        }
    }

    pub fn never() -> Self {
        Self {
            payload: None,
            require_binarized: false,
        }
    }

    pub fn only_after_binarization(payload: &str) -> Self {
        Self {
            payload: Some(payload.to_string()),
            require_binarized: true,
        }
    }
}

impl CodeDecoder for MockDecoder {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn decode(&self, image: &RgbImage) -> Option<String> {
        let payload = self.payload.as_ref()?;
        if self.require_binarized && !is_binarized(image) {
            return None;
        }
        Some(payload.clone())
    }
}

/// True when every pixel is pure black or pure white and at least one
/// black pixel exists. A blank white page does not qualify.
fn is_binarized(image: &RgbImage) -> bool {
    let mut saw_black = false;
    for p in image.pixels() {
        match p.0 {
            [0, 0, 0] => saw_black = true,
            [255, 255, 255] => {}
            _ => return false,
        }
    }
    saw_black
}
