//! Code Locator: the escalating-preprocessing decode loop.
//!
//! Codes embedded in rendered documents are frequently distorted by
//! rasterization artifacts, and the code is not necessarily on the first
//! page. Every page is scanned in order, each through the full transform
//! escalation, and the first successful decode anywhere wins.

use image::RgbImage;
use tracing::{debug, warn};

use crate::config::VerifyConfig;

use super::decode::{BardecoderFallback, RqrrDecoder};
use super::preprocess::DecodePass;
use super::types::{CodeDecoder, PageRasterizer};
use super::VerifyError;

/// Scans document pages for a decodable machine-readable code.
pub struct CodeLocator {
    decoders: Vec<Box<dyn CodeDecoder>>,
    render_dpi: u32,
    max_scan_pages: usize,
}

impl CodeLocator {
    /// Locator with the production decoder pair.
    pub fn new(config: &VerifyConfig) -> Self {
        Self::with_decoders(
            vec![Box::new(RqrrDecoder), Box::new(BardecoderFallback)],
            config,
        )
    }

    /// Locator with caller-supplied decoders.
    pub fn with_decoders(decoders: Vec<Box<dyn CodeDecoder>>, config: &VerifyConfig) -> Self {
        Self {
            decoders,
            render_dpi: config.render_dpi,
            max_scan_pages: config.max_scan_pages,
        }
    }

    /// Scan the document for a machine-readable code.
    ///
    /// Returns the first decoded payload across pages and passes, or `None`
    /// after exhausting them (a normal outcome, not an error). Per-page
    /// rasterization failures are contained and the scan moves on; only a
    /// document that cannot be opened at all propagates.
    pub fn locate(
        &self,
        pdf_bytes: &[u8],
        rasterizer: &dyn PageRasterizer,
    ) -> Result<Option<String>, VerifyError> {
        let total_pages = rasterizer.page_count(pdf_bytes)?;
        let scan_pages = total_pages.min(self.max_scan_pages);
        if scan_pages < total_pages {
            warn!(total_pages, scan_pages, "page scan capped");
        }

        for page in 0..scan_pages {
            let raster = match rasterizer.rasterize_page(pdf_bytes, page, self.render_dpi) {
                Ok(raster) => raster,
                Err(e) => {
                    warn!(page, error = %e, "page rasterization failed, skipping page");
                    continue;
                }
            };

            if let Some(payload) = self.scan_raster(&raster, page) {
                return Ok(Some(payload));
            }
        }

        debug!(pages_scanned = scan_pages, "no machine-readable code found");
        Ok(None)
    }

    /// Try every preprocessing pass, and every decoder per pass, on one
    /// page raster. First non-empty decode wins.
    fn scan_raster(&self, raster: &RgbImage, page: usize) -> Option<String> {
        for pass in DecodePass::SEQUENCE {
            let processed = pass.apply(raster);
            for decoder in &self.decoders {
                if let Some(payload) = decoder.decode(&processed) {
                    debug!(
                        page,
                        pass = pass.as_str(),
                        decoder = decoder.name(),
                        "code decoded"
                    );
                    return Some(payload);
                }
                debug!(page, pass = pass.as_str(), decoder = decoder.name(), "no decode");
            }
        }
        None
    }
}
