//! PDF page rasterization via Google PDFium.
//!
//! Renders individual pages to RGB rasters for code scanning. PDFium
//! handles the PDF complexities (CIDFonts, embedded fonts, transparency)
//! that lighter parsers choke on.
//!
//! `PdfiumRasterizer` is stateless (`Send + Sync`). Each operation creates
//! a fresh `Pdfium` instance because the upstream type is `!Send`; the OS
//! caches `dlopen`/`LoadLibrary` calls, so repeat loads are near-free. The
//! document handle lives inside one call and is dropped on every exit path,
//! so the underlying resources are always released.

use image::RgbImage;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PageRasterizer;
use super::VerifyError;

/// Maximum dimension (width or height) for rendered page rasters.
/// Prevents OOM on extremely large pages or absurd DPI settings.
const MAX_DIMENSION_PX: u32 = 4096;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages to RGB rasters using Google PDFium.
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    /// Create a new rasterizer, verifying the PDFium library is loadable
    /// (fail-fast at construction time).
    pub fn new() -> Result<Self, VerifyError> {
        let _ = load_pdfium()?;
        Ok(Self)
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, VerifyError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            VerifyError::DocumentOpen(format!("failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    // pdfium_platform_library_name_at_path() handles platform-specific names:
    //   Windows -> pdfium.dll | Linux -> libpdfium.so | macOS -> libpdfium.dylib
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        VerifyError::DocumentOpen(format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Map PDF load errors — detect encrypted PDFs for accurate propagation.
fn map_load_error(e: PdfiumError) -> VerifyError {
    let msg = format!("{e}");
    let lower = msg.to_lowercase();
    if lower.contains("password") || lower.contains("encrypt") {
        VerifyError::DocumentEncrypted
    } else {
        VerifyError::DocumentOpen(format!("failed to load PDF: {e}"))
    }
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX].
/// Preserves aspect ratio when capping. At 72 DPI the scale is 1.0, i.e.
/// the document's native resolution.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, VerifyError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;
        Ok(document.pages().len() as usize)
    }

    fn rasterize_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<RgbImage, VerifyError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;

        let pages = document.pages();

        let page_index = u16::try_from(page_number).map_err(|_| VerifyError::Raster {
            page: page_number,
            reason: format!("page index {page_number} exceeds u16 maximum"),
        })?;

        let page = pages.get(page_index).map_err(|_| VerifyError::Raster {
            page: page_number,
            reason: format!(
                "page {page_number} out of range (document has {} pages)",
                pages.len()
            ),
        })?;

        let width_points = page.width().value;
        let height_points = page.height().value;
        let (target_w, target_h) = compute_render_dimensions(width_points, height_points, dpi);

        let uncapped_w = (width_points * dpi as f32 / POINTS_PER_INCH) as u32;
        let uncapped_h = (height_points * dpi as f32 / POINTS_PER_INCH) as u32;
        if target_w != uncapped_w || target_h != uncapped_h {
            warn!(
                page = page_number,
                raw_width = uncapped_w,
                raw_height = uncapped_h,
                capped_width = target_w,
                capped_height = target_h,
                "page dimensions capped to {MAX_DIMENSION_PX}px",
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| VerifyError::Raster {
                page: page_number,
                reason: format!("rendering failed: {e}"),
            })?;

        // Flattens 4-channel output to RGB so downstream transforms see a
        // uniform buffer regardless of the page's alpha usage.
        let raster = bitmap.as_image().to_rgb8();

        debug!(
            page = page_number,
            width = raster.width(),
            height = raster.height(),
            "rasterized PDF page"
        );

        Ok(raster)
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Mock page rasterizer serving preset rasters.
///
/// Used by locator and verifier tests that need a `PageRasterizer` without
/// requiring the actual PDFium binary.
pub struct MockPageRasterizer {
    pages: Vec<RgbImage>,
    failing_pages: Vec<usize>,
    unopenable: bool,
}

impl MockPageRasterizer {
    pub fn new(pages: Vec<RgbImage>) -> Self {
        Self {
            pages,
            failing_pages: Vec::new(),
            unopenable: false,
        }
    }

    /// Make one page fail rasterization while the rest keep working.
    pub fn failing_on_page(mut self, page: usize) -> Self {
        self.failing_pages.push(page);
        self
    }

    /// A document that cannot be opened at all.
    pub fn unopenable() -> Self {
        Self {
            pages: Vec::new(),
            failing_pages: Vec::new(),
            unopenable: true,
        }
    }
}

impl PageRasterizer for MockPageRasterizer {
    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, VerifyError> {
        if self.unopenable {
            return Err(VerifyError::DocumentOpen("mock document refuses to open".into()));
        }
        Ok(self.pages.len())
    }

    fn rasterize_page(
        &self,
        _pdf_bytes: &[u8],
        page_number: usize,
        _dpi: u32,
    ) -> Result<RgbImage, VerifyError> {
        if self.failing_pages.contains(&page_number) {
            return Err(VerifyError::Raster {
                page: page_number,
                reason: "mock rasterization failure".into(),
            });
        }
        self.pages
            .get(page_number)
            .cloned()
            .ok_or_else(|| VerifyError::Raster {
                page: page_number,
                reason: format!("page {page_number} out of range (mock has {} pages)", self.pages.len()),
            })
    }
}
