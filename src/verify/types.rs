use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::VerifyError;

/// Authenticity verdict for one uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "Real",
            Verdict::Fake => "Fake",
        }
    }
}

/// Outcome of one verification call. Produced exactly once per call,
/// immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub status: Verdict,
    /// Title-cased course from the decoded claim, or "Unknown".
    pub course: String,
    /// ISO `YYYY-MM-DD` completion date from the claim, or "N/A".
    pub date_completed: String,
}

impl VerificationResult {
    /// Placeholder result when no claim could be decoded or parsed.
    pub fn fake_unknown() -> Self {
        Self {
            status: Verdict::Fake,
            course: "Unknown".to_string(),
            date_completed: "N/A".to_string(),
        }
    }
}

/// Claim fields recovered from the document's embedded code, normalized
/// for reconciliation: `issued_to` and `course` trimmed + lowercased,
/// `completed_on` truncated to its ISO `YYYY-MM-DD` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFields {
    pub issued_to: String,
    pub course: String,
    pub completed_on: String,
}

/// Page rasterization abstraction (allows mocking for tests).
///
/// Implementations load the document per call and release it on return,
/// so every exit path closes the underlying handle.
pub trait PageRasterizer: Send + Sync {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, VerifyError>;

    /// Render one page (0-based) to an RGB raster at the given resolution.
    fn rasterize_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<RgbImage, VerifyError>;
}

/// Visible-text extraction abstraction.
pub trait TextSource: Send + Sync {
    /// Raw text of every page, in page order.
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, VerifyError>;
}

/// Machine-readable code decoder abstraction.
///
/// `None` covers both "no code present" and any internal decoder failure;
/// a failed attempt must never abort the surrounding scan.
pub trait CodeDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, image: &RgbImage) -> Option<String>;
}
