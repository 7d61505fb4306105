pub mod types;
pub mod preprocess;
pub mod text;
pub mod dates;
pub mod payload;
pub mod reconcile;
pub mod decode;
pub mod locate;
pub mod pdfium;
pub mod verifier;

pub use types::*;
pub use locate::*;
pub use verifier::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    /// File missing, unreadable, or not a valid paginated document.
    /// The only error surfaced to callers as a hard failure.
    #[error("cannot open document: {0}")]
    DocumentOpen(String),

    #[error("document is password-protected")]
    DocumentEncrypted,

    #[error("page {page} rasterization failed: {reason}")]
    Raster { page: usize, reason: String },

    #[error("text extraction failed: {0}")]
    TextExtraction(String),

    #[error("claim payload parse failed: {0}")]
    PayloadParse(String),
}
