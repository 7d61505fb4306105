//! Veridoc: certificate verification core.
//!
//! Cross-checks the machine-readable claim embedded in an uploaded
//! certificate (a QR-encoded JSON credential) against the document's
//! visible text: the claimed recipient and course must appear verbatim in
//! the page text, and the visible completion-date phrase must normalize to
//! the claimed ISO date. Upload handling, storage and export belong to the
//! embedding application; this crate is the decision core.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let result = veridoc::verify_certificate(Path::new("uploads/certificate.pdf"))?;
//! println!("{} ({} / {})", result.status.as_str(), result.course, result.date_completed);
//! # Ok::<(), veridoc::VerifyError>(())
//! ```

pub mod config;
pub mod report;
pub mod verify;

pub use config::VerifyConfig;
pub use report::{RecordLog, VerifiedRecord};
pub use verify::types::{Verdict, VerificationResult};
pub use verify::{verify_certificate, CertificateVerifier, VerifyError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedding processes that install no subscriber of
/// their own. Honors `RUST_LOG`; defaults to info-level output.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
