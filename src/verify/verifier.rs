//! Verification orchestrator.
//!
//! Composes the rasterizer, code locator, claim parser, text source and
//! reconciler into the single operation the embedding application calls.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::config::VerifyConfig;
use crate::report::title_case;

use super::locate::CodeLocator;
use super::payload::parse_claim;
use super::pdfium::PdfiumRasterizer;
use super::reconcile::ClaimReconciler;
use super::text::{normalize_visible_text, PdfTextSource};
use super::types::{PageRasterizer, TextSource, Verdict, VerificationResult};
use super::VerifyError;

/// One verification request: a sequential unit of work with no internal
/// concurrency and no shared state. Trait-object fields let tests and
/// alternative backends inject their own components.
pub struct CertificateVerifier {
    rasterizer: Box<dyn PageRasterizer>,
    text_source: Box<dyn TextSource>,
    locator: CodeLocator,
    reconciler: ClaimReconciler,
}

impl CertificateVerifier {
    /// Production stack: PDFium rasterization, pdf-extract text layer,
    /// rqrr + bardecoder decoding. Fails fast when PDFium is not loadable.
    pub fn new() -> Result<Self, VerifyError> {
        Self::with_config(VerifyConfig::default())
    }

    pub fn with_config(config: VerifyConfig) -> Result<Self, VerifyError> {
        let locator = CodeLocator::new(&config);
        Ok(Self {
            rasterizer: Box::new(PdfiumRasterizer::new()?),
            text_source: Box::new(PdfTextSource),
            reconciler: ClaimReconciler::new(&config),
            locator,
        })
    }

    /// Verifier with caller-supplied components.
    pub fn from_parts(
        rasterizer: Box<dyn PageRasterizer>,
        text_source: Box<dyn TextSource>,
        locator: CodeLocator,
        config: &VerifyConfig,
    ) -> Self {
        Self {
            rasterizer,
            text_source,
            locator,
            reconciler: ClaimReconciler::new(config),
        }
    }

    /// Verify the certificate document at `path`.
    ///
    /// Only an unreadable or invalid document errors. Everything downstream
    /// (no code found, malformed claim, unreadable text layer) degrades into
    /// a `Fake` verdict carrying whatever fields were already recovered.
    pub fn verify(&self, path: &Path) -> Result<VerificationResult, VerifyError> {
        info!(path = %path.display(), "verifying certificate");

        let pdf_bytes = fs::read(path)
            .map_err(|e| VerifyError::DocumentOpen(format!("{}: {e}", path.display())))?;

        let payload_text = match self.locator.locate(&pdf_bytes, self.rasterizer.as_ref())? {
            Some(text) => text,
            None => {
                info!(path = %path.display(), "no machine-readable code found");
                return Ok(VerificationResult::fake_unknown());
            }
        };

        let claim = match parse_claim(&payload_text) {
            Ok(claim) => claim,
            Err(e) => {
                warn!(error = %e, "decoded payload is not a valid claim");
                return Ok(VerificationResult::fake_unknown());
            }
        };

        // Reportable fields are fixed once the claim parses; the verdict
        // below cannot un-populate them.
        let course = title_case(&claim.course);
        let date_completed = claim.completed_on.clone();

        let visible_text = match self.text_source.page_texts(&pdf_bytes) {
            Ok(pages) => normalize_visible_text(&pages),
            Err(e) => {
                warn!(error = %e, "visible-text extraction failed");
                return Ok(VerificationResult {
                    status: Verdict::Fake,
                    course,
                    date_completed,
                });
            }
        };

        let reconciliation = self.reconciler.reconcile(&claim, &visible_text);
        let status = reconciliation.verdict();

        info!(
            path = %path.display(),
            status = status.as_str(),
            name_match = reconciliation.name_match,
            course_match = reconciliation.course_match,
            date_match = reconciliation.date_match,
            "verification complete"
        );

        Ok(VerificationResult {
            status,
            course,
            date_completed,
        })
    }
}

/// One-shot verification with the production stack.
pub fn verify_certificate(path: &Path) -> Result<VerificationResult, VerifyError> {
    CertificateVerifier::new()?.verify(path)
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use tempfile::NamedTempFile;

    use crate::verify::decode::MockDecoder;
    use crate::verify::pdfium::MockPageRasterizer;
    use crate::verify::types::Verdict;

    use super::*;

    const JANE_PAYLOAD: &str = r#"{"credentialSubject":{"issuedTo":"Jane Doe","course":"Intro to Systems","completedOn":"2024-04-29T00:00:00"}}"#;

    const JANE_PAGE_TEXT: &str =
        "This  certificate is\nawarded to Jane Doe for completing\nIntro to Systems on April 29, 2024.";

    /// Text source serving preset page texts, or failing outright.
    struct MockTextSource {
        pages: Vec<String>,
        fail: bool,
    }

    impl MockTextSource {
        fn pages(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.to_string()).collect(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                pages: Vec::new(),
                fail: true,
            }
        }
    }

    impl TextSource for MockTextSource {
        fn page_texts(&self, _pdf_bytes: &[u8]) -> Result<Vec<String>, VerifyError> {
            if self.fail {
                return Err(VerifyError::TextExtraction("mock text failure".into()));
            }
            Ok(self.pages.clone())
        }
    }

    fn blank_page() -> RgbImage {
        RgbImage::from_pixel(32, 32, Rgb([255, 255, 255]))
    }

    fn verifier_with(
        decoder: MockDecoder,
        text_source: MockTextSource,
    ) -> CertificateVerifier {
        let config = VerifyConfig::default();
        CertificateVerifier::from_parts(
            Box::new(MockPageRasterizer::new(vec![blank_page()])),
            Box::new(text_source),
            CodeLocator::with_decoders(vec![Box::new(decoder)], &config),
            &config,
        )
    }

    fn temp_document() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"%PDF-mock").unwrap();
        file
    }

    #[test]
    fn matching_document_is_real() {
        let verifier = verifier_with(
            MockDecoder::always(JANE_PAYLOAD),
            MockTextSource::pages(&[JANE_PAGE_TEXT]),
        );
        let doc = temp_document();

        let result = verifier.verify(doc.path()).unwrap();
        assert_eq!(result.status, Verdict::Real);
        assert_eq!(result.course, "Intro To Systems");
        assert_eq!(result.date_completed, "2024-04-29");
    }

    #[test]
    fn wrong_visible_date_is_fake_with_populated_fields() {
        let text = JANE_PAGE_TEXT.replace("April 29", "April 30");
        let verifier = verifier_with(
            MockDecoder::always(JANE_PAYLOAD),
            MockTextSource::pages(&[&text]),
        );
        let doc = temp_document();

        let result = verifier.verify(doc.path()).unwrap();
        assert_eq!(result.status, Verdict::Fake);
        assert_eq!(result.course, "Intro To Systems");
        assert_eq!(result.date_completed, "2024-04-29");
    }

    #[test]
    fn case_and_whitespace_changes_do_not_change_the_verdict() {
        let shouted = JANE_PAGE_TEXT.to_uppercase().replace(' ', "   ");
        let verifier = verifier_with(
            MockDecoder::always(JANE_PAYLOAD),
            MockTextSource::pages(&[&shouted]),
        );
        let doc = temp_document();

        let result = verifier.verify(doc.path()).unwrap();
        assert_eq!(result.status, Verdict::Real);
    }

    #[test]
    fn no_code_anywhere_is_fake_unknown() {
        let verifier = verifier_with(
            MockDecoder::never(),
            MockTextSource::pages(&[JANE_PAGE_TEXT]),
        );
        let doc = temp_document();

        let result = verifier.verify(doc.path()).unwrap();
        assert_eq!(result.status, Verdict::Fake);
        assert_eq!(result.course, "Unknown");
        assert_eq!(result.date_completed, "N/A");
    }

    #[test]
    fn malformed_payload_is_fake_unknown() {
        let verifier = verifier_with(
            MockDecoder::always("certainly not json"),
            MockTextSource::pages(&[JANE_PAGE_TEXT]),
        );
        let doc = temp_document();

        let result = verifier.verify(doc.path()).unwrap();
        assert_eq!(result.status, Verdict::Fake);
        assert_eq!(result.course, "Unknown");
        assert_eq!(result.date_completed, "N/A");
    }

    #[test]
    fn payload_missing_completed_on_is_fake_unknown() {
        let payload = r#"{"credentialSubject":{"issuedTo":"Jane Doe","course":"Intro to Systems"}}"#;
        let verifier = verifier_with(
            MockDecoder::always(payload),
            MockTextSource::pages(&[JANE_PAGE_TEXT]),
        );
        let doc = temp_document();

        let result = verifier.verify(doc.path()).unwrap();
        assert_eq!(result.status, Verdict::Fake);
        assert_eq!(result.course, "Unknown");
        assert_eq!(result.date_completed, "N/A");
    }

    #[test]
    fn text_extraction_failure_is_fake_with_populated_fields() {
        let verifier = verifier_with(
            MockDecoder::always(JANE_PAYLOAD),
            MockTextSource::failing(),
        );
        let doc = temp_document();

        let result = verifier.verify(doc.path()).unwrap();
        assert_eq!(result.status, Verdict::Fake);
        assert_eq!(result.course, "Intro To Systems");
        assert_eq!(result.date_completed, "2024-04-29");
    }

    #[test]
    fn missing_file_propagates_document_open() {
        let verifier = verifier_with(
            MockDecoder::always(JANE_PAYLOAD),
            MockTextSource::pages(&[JANE_PAGE_TEXT]),
        );

        let err = verifier
            .verify(Path::new("/nonexistent/certificate.pdf"))
            .unwrap_err();
        assert!(matches!(err, VerifyError::DocumentOpen(_)));
    }

    #[test]
    fn unopenable_document_propagates_document_open() {
        let config = VerifyConfig::default();
        let verifier = CertificateVerifier::from_parts(
            Box::new(MockPageRasterizer::unopenable()),
            Box::new(MockTextSource::pages(&[JANE_PAGE_TEXT])),
            CodeLocator::with_decoders(
                vec![Box::new(MockDecoder::always(JANE_PAYLOAD))],
                &config,
            ),
            &config,
        );
        let doc = temp_document();

        let err = verifier.verify(doc.path()).unwrap_err();
        assert!(matches!(err, VerifyError::DocumentOpen(_)));
    }
}
