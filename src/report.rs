//! Session records for the verified-uploads listing and export.
//!
//! The verification core stays a pure function of its input document. The
//! embedding web layer owns one `RecordLog` per process and appends a record
//! per upload: single-writer, append-only. Export (spreadsheet, HTML table)
//! consumes the records as-is.

use serde::Serialize;

use crate::verify::types::{Verdict, VerificationResult};

/// One verified upload, as shown in the results listing.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedRecord {
    /// Title-cased submitted name. Bookkeeping only; the submitted name
    /// never participates in reconciliation.
    pub name: String,
    pub email: String,
    /// Title-cased course from the decoded claim, or "Unknown".
    pub platform: String,
    pub status: Verdict,
    pub date: String,
}

impl VerifiedRecord {
    /// Build the record for one upload from the submitted form fields and
    /// the verification outcome.
    pub fn new(submitted_name: &str, email: &str, result: &VerificationResult) -> Self {
        Self {
            name: title_case(submitted_name.trim()),
            email: email.to_string(),
            platform: result.course.clone(),
            status: result.status,
            date: result.date_completed.clone(),
        }
    }
}

/// Append-only log of session records. Single writer: the upload handler.
#[derive(Debug, Default)]
pub struct RecordLog {
    records: Vec<VerifiedRecord>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: VerifiedRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[VerifiedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Capitalize the first letter of each whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
