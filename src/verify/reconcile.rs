//! Claim-versus-document reconciliation.

use tracing::debug;

use crate::config::VerifyConfig;

use super::dates::VisibleDateFinder;
use super::types::{ClaimFields, Verdict};

/// The three independent predicates combined into a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub name_match: bool,
    pub course_match: bool,
    pub date_match: bool,
}

impl Reconciliation {
    /// `Real` only when every predicate holds.
    pub fn verdict(&self) -> Verdict {
        if self.name_match && self.course_match && self.date_match {
            Verdict::Real
        } else {
            Verdict::Fake
        }
    }
}

/// Decides whether the visible text corroborates a decoded claim.
///
/// Containment is exact substring matching over the pre-normalized text.
/// Case-insensitivity comes solely from the upstream lowercasing; there is
/// no fuzzy matching and no Unicode normalization beyond whitespace
/// collapsing. The date predicate compares the normalized visible date
/// phrase against the claim's ISO prefix and fails closed when no phrase
/// is found.
pub struct ClaimReconciler {
    dates: VisibleDateFinder,
    empty_fields_match: bool,
}

impl ClaimReconciler {
    pub fn new(config: &VerifyConfig) -> Self {
        Self {
            dates: VisibleDateFinder::new(),
            empty_fields_match: config.empty_claim_fields_match,
        }
    }

    pub fn reconcile(&self, claim: &ClaimFields, visible_text: &str) -> Reconciliation {
        let visible_date = self.dates.find_normalized(visible_text);

        let reconciliation = Reconciliation {
            name_match: self.contains_field(visible_text, &claim.issued_to),
            course_match: self.contains_field(visible_text, &claim.course),
            date_match: visible_date.as_deref() == Some(claim.completed_on.as_str()),
        };

        debug!(
            name_match = reconciliation.name_match,
            course_match = reconciliation.course_match,
            date_match = reconciliation.date_match,
            visible_date = ?visible_date,
            claimed_date = %claim.completed_on,
            "claim reconciled"
        );

        reconciliation
    }

    fn contains_field(&self, visible_text: &str, field: &str) -> bool {
        if field.is_empty() && !self.empty_fields_match {
            return false;
        }
        visible_text.contains(field)
    }
}
