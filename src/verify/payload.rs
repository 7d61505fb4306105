//! Decoded-claim parsing.
//!
//! The embedded code carries a JSON credential of the shape
//! `{"credentialSubject": {"issuedTo", "course", "completedOn"}}`.

use serde::Deserialize;

use super::types::ClaimFields;
use super::VerifyError;

/// Leading characters of `completedOn` that form the ISO date.
const ISO_DATE_LEN: usize = 10;

#[derive(Debug, Deserialize)]
struct CredentialEnvelope {
    #[serde(rename = "credentialSubject")]
    credential_subject: CredentialSubject,
}

#[derive(Debug, Deserialize)]
struct CredentialSubject {
    #[serde(rename = "issuedTo")]
    issued_to: String,
    course: String,
    #[serde(rename = "completedOn")]
    completed_on: String,
}

/// Parse decoded payload text into normalized claim fields.
///
/// `issuedTo` and `course` are trimmed and lowercased for containment
/// checks; `completedOn` keeps only its ISO `YYYY-MM-DD` prefix. Invalid
/// JSON or missing required fields are recoverable: the caller falls back
/// to the Fake path.
pub fn parse_claim(payload_text: &str) -> Result<ClaimFields, VerifyError> {
    let envelope: CredentialEnvelope = serde_json::from_str(payload_text)
        .map_err(|e| VerifyError::PayloadParse(e.to_string()))?;
    let subject = envelope.credential_subject;

    Ok(ClaimFields {
        issued_to: subject.issued_to.trim().to_lowercase(),
        course: subject.course.trim().to_lowercase(),
        completed_on: iso_prefix(&subject.completed_on),
    })
}

/// First 10 characters of the timestamp. Char-based so a short or
/// multi-byte value cannot panic the truncation.
fn iso_prefix(completed_on: &str) -> String {
    completed_on.chars().take(ISO_DATE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_claim() {
        let payload = r#"{"credentialSubject":{"issuedTo":" Jane Doe ","course":"Intro to Systems","completedOn":"2024-04-29T00:00:00"}}"#;
        let claim = parse_claim(payload).unwrap();
        assert_eq!(claim.issued_to, "jane doe");
        assert_eq!(claim.course, "intro to systems");
        assert_eq!(claim.completed_on, "2024-04-29");
    }

    #[test]
    fn bare_date_kept_as_is() {
        let payload = r#"{"credentialSubject":{"issuedTo":"a","course":"b","completedOn":"2024-04-29"}}"#;
        assert_eq!(parse_claim(payload).unwrap().completed_on, "2024-04-29");
    }

    #[test]
    fn short_timestamp_does_not_panic() {
        let payload = r#"{"credentialSubject":{"issuedTo":"a","course":"b","completedOn":"2024"}}"#;
        assert_eq!(parse_claim(payload).unwrap().completed_on, "2024");
    }

    #[test]
    fn invalid_json_is_recoverable() {
        let err = parse_claim("definitely not json").unwrap_err();
        assert!(matches!(err, VerifyError::PayloadParse(_)));
    }

    #[test]
    fn missing_completed_on_is_recoverable() {
        let payload = r#"{"credentialSubject":{"issuedTo":"jane","course":"intro"}}"#;
        assert!(matches!(
            parse_claim(payload),
            Err(VerifyError::PayloadParse(_))
        ));
    }

    #[test]
    fn missing_subject_is_recoverable() {
        assert!(matches!(
            parse_claim(r#"{"foo": 1}"#),
            Err(VerifyError::PayloadParse(_))
        ));
    }
}
