//! Offline data-file validation: the same predicate the quiz loader applies,
//! reported group by group instead of silently dropped.

use tracing::{debug, instrument};

use crate::document::{parse_pair, Document};
use crate::domain::Email;
use crate::error::LoadError;
use crate::util::word_count;

/// Soft body-length bounds. Zero disables a bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct WordLimits {
  pub min: u32,
  pub max: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
  pub groups: usize,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl ValidationReport {
  /// Warnings never fail validation.
  pub fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }
}

fn soft_checks(key: &str, first: &Email, second: &Email, limits: WordLimits, warnings: &mut Vec<String>) {
  let (wa, wb) = (word_count(&first.desc), word_count(&second.desc));
  if limits.min > 0 && (wa < limits.min as usize || wb < limits.min as usize) {
    warnings.push(format!("{key}: body word-count below MIN_WORDS ({wa}/{wb}, min={})", limits.min));
  }
  if limits.max > 0 && (wa > limits.max as usize || wb > limits.max as usize) {
    warnings.push(format!("{key}: body word-count above MAX_WORDS ({wa}/{wb}, max={})", limits.max));
  }
  if !first.desc.contains('\n') {
    warnings.push(format!("{key}: first email has no newline characters in desc/body"));
  }
  if !second.desc.contains('\n') {
    warnings.push(format!("{key}: second email has no newline characters in desc/body"));
  }
}

#[instrument(level = "debug", skip_all)]
pub fn validate_document(doc: &Document, limits: WordLimits) -> ValidationReport {
  let mut report = ValidationReport::default();
  for key in doc.out_of_range_groups() {
    report.groups += 1;
    report.errors.push(format!("{key}: group index out of range (max {})", u64::MAX));
  }
  for (_, key, value) in doc.groups() {
    report.groups += 1;
    match parse_pair(value) {
      Ok(pair) => {
        let [first, second] = pair.emails();
        soft_checks(key, first, second, limits, &mut report.warnings);
      }
      Err(e) => {
        debug!(%key, error = %e, "Group failed validation");
        report.errors.push(format!("{key}: {e}"));
      }
    }
  }
  report
}

/// Parse then validate. A file that is not a JSON object is a hard error.
pub fn validate_str(text: &str, limits: WordLimits) -> Result<ValidationReport, LoadError> {
  let doc = Document::from_json_str(text)?;
  Ok(validate_document(&doc, limits))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn email(correct: &str, desc: &str) -> serde_json::Value {
    json!({
      "subject": "Benefits update",
      "from": "hr@company.com",
      "to": ["employee@company.com"],
      "desc": desc,
      "correct": correct,
      "explain": "See the sender domain."
    })
  }

  #[test]
  fn clean_file_passes_without_warnings() {
    let text = json!({
      "email_group_1": [email("phish", "Dear Employee,\n\nClick now."), email("safe", "Hi Team,\n\nAll good.")],
      "last_updated_emails": "2025-01-01T00:00:00Z"
    })
    .to_string();
    let r = validate_str(&text, WordLimits::default()).unwrap();
    assert!(r.is_ok());
    assert_eq!(r.groups, 1);
    assert!(r.warnings.is_empty());
  }

  #[test]
  fn each_bad_group_gets_its_own_error() {
    let text = json!({
      "email_group_1": [email("phish", "a\nb")],
      "email_group_2": [email("phish", "a\nb"), {"subject": "x"}],
      "email_group_3": [email("safe", "a\nb"), email("safe", "a\nb")],
      "email_group_4": [email("phish", "a\nb"), email("safe", "a\nb")]
    })
    .to_string();
    let r = validate_str(&text, WordLimits::default()).unwrap();
    assert!(!r.is_ok());
    assert_eq!(r.groups, 4);
    assert_eq!(r.errors.len(), 3);
    assert_eq!(r.errors[0], "email_group_1: must be an array of exactly 2 emails");
    assert!(r.errors[1].starts_with("email_group_2: email shape invalid"));
    assert!(r.errors[2].starts_with("email_group_3: pair must contain exactly one \"phish\" and one \"safe\""));
  }

  #[test]
  fn soft_checks_only_warn() {
    let text = json!({
      "email_group_1": [email("phish", "one two three"), email("safe", "one\ntwo")]
    })
    .to_string();
    let r = validate_str(&text, WordLimits { min: 3, max: 2 }).unwrap();
    assert!(r.is_ok());
    assert!(r.warnings.iter().any(|w| w.contains("below MIN_WORDS (3/2, min=3)")));
    assert!(r.warnings.iter().any(|w| w.contains("above MAX_WORDS (3/2, max=2)")));
    assert!(r.warnings.iter().any(|w| w.contains("first email has no newline")));
    assert!(!r.warnings.iter().any(|w| w.contains("second email")));
  }

  #[test]
  fn oversized_group_index_is_reported_not_skipped() {
    let text = json!({
      "email_group_99999999999999999999": [email("safe", "a\nb"), email("safe", "a\nb")],
      "email_group_1": [email("phish", "a\nb"), email("safe", "a\nb")]
    })
    .to_string();
    let r = validate_str(&text, WordLimits::default()).unwrap();
    assert!(!r.is_ok());
    assert_eq!(r.groups, 2);
    assert_eq!(
      r.errors,
      ["email_group_99999999999999999999: group index out of range (max 18446744073709551615)"]
    );
  }

  #[test]
  fn file_without_groups_passes_with_zero() {
    let r = validate_str("{}", WordLimits::default()).unwrap();
    assert!(r.is_ok());
    assert_eq!(r.groups, 0);
    assert!(validate_str("[1]", WordLimits::default()).is_err());
  }
}
