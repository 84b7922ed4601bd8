//! Domain models used by the quiz: labels, sides, emails and the phish/safe pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PairError, ShapeError};

/// Ground truth for an email: is it the phish or the legitimate one?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
  Phish,
  Safe,
}

impl Label {
  pub fn as_str(self) -> &'static str {
    match self {
      Label::Phish => "phish",
      Label::Safe => "safe",
    }
  }
}

impl FromStr for Label {
  type Err = ShapeError;

  /// Exact match only; callers that want leniency normalize first.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "phish" => Ok(Label::Phish),
      "safe" => Ok(Label::Safe),
      other => Err(ShapeError::BadLabel(other.to_string())),
    }
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Where an email sits on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
  Left,
  Right,
}

impl Side {
  pub fn other(self) -> Side {
    match self {
      Side::Left => Side::Right,
      Side::Right => Side::Left,
    }
  }
}

impl fmt::Display for Side {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Side::Left => "left",
      Side::Right => "right",
    })
  }
}

/// A validated email. Field names match the canonical data file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Email {
  pub subject: String,
  pub from: String,
  pub to: Vec<String>,
  pub desc: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub attachment: Option<String>,
  pub correct: Label,
  pub explain: String,
}

impl Email {
  pub fn is_phish(&self) -> bool {
    self.correct == Label::Phish
  }

  /// Executable-looking attachments get a warning cue in the client.
  pub fn attachment_looks_executable(&self) -> bool {
    self
      .attachment
      .as_deref()
      .map(|a| a.to_ascii_lowercase().ends_with(".exe"))
      .unwrap_or(false)
  }
}

/// One phish and one safe email about the same scenario.
/// Construction is the only place the label invariant is checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Pair {
  emails: [Email; 2],
}

impl Pair {
  pub fn new(a: Email, b: Email) -> Result<Self, PairError> {
    match (a.correct, b.correct) {
      (Label::Phish, Label::Safe) | (Label::Safe, Label::Phish) => Ok(Self { emails: [a, b] }),
      (same, _) => Err(PairError::SameLabel(same)),
    }
  }

  /// Emails in file order.
  pub fn emails(&self) -> &[Email; 2] {
    &self.emails
  }

  pub fn phish(&self) -> &Email {
    self.emails.iter().find(|e| e.is_phish()).unwrap_or(&self.emails[0])
  }

  pub fn safe(&self) -> &Email {
    self.emails.iter().find(|e| !e.is_phish()).unwrap_or(&self.emails[1])
  }
}

impl Serialize for Pair {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.emails.serialize(serializer)
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) fn email(subject: &str, correct: Label) -> Email {
    Email {
      subject: subject.into(),
      from: "it@company.com".into(),
      to: vec!["employee@company.com".into()],
      desc: "Hi Team,\n\nPlease read.\n\nBest regards,\nIT".into(),
      attachment: None,
      correct,
      explain: format!("{subject} explanation"),
    }
  }

  #[test]
  fn pair_accepts_one_of_each_in_either_order() {
    assert!(Pair::new(email("a", Label::Phish), email("b", Label::Safe)).is_ok());
    let p = Pair::new(email("a", Label::Safe), email("b", Label::Phish)).unwrap();
    assert_eq!(p.phish().subject, "b");
    assert_eq!(p.safe().subject, "a");
  }

  #[test]
  fn pair_rejects_matching_labels() {
    let err = Pair::new(email("a", Label::Safe), email("b", Label::Safe)).unwrap_err();
    assert!(matches!(err, PairError::SameLabel(Label::Safe)));
    assert!(Pair::new(email("a", Label::Phish), email("b", Label::Phish)).is_err());
  }

  #[test]
  fn label_parsing_is_exact() {
    assert_eq!("phish".parse::<Label>().unwrap(), Label::Phish);
    assert!("Phish".parse::<Label>().is_err());
    assert!("".parse::<Label>().is_err());
  }

  #[test]
  fn exe_attachment_is_flagged() {
    let mut e = email("x", Label::Phish);
    e.attachment = Some("invoice.PDF.EXE".into());
    assert!(e.attachment_looks_executable());
    e.attachment = Some("agenda.pdf".into());
    assert!(!e.attachment_looks_executable());
  }

  #[test]
  fn pair_serializes_as_two_element_array() {
    let p = Pair::new(email("a", Label::Phish), email("b", Label::Safe)).unwrap();
    let v = serde_json::to_value(&p).unwrap();
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["correct"], "phish");
    assert!(arr[0].get("attachment").is_none());
  }
}
