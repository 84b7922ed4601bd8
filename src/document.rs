//! The email data file: a JSON object keyed by `email_group_<N>`.
//!
//! Canonical group representation is a 2-element array `[Email, Email]`.
//! Everything loosely typed stops here: `RawEmail` is the permissive wire
//! shape, `Email`/`Pair` are what the rest of the crate sees.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::domain::{Email, Label, Pair};
use crate::error::{GenerateError, LoadError, PairError, ShapeError};

pub const GROUP_PREFIX: &str = "email_group_";
pub const LAST_UPDATED_KEY: &str = "last_updated_emails";

/// `email_group_<digits>`, whatever the size of N.
pub fn is_group_key(key: &str) -> bool {
  key
    .strip_prefix(GROUP_PREFIX)
    .is_some_and(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
}

/// `email_group_<digits>` -> N. `None` for non-group keys and for N past `u64::MAX`.
pub fn group_index(key: &str) -> Option<u64> {
  if !is_group_key(key) {
    return None;
  }
  key[GROUP_PREFIX.len()..].parse().ok()
}

pub fn group_key(n: u64) -> String {
  format!("{GROUP_PREFIX}{n}")
}

/// `to` may be a list or a single address.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
  Many(Vec<String>),
  One(String),
}

/// Permissive wire shape of an email. Accepts `body` for `desc` and
/// `explanation` for `explain`; wrong JSON types fail deserialization.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawEmail {
  #[serde(default)] pub subject: Option<String>,
  #[serde(default)] pub from: Option<String>,
  #[serde(default)] pub to: Option<Recipients>,
  #[serde(default)] pub desc: Option<String>,
  #[serde(default)] pub body: Option<String>,
  #[serde(default)] pub attachment: Option<String>,
  #[serde(default)] pub correct: Option<String>,
  #[serde(default)] pub explain: Option<String>,
  #[serde(default)] pub explanation: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.filter(|v| !v.trim().is_empty())
}

impl RawEmail {
  pub fn from_value(value: &Value) -> Result<Self, ShapeError> {
    RawEmail::deserialize(value).map_err(|e| ShapeError::Decode(e.to_string()))
  }

  /// Lenient cleanup used on model output: trims text, lowercases the label,
  /// drops blank recipients and treats an empty attachment as absent.
  pub fn normalized(self) -> Self {
    let trim = |s: Option<String>| s.map(|v| v.trim().to_string());
    let to = self.to.map(|r| match r {
      Recipients::Many(v) => Recipients::Many(
        v.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
      ),
      Recipients::One(s) => Recipients::Many(
        Some(s.trim().to_string()).filter(|s| !s.is_empty()).into_iter().collect(),
      ),
    });
    Self {
      subject: trim(self.subject),
      from: trim(self.from),
      to,
      desc: trim(self.desc),
      body: trim(self.body),
      attachment: self.attachment,
      correct: self.correct.map(|c| c.trim().to_lowercase()),
      explain: trim(self.explain),
      explanation: trim(self.explanation),
    }
  }
}

impl TryFrom<RawEmail> for Email {
  type Error = ShapeError;

  fn try_from(raw: RawEmail) -> Result<Self, Self::Error> {
    let subject = non_blank(raw.subject).ok_or(ShapeError::Blank("subject"))?;
    let from = non_blank(raw.from).ok_or(ShapeError::Blank("from"))?;
    let to = match raw.to {
      Some(Recipients::Many(v)) if !v.is_empty() && v.iter().all(|s| !s.trim().is_empty()) => v,
      Some(Recipients::One(s)) if !s.trim().is_empty() => vec![s],
      _ => return Err(ShapeError::NoRecipients),
    };
    let desc = non_blank(raw.desc)
      .or_else(|| non_blank(raw.body))
      .ok_or(ShapeError::Blank("desc"))?;
    let correct: Label = raw.correct.as_deref().unwrap_or_default().parse()?;
    let explain = non_blank(raw.explain)
      .or_else(|| non_blank(raw.explanation))
      .ok_or(ShapeError::Blank("explain"))?;
    let attachment = raw.attachment.filter(|a| !a.is_empty());

    Ok(Email { subject, from, to, desc, attachment, correct, explain })
  }
}

pub fn parse_email(value: &Value) -> Result<Email, ShapeError> {
  Email::try_from(RawEmail::from_value(value)?)
}

/// Strict parse of one group entry into a `Pair`.
pub fn parse_pair(value: &Value) -> Result<Pair, PairError> {
  let arr = value
    .as_array()
    .filter(|a| a.len() == 2)
    .ok_or(PairError::NotAPair)?;
  let a = parse_email(&arr[0]).map_err(|source| PairError::Email { position: 0, source })?;
  let b = parse_email(&arr[1]).map_err(|source| PairError::Email { position: 1, source })?;
  Pair::new(a, b)
}

/// The whole data file, key order preserved.
#[derive(Clone, Debug, Default)]
pub struct Document {
  entries: Map<String, Value>,
}

impl Document {
  pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
    match serde_json::from_str::<Value>(s)? {
      Value::Object(entries) => Ok(Self { entries }),
      _ => Err(LoadError::NotAnObject),
    }
  }

  /// Group entries sorted by numeric suffix ascending.
  pub fn groups(&self) -> Vec<(u64, &str, &Value)> {
    let mut out: Vec<(u64, &str, &Value)> = self
      .entries
      .iter()
      .filter_map(|(k, v)| group_index(k).map(|n| (n, k.as_str(), v)))
      .collect();
    out.sort_by_key(|(n, _, _)| *n);
    out
  }

  /// Group-shaped keys whose N does not fit in a `u64`.
  pub fn out_of_range_groups(&self) -> Vec<&str> {
    self
      .entries
      .keys()
      .filter(|k| is_group_key(k) && group_index(k).is_none())
      .map(String::as_str)
      .collect()
  }

  /// Every group-shaped key, in range or not.
  pub fn group_count(&self) -> usize {
    self.entries.keys().filter(|k| is_group_key(k)).count()
  }

  /// Index for the next appended group. `None` once the range is used up,
  /// including when an out-of-range key already sits above every `u64`.
  pub fn next_group_index(&self) -> Option<u64> {
    if !self.out_of_range_groups().is_empty() {
      return None;
    }
    match self.entries.keys().filter_map(|k| group_index(k)).max() {
      Some(n) => n.checked_add(1),
      None => Some(1),
    }
  }

  fn highest_group_key(&self) -> String {
    if let Some(key) = self.out_of_range_groups().first() {
      return key.to_string();
    }
    self.entries.keys().filter_map(|k| group_index(k)).max().map(group_key).unwrap_or_default()
  }

  /// Append pairs as new sequential groups; returns the keys written.
  /// Nothing is inserted unless every new index fits.
  pub fn append_pairs(&mut self, pairs: &[Pair]) -> Result<Vec<String>, GenerateError> {
    if pairs.is_empty() {
      return Ok(Vec::new());
    }
    let overflow = |last: String| GenerateError::GroupIndexOverflow { last };
    let first = self.next_group_index().ok_or_else(|| overflow(self.highest_group_key()))?;
    let last = first
      .checked_add(pairs.len() as u64 - 1)
      .ok_or_else(|| overflow(group_key(u64::MAX)))?;

    let mut keys = Vec::with_capacity(pairs.len());
    for (n, pair) in (first..=last).zip(pairs) {
      let key = group_key(n);
      self.entries.insert(key.clone(), serde_json::to_value(pair)?);
      keys.push(key);
    }
    Ok(keys)
  }

  pub fn set_last_updated(&mut self, timestamp: String) {
    self.entries.insert(LAST_UPDATED_KEY.to_string(), Value::String(timestamp));
  }

  pub fn last_updated(&self) -> Option<&str> {
    self.entries.get(LAST_UPDATED_KEY).and_then(Value::as_str)
  }

  pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&self.entries)
  }
}

/// Keep every group that parses into a valid pair; drop the rest silently.
pub fn load_pairs(doc: &Document) -> Vec<Pair> {
  for key in doc.out_of_range_groups() {
    debug!(target: "quiz", %key, "Skipping group with out-of-range index");
  }
  let mut out = Vec::new();
  for (_, key, value) in doc.groups() {
    match parse_pair(value) {
      Ok(pair) => out.push(pair),
      Err(e) => debug!(target: "quiz", %key, error = %e, "Skipping unusable group"),
    }
  }
  out
}

/// Parse + filter; zero usable pairs is an error.
pub fn pairs_from_str(s: &str) -> Result<Vec<Pair>, LoadError> {
  let doc = Document::from_json_str(s)?;
  let pairs = load_pairs(&doc);
  if pairs.is_empty() {
    return Err(LoadError::NoUsableContent);
  }
  Ok(pairs)
}

/// The quiz's only I/O boundary.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_pairs(path: &Path) -> Result<Vec<Pair>, LoadError> {
  let text = tokio::fs::read_to_string(path)
    .await
    .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
  let pairs = pairs_from_str(&text)?;
  info!(target: "quiz", pairs = pairs.len(), "Loaded email pairs");
  Ok(pairs)
}
