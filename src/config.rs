//! Configuration: optional TOML file (QUIZ_CONFIG_PATH) plus env overrides.
//!
//! Schema:
//!   [quiz]       data_path, round_size, highlight_ms
//!   [generator]  pairs_count, topics, min_words, max_words, attachment_rate,
//!                temperature, max_attempts, archive_dir, model
//!   [prompts]    pairs_system, pairs_user_template
//!
//! Env variables win over the file: EMAIL_FILE, PAIRS_COUNT, EMAIL_TOPICS,
//! MIN_WORDS, MAX_WORDS, ATTACHMENT_RATE, ARCHIVE_DIR, ROUND_SIZE.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::deck::DEFAULT_ROUND_SIZE;
use crate::session::{SessionSettings, DEFAULT_HIGHLIGHT_MS};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub quiz: QuizCfg,
  #[serde(default)]
  pub generator: GeneratorCfg,
  #[serde(default)]
  pub prompts: Prompts,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizCfg {
  pub data_path: PathBuf,
  pub round_size: usize,
  pub highlight_ms: u64,
}

impl Default for QuizCfg {
  fn default() -> Self {
    Self {
      data_path: PathBuf::from("emails.json"),
      round_size: DEFAULT_ROUND_SIZE,
      highlight_ms: DEFAULT_HIGHLIGHT_MS,
    }
  }
}

impl QuizCfg {
  pub fn session_settings(&self) -> SessionSettings {
    SessionSettings { round_size: self.round_size, highlight_ms: self.highlight_ms }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorCfg {
  pub pairs_count: usize,
  pub topics: String,
  pub min_words: u32,
  pub max_words: u32,
  /// Percentage of emails that should carry an attachment.
  pub attachment_rate: u8,
  pub temperature: f32,
  pub max_attempts: u32,
  pub archive_dir: PathBuf,
  pub model: Option<String>,
}

impl Default for GeneratorCfg {
  fn default() -> Self {
    Self {
      pairs_count: 10,
      topics: String::new(),
      min_words: 50,
      max_words: 400,
      attachment_rate: 50,
      temperature: 0.4,
      max_attempts: 3,
      archive_dir: PathBuf::from("archive"),
      model: None,
    }
  }
}

/// Prompts used by the generator. Placeholders: {count}, {topics_clause},
/// {min_words}, {max_words}, {attachment_rate}.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub pairs_system: String,
  pub pairs_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      pairs_system: r#"You write realistic internal corporate emails for a phishing-awareness training game.

Reply with ONLY a JSON array. Each element is an object of this form:

{"pair": [EMAIL, EMAIL]}

where EMAIL is:

{
  "subject": "string",
  "from": "name@domain.tld",
  "to": ["employee@company.com"],
  "attachment": "optional filename, e.g. \"agenda.pdf\" or \"invoice.pdf.exe\"",
  "desc": "full plain-text email body",
  "correct": "phish" or "safe",
  "explain": "one or two sentences on why this email is phishing or legitimate"
}

Rules:
- In every pair exactly one email is "phish" and the other is "safe".
- Both emails of a pair share one scenario (payroll change, benefits enrolment, travel booking, security notice, facilities work, policy update, training invitation, performance review, ...).
- "desc" reads like a real business email: a greeting, one to three short paragraphs separated by \n\n, then a sign-off with name and role. No HTML.
- Safe emails use the correct company domain, a normal tone, HTTPS links on that domain and never ask for credentials or personal data.
- Phish emails contain at least one clear red flag: a lookalike or misspelled domain, an executable attachment, urgent or threatening wording, a request for credentials, payment or personal data, or a non-HTTPS link.
- No Markdown, no comments, nothing before or after the array."#
        .into(),
      pairs_user_template: r#"Create {count} pairs of internal corporate emails for phishing training.{topics_clause}

For every email:
- Aim for a body between {min_words} and {max_words} words, written as a complete email with \n\n between paragraphs.
- Add an "attachment" to roughly {attachment_rate}% of all emails. Safe attachments look like "benefits_overview.pdf" or "meeting_agenda.pdf"; phishing attachments look like "benefits_overview.pdf.exe" or "security_update.exe".
- Keep one "phish" and one "safe" email per pair, both about the same scenario.
Return only the JSON array described in the system message."#
        .into(),
    }
  }
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "aptt_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "aptt_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "aptt_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

impl AppConfig {
  /// File (if any), then process env on top.
  pub fn from_env() -> Self {
    let mut cfg = load_config_from_env().unwrap_or_default();
    cfg.apply_env_with(|k| std::env::var(k).ok());
    cfg
  }

  /// Apply overrides from any key lookup. Unparseable numbers are logged and skipped.
  pub fn apply_env_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
    fn parsed<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
      let raw = raw?;
      match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
          warn!(target: "aptt_backend", %key, value = %raw, "Ignoring unparseable env override");
          None
        }
      }
    }

    if let Some(p) = lookup("EMAIL_FILE").filter(|s| !s.is_empty()) {
      self.quiz.data_path = PathBuf::from(p);
    }
    if let Some(p) = lookup("ARCHIVE_DIR").filter(|s| !s.is_empty()) {
      self.generator.archive_dir = PathBuf::from(p);
    }
    if let Some(t) = lookup("EMAIL_TOPICS") {
      self.generator.topics = t;
    }
    if let Some(v) = parsed("ROUND_SIZE", lookup("ROUND_SIZE")) {
      self.quiz.round_size = v;
    }
    if let Some(v) = parsed("PAIRS_COUNT", lookup("PAIRS_COUNT")) {
      self.generator.pairs_count = v;
    }
    if let Some(v) = parsed("MIN_WORDS", lookup("MIN_WORDS")) {
      self.generator.min_words = v;
    }
    if let Some(v) = parsed("MAX_WORDS", lookup("MAX_WORDS")) {
      self.generator.max_words = v;
    }
    if let Some(v) = parsed::<u8>("ATTACHMENT_RATE", lookup("ATTACHMENT_RATE")) {
      self.generator.attachment_rate = v.min(100);
    }
  }
}
