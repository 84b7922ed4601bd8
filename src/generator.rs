//! Offline content generation: ask a model for candidate pairs, keep the ones
//! that satisfy the pair contract, archive the previous data file and append
//! the survivors as new `email_group_<N>` entries.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::{GeneratorCfg, Prompts};
use crate::document::{Document, RawEmail};
use crate::domain::{Email, Pair};
use crate::error::{GenerateError, PairError};
use crate::openai::OpenAI;
use crate::util::{extract_json_array, fill_template, trunc_for_log};

/// What to ask the model for.
#[derive(Clone, Debug)]
pub struct PairRequest {
  pub count: usize,
  pub topics: String,
  pub min_words: u32,
  pub max_words: u32,
  pub attachment_rate: u8,
}

impl From<&GeneratorCfg> for PairRequest {
  fn from(cfg: &GeneratorCfg) -> Self {
    Self {
      count: cfg.pairs_count,
      topics: cfg.topics.clone(),
      min_words: cfg.min_words,
      max_words: cfg.max_words,
      attachment_rate: cfg.attachment_rate,
    }
  }
}

/// Anything that can produce a raw model reply for a `PairRequest`.
#[allow(async_fn_in_trait)]
pub trait PairSource {
  async fn request_pairs(&self, req: &PairRequest) -> Result<String, GenerateError>;
}

/// Chat-completions backed source.
pub struct OpenAiPairSource {
  pub client: OpenAI,
  pub prompts: Prompts,
  pub temperature: f32,
  pub max_attempts: u32,
}

impl OpenAiPairSource {
  pub fn user_prompt(&self, req: &PairRequest) -> String {
    let topics_clause = if req.topics.trim().is_empty() {
      String::new()
    } else {
      format!(" Try to include these themes: {}.", req.topics.trim())
    };
    let count = req.count.to_string();
    let min_words = req.min_words.to_string();
    let max_words = req.max_words.to_string();
    let attachment_rate = req.attachment_rate.to_string();
    fill_template(
      &self.prompts.pairs_user_template,
      &[
        ("count", count.as_str()),
        ("topics_clause", topics_clause.as_str()),
        ("min_words", min_words.as_str()),
        ("max_words", max_words.as_str()),
        ("attachment_rate", attachment_rate.as_str()),
      ],
    )
  }
}

impl PairSource for OpenAiPairSource {
  #[instrument(level = "info", skip_all, fields(count = req.count))]
  async fn request_pairs(&self, req: &PairRequest) -> Result<String, GenerateError> {
    let user = self.user_prompt(req);
    let reply = self
      .client
      .chat_plain_retrying(&self.prompts.pairs_system, &user, self.temperature, self.max_attempts)
      .await?;
    Ok(reply)
  }
}

fn candidate_pair(item: &Value) -> Result<Pair, PairError> {
  let arr = item
    .get("pair")
    .and_then(Value::as_array)
    .filter(|a| a.len() == 2)
    .ok_or(PairError::NotAPair)?;
  let email = |position: usize| -> Result<Email, PairError> {
    RawEmail::from_value(&arr[position])
      .and_then(|raw| Email::try_from(raw.normalized()))
      .map_err(|source| PairError::Email { position, source })
  };
  Pair::new(email(0)?, email(1)?)
}

/// Pull the JSON array out of a model reply and keep the valid pairs.
/// An unparseable array fails the batch; bad individual candidates are dropped.
pub fn parse_candidates(reply: &str) -> Result<Vec<Pair>, GenerateError> {
  let items: Vec<Value> =
    serde_json::from_str(extract_json_array(reply)).map_err(GenerateError::Reply)?;
  let total = items.len();
  let mut out = Vec::with_capacity(total);
  for (i, item) in items.iter().enumerate() {
    match candidate_pair(item) {
      Ok(pair) => out.push(pair),
      Err(e) => debug!(target: "generator", candidate = i, error = %e, "Discarding candidate"),
    }
  }
  if out.len() < total {
    warn!(target: "generator", total, kept = out.len(), "Some candidates were discarded");
  }
  Ok(out)
}

#[derive(Clone, Debug)]
pub struct BuildPaths {
  pub main_file: PathBuf,
  pub archive_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct BuildOutcome {
  pub archive_file: PathBuf,
  pub new_only_file: PathBuf,
  pub main_file: PathBuf,
  pub pairs_added: usize,
  pub last_group: Option<String>,
}

#[derive(Serialize)]
struct Snapshot<'a> {
  generated_at: String,
  count_pairs: usize,
  pairs: &'a [Pair],
}

/// `YYYYMMDD_HHMMSSZ`, used in archive file names.
pub fn stamp(now: DateTime<Utc>) -> String {
  now.format("%Y%m%d_%H%M%SZ").to_string()
}

async fn write_file(path: &Path, contents: String) -> Result<(), GenerateError> {
  tokio::fs::write(path, contents)
    .await
    .map_err(|source| GenerateError::Io { path: path.to_path_buf(), source })
}

/// Existing file text (or `{}`) and the document parsed from it.
/// Unreadable or malformed files start from an empty document.
async fn read_current(path: &Path) -> (String, Document) {
  let text = match tokio::fs::read_to_string(path).await {
    Ok(t) => t,
    Err(e) => {
      warn!(target: "generator", path = %path.display(), error = %e, "Main data file unreadable; starting empty");
      return ("{}".to_string(), Document::default());
    }
  };
  match Document::from_json_str(&text) {
    Ok(doc) => (text, doc),
    Err(e) => {
      warn!(target: "generator", path = %path.display(), error = %e, "Main data file malformed; starting empty");
      (text, Document::default())
    }
  }
}

/// Full batch: backup, generate, snapshot, merge.
#[instrument(level = "info", skip_all, fields(main = %paths.main_file.display(), count = req.count))]
pub async fn build_email_pairs<S: PairSource>(
  source: &S,
  req: &PairRequest,
  paths: &BuildPaths,
  now: DateTime<Utc>,
) -> Result<BuildOutcome, GenerateError> {
  tokio::fs::create_dir_all(&paths.archive_dir)
    .await
    .map_err(|source| GenerateError::Io { path: paths.archive_dir.clone(), source })?;

  let (raw_text, mut doc) = read_current(&paths.main_file).await;
  let ts = stamp(now);

  let archive_file = paths.archive_dir.join(format!("emails_{ts}.json"));
  write_file(&archive_file, raw_text).await?;
  info!(target: "generator", path = %archive_file.display(), "Backed up data file");

  let reply = source.request_pairs(req).await?;
  debug!(target: "generator", reply = %trunc_for_log(&reply, 200), "Model reply");
  let pairs = parse_candidates(&reply)?;

  let generated_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
  let new_only_file = paths.archive_dir.join(format!("generated_email_pairs_{ts}.json"));
  let snapshot = Snapshot { generated_at: generated_at.clone(), count_pairs: pairs.len(), pairs: &pairs };
  write_file(&new_only_file, serde_json::to_string_pretty(&snapshot)?).await?;

  let keys = doc.append_pairs(&pairs)?;
  doc.set_last_updated(generated_at);
  write_file(&paths.main_file, doc.to_pretty_json()?).await?;
  info!(target: "generator", added = keys.len(), "Merged generated pairs");

  Ok(BuildOutcome {
    archive_file,
    new_only_file,
    main_file: paths.main_file.clone(),
    pairs_added: keys.len(),
    last_group: keys.last().cloned(),
  })
}
