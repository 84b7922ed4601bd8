//! Generates new phish/safe email pairs and merges them into the data file.
//!
//! Steps: archive the current file, ask the model for PAIRS_COUNT pairs,
//! write a new-only snapshot, append survivors as email_group_<next>.
//!
//! Env (overrides QUIZ_CONFIG_PATH settings):
//!   OPENAI_API_KEY (required), OPENAI_BASE_URL, OPENAI_MODEL
//!   EMAIL_FILE, ARCHIVE_DIR, PAIRS_COUNT, EMAIL_TOPICS,
//!   MIN_WORDS, MAX_WORDS, ATTACHMENT_RATE

use std::process::ExitCode;

use chrono::Utc;
use tracing::error;

use aptt_backend::config::AppConfig;
use aptt_backend::generator::{build_email_pairs, BuildPaths, OpenAiPairSource, PairRequest};
use aptt_backend::openai::OpenAI;
use aptt_backend::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
  telemetry::init_cli_tracing();
  let cfg = AppConfig::from_env();

  let Some(client) = OpenAI::from_env() else {
    error!(target: "generator", "OPENAI_API_KEY not set; nothing to generate with");
    eprintln!("OPENAI_API_KEY is required.");
    return ExitCode::FAILURE;
  };

  let source = OpenAiPairSource {
    client: client.with_model(cfg.generator.model.clone()),
    prompts: cfg.prompts.clone(),
    temperature: cfg.generator.temperature,
    max_attempts: cfg.generator.max_attempts,
  };
  let req = PairRequest::from(&cfg.generator);
  let paths = BuildPaths {
    main_file: cfg.quiz.data_path.clone(),
    archive_dir: cfg.generator.archive_dir.clone(),
  };

  match build_email_pairs(&source, &req, &paths, Utc::now()).await {
    Ok(out) => {
      println!("Archived -> {}", out.archive_file.display());
      println!("New-only -> {} ({} pairs)", out.new_only_file.display(), out.pairs_added);
      match &out.last_group {
        Some(last) => println!("Merged  -> {} (now up to {last})", out.main_file.display()),
        None => println!("Merged  -> {} (no new groups)", out.main_file.display()),
      }
      ExitCode::SUCCESS
    }
    Err(e) => {
      error!(target: "generator", error = %e, "Generation batch failed");
      eprintln!("Generation failed: {e}");
      ExitCode::FAILURE
    }
  }
}
