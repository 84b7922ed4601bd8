//! Validates the email data file used by the quiz.
//!
//! Env:
//!   EMAIL_FILE : file to check (default "emails.json")
//!   MIN_WORDS  : soft lower bound on body words, 0 disables (default 0)
//!   MAX_WORDS  : soft upper bound on body words, 0 disables (default 0)
//!
//! Exit code 0 on success, 1 on any error. The file is never written.

use std::process::ExitCode;

use aptt_backend::telemetry;
use aptt_backend::validate::{validate_str, WordLimits};

fn env_u32(key: &str) -> u32 {
  std::env::var(key).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn main() -> ExitCode {
  telemetry::init_cli_tracing();

  let file = std::env::var("EMAIL_FILE").unwrap_or_else(|_| "emails.json".into());
  let limits = WordLimits { min: env_u32("MIN_WORDS"), max: env_u32("MAX_WORDS") };

  let text = match std::fs::read_to_string(&file) {
    Ok(t) => t,
    Err(e) => {
      eprintln!("Validation failed:\n{file}: cannot read file: {e}");
      return ExitCode::FAILURE;
    }
  };
  let report = match validate_str(&text, limits) {
    Ok(r) => r,
    Err(e) => {
      eprintln!("Validation failed:\n{file}: {e}");
      return ExitCode::FAILURE;
    }
  };

  if !report.is_ok() {
    eprintln!("Validation failed:\n{}", report.errors.join("\n"));
    if !report.warnings.is_empty() {
      eprintln!("\nWarnings:\n{}", report.warnings.join("\n"));
    }
    return ExitCode::FAILURE;
  }

  println!("Validation passed for {} groups in {file}.", report.groups);
  if !report.warnings.is_empty() {
    println!("\nWarnings:\n{}", report.warnings.join("\n"));
  }
  ExitCode::SUCCESS
}
