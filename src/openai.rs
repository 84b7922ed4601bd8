//! Minimal OpenAI client for the offline pair generator.
//!
//! We only call chat.completions and ask for plain text (the reply is expected
//! to contain a JSON array, which the generator extracts and filters).
//! Calls are instrumented and log model names, latencies and response sizes
//! (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::OpenAiError;

const BACKOFF_BASE: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    // Batches of long emails take a while to come back.
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(180))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  pub fn with_model(mut self, model: Option<String>) -> Self {
    if let Some(m) = model.filter(|m| !m.is_empty()) {
      self.model = m;
    }
    self
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  pub async fn chat_plain(&self, system: &str, user: &str, temperature: f32) -> Result<String, OpenAiError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
    };

    let start = std::time::Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "aptt-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(OpenAiError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Model response received");
    Ok(text)
  }

  /// `chat_plain` with exponential backoff on retryable failures.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  pub async fn chat_plain_retrying(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
    max_attempts: u32,
  ) -> Result<String, OpenAiError> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
      match self.chat_plain(system, user, temperature).await {
        Ok(text) => return Ok(text),
        Err(e) if attempt < max_attempts && e.is_retryable() => {
          let delay = BACKOFF_BASE * 2u32.pow(attempt - 1);
          warn!(attempt, ?delay, error = %e, "OpenAI call failed; retrying");
          tokio::time::sleep(delay).await;
          attempt += 1;
        }
        Err(e) => return Err(e),
      }
    }
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
