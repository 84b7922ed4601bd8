//! Application state shared by all handlers: configuration only.
//!
//! Quiz sessions are not stored here. Each WebSocket connection owns its own
//! `QuizSession` and reads the data file once when it starts.

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::document::{load_pairs, read_pairs, Document};
use crate::domain::Pair;
use crate::error::LoadError;
use crate::protocol::StatusOut;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    /// Build state from env: TOML config (if any) plus env overrides.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = AppConfig::from_env();
        info!(
            target: "aptt_backend",
            data_path = %config.quiz.data_path.display(),
            round_size = config.quiz.round_size,
            highlight_ms = config.quiz.highlight_ms,
            "Quiz configuration"
        );
        Self { config }
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn data_path(&self) -> &Path {
        &self.config.quiz.data_path
    }

    /// Fresh read of the data file for a new session.
    pub async fn load_pairs(&self) -> Result<Vec<Pair>, LoadError> {
        read_pairs(self.data_path()).await
    }

    /// Inventory of the data file, used by the status endpoint and at startup.
    #[instrument(level = "debug", skip(self))]
    pub async fn data_status(&self) -> StatusOut {
        let path = self.data_path();
        let mut out = StatusOut {
            ok: false,
            data_path: path.display().to_string(),
            groups: 0,
            pairs: 0,
            round_size: self.config.quiz.session_settings().clamped().round_size,
            last_updated: None,
            error: None,
        };

        let text = match tokio::fs::read_to_string(path).await {
            Ok(t) => t,
            Err(source) => {
                out.error = Some(LoadError::Io { path: path.to_path_buf(), source }.to_string());
                return out;
            }
        };
        match Document::from_json_str(&text) {
            Ok(doc) => {
                out.groups = doc.group_count();
                out.pairs = load_pairs(&doc).len();
                out.last_updated = doc.last_updated().map(str::to_string);
                if out.pairs == 0 {
                    out.error = Some(LoadError::NoUsableContent.to_string());
                } else {
                    out.ok = true;
                }
            }
            Err(e) => out.error = Some(e.to_string()),
        }

        if out.ok {
            info!(target: "aptt_backend", groups = out.groups, pairs = out.pairs, "Data file inventory");
        } else {
            warn!(target: "aptt_backend", error = ?out.error, "Data file not usable");
        }
        out
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
