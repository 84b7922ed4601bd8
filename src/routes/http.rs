//! HTTP endpoint handlers. These are thin wrappers over state and scoring.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::feedback::feedback;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

/// 200 when the data file yields at least one pair, 503 otherwise.
#[instrument(level = "info", skip(state))]
pub async fn http_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let status = state.data_status().await;
  let code = if status.ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
  info!(target: "aptt_backend", pairs = status.pairs, ok = status.ok, "HTTP status served");
  (code, Json(status))
}

#[instrument(level = "info", fields(percent = q.percent))]
pub async fn http_feedback(Query(q): Query<FeedbackQuery>) -> impl IntoResponse {
  let percent = q.percent.min(100);
  let tier = feedback(percent);
  Json(FeedbackOut { percent, tier, message: tier.message() })
}
