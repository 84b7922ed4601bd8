//! APTT · Phishing-awareness quiz server
//!
//! - Axum HTTP + WebSocket API (one quiz session per WebSocket)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   EMAIL_FILE       : email data file (default "emails.json")
//!   ROUND_SIZE       : pairs per round (default 10)
//!   QUIZ_CONFIG_PATH : path to TOML config (quiz settings, generator, prompts)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use aptt_backend::routes::build_router;
use aptt_backend::state::AppState;
use aptt_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::new());
  // Startup inventory only; sessions re-read the file when they start.
  state.data_status().await;

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "aptt_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "aptt_backend", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
