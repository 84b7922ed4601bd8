//! APTT · Phishing-awareness quiz backend
//!
//! Library behind three binaries:
//!   - `aptt-backend`      : Axum HTTP + WebSocket quiz server
//!   - `validate_emails`   : checks the email data file
//!   - `build_email_pairs` : generates new pairs via OpenAI and merges them

pub mod config;
pub mod deck;
pub mod document;
pub mod domain;
pub mod error;
pub mod feedback;
pub mod generator;
pub mod openai;
pub mod protocol;
pub mod routes;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod validate;
