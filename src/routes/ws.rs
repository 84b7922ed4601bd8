//! WebSocket upgrade + quiz session loop. Each connection owns one
//! `QuizSession`; every client message is applied to it and answered with a
//! single JSON view of the resulting phase (or an `ignored` notice).

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::protocol::{render, ClientWsMessage, ServerWsMessage};
use crate::session::{QuizSession, Step};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "aptt_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> bool {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  match socket.send(Message::Text(out)).await {
    Ok(()) => true,
    Err(e) => {
      error!(target: "aptt_backend", error = %e, "WS send error");
      false
    }
  }
}

#[instrument(level = "info", skip(socket, state), fields(session_id = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "aptt_backend", "WebSocket connected");
  let mut session = QuizSession::new(StdRng::from_entropy(), state.config.quiz.session_settings());

  // Loading is the only suspension point before play starts.
  if !send(&mut socket, &render(&session)).await {
    return;
  }
  session.load(state.load_pairs().await);
  if !send(&mut socket, &render(&session)).await {
    return;
  }

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "aptt_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &mut session)
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };
        if !send(&mut socket, &reply).await {
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "aptt_backend", phase = session.phase().name(), score = session.score(), "WebSocket disconnected");
}

/// Apply one client message to the session and build the reply.
pub fn handle_client_ws<R: Rng>(msg: ClientWsMessage, session: &mut QuizSession<R>) -> ServerWsMessage {
  let step = match msg {
    ClientWsMessage::Ping => return ServerWsMessage::Pong,
    ClientWsMessage::State => Step::Applied,
    ClientWsMessage::Pick { side } => session.pick(side),
    ClientWsMessage::Confirm => session.confirm(),
    ClientWsMessage::Key { key, ok_focused } => session.key(&key, ok_focused),
    ClientWsMessage::Dismiss { via } => session.dismiss(via),
    ClientWsMessage::Restart => session.restart(),
  };
  match step {
    Step::Applied => render(session),
    Step::Ignored(reason) => {
      debug!(target: "quiz", ?reason, phase = session.phase().name(), "Input ignored");
      ServerWsMessage::Ignored { reason, phase: session.phase().name() }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::tests::email;
  use crate::domain::{Label, Pair, Side};
  use crate::session::{DismissVia, IgnoreReason, SessionSettings};

  fn reply_type(m: &ServerWsMessage) -> String {
    serde_json::to_value(m).unwrap()["type"].as_str().unwrap().to_string()
  }

  #[test]
  fn full_exchange_over_messages() {
    let mut s = QuizSession::new(StdRng::seed_from_u64(3), SessionSettings::default());
    assert_eq!(reply_type(&render(&s)), "loading");
    s.load(Ok(vec![Pair::new(email("s", Label::Safe), email("p", Label::Phish)).unwrap()]));

    assert_eq!(reply_type(&handle_client_ws(ClientWsMessage::Ping, &mut s)), "pong");
    assert_eq!(reply_type(&handle_client_ws(ClientWsMessage::State, &mut s)), "pair");
    assert_eq!(reply_type(&handle_client_ws(ClientWsMessage::Pick { side: Side::Left }, &mut s)), "verdict");

    let r = handle_client_ws(ClientWsMessage::Dismiss { via: DismissVia::Backdrop }, &mut s);
    assert!(matches!(r, ServerWsMessage::Ignored { reason: IgnoreReason::ConfirmRequired, phase: "locked" }));
    let r = handle_client_ws(ClientWsMessage::Pick { side: Side::Right }, &mut s);
    assert!(matches!(r, ServerWsMessage::Ignored { reason: IgnoreReason::Locked, .. }));

    assert_eq!(reply_type(&handle_client_ws(ClientWsMessage::Confirm, &mut s)), "finished");
    assert_eq!(reply_type(&handle_client_ws(ClientWsMessage::Restart, &mut s)), "pair");
  }
}
