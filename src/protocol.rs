//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Emails go out without their label or explanation; those only reach the
//! client inside a verdict, after the pick is locked in.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{Email, Side};
use crate::feedback::FeedbackTier;
use crate::session::{DismissVia, Highlight, IgnoreReason, Phase, QuizSession};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Re-send the current view.
    State,
    Pick {
        side: Side,
    },
    Confirm,
    Key {
        key: String,
        #[serde(rename = "okFocused", default)]
        ok_focused: bool,
    },
    Dismiss {
        via: DismissVia,
    },
    Restart,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Loading,
    Pair {
        index: usize,
        total: usize,
        score: usize,
        left: EmailOut,
        right: EmailOut,
    },
    Verdict {
        title: &'static str,
        correct: bool,
        chosen: Side,
        explanation: String,
        other: OtherExplanation,
        highlight: Highlight,
    },
    Finished {
        score: usize,
        total: usize,
        percent: u8,
        tier: FeedbackTier,
        feedback: &'static str,
    },
    Ignored {
        reason: IgnoreReason,
        phase: &'static str,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct OtherExplanation {
    pub side: Side,
    pub explanation: String,
}

/// DTO for one email card.
#[derive(Debug, Serialize)]
pub struct EmailOut {
    pub subject: String,
    pub from: String,
    pub to: Vec<String>,
    pub desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub attachment_warning: bool,
}

pub fn to_out(e: &Email) -> EmailOut {
    EmailOut {
        subject: e.subject.clone(),
        from: e.from.clone(),
        to: e.to.clone(),
        desc: e.desc.clone(),
        attachment: e.attachment.clone(),
        attachment_warning: e.attachment_looks_executable(),
    }
}

/// The view for the session's current phase.
pub fn render<R: Rng>(session: &QuizSession<R>) -> ServerWsMessage {
    match session.phase() {
        Phase::Loading => ServerWsMessage::Loading,
        Phase::Error { message } => ServerWsMessage::Error { message: message.clone() },
        Phase::Presenting => match session.current_pair() {
            Some((left, right)) => ServerWsMessage::Pair {
                index: session.index(),
                total: session.round_len(),
                score: session.score(),
                left: to_out(left),
                right: to_out(right),
            },
            None => ServerWsMessage::Error { message: "No pair to present.".into() },
        },
        Phase::Locked(v) => ServerWsMessage::Verdict {
            title: v.title(),
            correct: v.correct,
            chosen: v.chosen,
            explanation: v.chosen_explain.clone(),
            other: OtherExplanation { side: v.chosen.other(), explanation: v.other_explain.clone() },
            highlight: v.highlight,
        },
        Phase::Finished => {
            let s = session.summary();
            ServerWsMessage::Finished {
                score: s.score,
                total: s.total,
                percent: s.percent,
                tier: s.tier,
                feedback: s.tier.message(),
            }
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Data file check, re-read on every request.
#[derive(Debug, Serialize)]
pub struct StatusOut {
    pub ok: bool,
    pub data_path: String,
    pub groups: usize,
    pub pairs: usize,
    pub round_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub percent: u8,
}

#[derive(Serialize)]
pub struct FeedbackOut {
    pub percent: u8,
    pub tier: FeedbackTier,
    pub message: &'static str,
}
