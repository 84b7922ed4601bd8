//! Error types shared by the quiz server and the offline tools.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Label;

/// Why a single email object was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("not an email object: {0}")]
    Decode(String),
    #[error("missing or blank `{0}`")]
    Blank(&'static str),
    #[error("`to` has no usable recipients")]
    NoRecipients,
    #[error("`correct` must be \"phish\" or \"safe\", got {0:?}")]
    BadLabel(String),
}

/// Why a group entry could not become a `Pair`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("must be an array of exactly 2 emails")]
    NotAPair,
    #[error("email shape invalid ({source})")]
    Email {
        position: usize,
        #[source]
        source: ShapeError,
    },
    #[error("pair must contain exactly one \"phish\" and one \"safe\" (both are {0})")]
    SameLabel(Label),
}

/// Failure to turn the data file into a usable pair set.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("data file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("data file must be a JSON object keyed by email_group_<N>")]
    NotAnObject,
    #[error("no valid pairs found in the data file")]
    NoUsableContent,
}

/// Errors talking to the chat-completions endpoint.
#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("OpenAI transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("OpenAI HTTP {status}: {message}")]
    Http { status: u16, message: String },
}

impl OpenAiError {
    /// Rate limits and server-side failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAiError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            OpenAiError::Http { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Fatal failures of the offline generator batch.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("model reply is not a JSON array: {0}")]
    Reply(#[source] serde_json::Error),
    #[error("no email_group_<N> index left after {last}")]
    GroupIndexOverflow { last: String },
    #[error(transparent)]
    Model(#[from] OpenAiError),
}
