//! End-to-end through the loader and the session controller.

use aptt_backend::document::{pairs_from_str, read_pairs};
use aptt_backend::error::LoadError;
use aptt_backend::feedback::FeedbackTier;
use aptt_backend::session::{DismissVia, Phase, QuizSession, SessionSettings, Step};
use aptt_backend::domain::Side;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

mod common;

fn one_pair_session(seed: u64) -> QuizSession<StdRng> {
    let text = json!({
        "email_group_1": [common::email("A", "safe"), common::email("B", "phish")]
    })
    .to_string();
    let mut s = QuizSession::new(StdRng::seed_from_u64(seed), SessionSettings::default());
    s.load(pairs_from_str(&text));
    s
}

fn side_of(s: &QuizSession<StdRng>, subject: &str) -> Side {
    let (left, _) = s.current_pair().expect("a pair on screen");
    if left.subject == subject { Side::Left } else { Side::Right }
}

#[test]
fn picking_the_phish_scores_one_of_one() {
    let mut s = one_pair_session(1);
    let b = side_of(&s, "B");
    assert_eq!(s.pick(b), Step::Applied);
    assert_eq!(s.score(), 0, "score only moves on confirm");
    s.confirm();
    assert_eq!(s.phase(), &Phase::Finished);
    let sum = s.summary();
    assert_eq!((sum.score, sum.total, sum.percent), (1, 1, 100));
    assert_eq!(sum.tier, FeedbackTier::Sharp);
}

#[test]
fn picking_the_safe_email_scores_zero() {
    let mut s = one_pair_session(2);
    let a = side_of(&s, "A");
    s.pick(a);
    s.confirm();
    let sum = s.summary();
    assert_eq!((sum.score, sum.total, sum.percent), (0, 1, 0));
}

#[test]
fn dismissals_never_advance_a_locked_session() {
    let mut s = one_pair_session(3);
    s.pick(Side::Left);
    for via in [DismissVia::OutsideClick, DismissVia::Backdrop, DismissVia::Escape] {
        assert!(matches!(s.dismiss(via), Step::Ignored(_)));
    }
    assert!(matches!(s.key("Escape", true), Step::Ignored(_)));
    assert!(s.is_locked());
    assert_eq!(s.index(), 0);
}

#[test]
fn many_rounds_cycle_through_the_pool() {
    let text = common::data_file(23).to_string();
    let mut s = QuizSession::new(StdRng::seed_from_u64(4), SessionSettings { round_size: 10, highlight_ms: 3_000 });
    s.load(pairs_from_str(&text));
    assert_eq!(s.pool_size(), 23);

    let mut lens = Vec::new();
    for _ in 0..4 {
        lens.push(s.round_len());
        while s.phase() != &Phase::Finished {
            s.pick(Side::Right);
            s.confirm();
        }
        s.restart();
    }
    assert_eq!(lens, [10, 10, 3, 10]);
}

#[tokio::test]
async fn missing_file_puts_session_in_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_pairs(&dir.path().join("emails.json")).await;
    assert!(matches!(result, Err(LoadError::Io { .. })));
    let mut s = QuizSession::new(StdRng::seed_from_u64(5), SessionSettings::default());
    s.load(result);
    assert!(matches!(s.phase(), Phase::Error { message } if message.starts_with("Failed to load data.")));
    assert!(s.current_pair().is_none());
}
