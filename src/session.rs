//! Interaction controller: one quiz session as an explicit state machine.
//!
//! States: `Loading -> Presenting -> Locked -> Presenting | Finished`, with a
//! terminal `Error` when the data could not be loaded. Every input either
//! applies (and the caller re-renders the current phase) or is ignored with a
//! reason; ignored inputs never touch score, index or lock.
//!
//! The lock is the `Locked` phase itself: while a verdict is on screen only an
//! explicit confirmation moves the session forward.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::deck::{Dealt, Deck, DEFAULT_ROUND_SIZE};
use crate::domain::{Email, Pair, Side};
use crate::error::LoadError;
use crate::feedback::{feedback, percent, FeedbackTier};

pub const DEFAULT_HIGHLIGHT_MS: u64 = 2_000;
pub const MAX_HIGHLIGHT_MS: u64 = 6_000;

#[derive(Clone, Copy, Debug)]
pub struct SessionSettings {
    pub round_size: usize,
    pub highlight_ms: u64,
}

impl SessionSettings {
    /// At least one pair per round; highlight within 2000..=6000 ms.
    pub fn clamped(self) -> Self {
        Self {
            round_size: self.round_size.max(1),
            highlight_ms: self.highlight_ms.clamp(DEFAULT_HIGHLIGHT_MS, MAX_HIGHLIGHT_MS),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { round_size: DEFAULT_ROUND_SIZE, highlight_ms: DEFAULT_HIGHLIGHT_MS }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Affirmative,
    Negative,
}

/// Cosmetic outline on the chosen card; the client clears it after `duration_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub side: Side,
    pub tone: Tone,
    pub duration_ms: u64,
}

/// What the confirmation surface shows after a pick.
#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
    pub chosen: Side,
    pub correct: bool,
    pub chosen_explain: String,
    pub other_explain: String,
    pub highlight: Highlight,
}

impl Verdict {
    pub fn title(&self) -> &'static str {
        if self.correct { "Correct" } else { "Incorrect" }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Loading,
    Error { message: String },
    Presenting,
    Locked(Verdict),
    Finished,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Error { .. } => "error",
            Phase::Presenting => "presenting",
            Phase::Locked(_) => "locked",
            Phase::Finished => "finished",
        }
    }
}

/// Ways a client may try to close the verdict without confirming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissVia {
    OutsideClick,
    Backdrop,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NotReady,
    Locked,
    NothingToConfirm,
    ConfirmRequired,
    KeyNotAccepted,
    RoundOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Applied,
    Ignored(IgnoreReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub score: usize,
    pub total: usize,
    pub percent: u8,
    pub tier: FeedbackTier,
}

pub struct QuizSession<R> {
    rng: R,
    settings: SessionSettings,
    deck: Option<Deck>,
    order: Vec<Dealt>,
    index: usize,
    score: usize,
    phase: Phase,
}

impl<R: Rng> QuizSession<R> {
    pub fn new(rng: R, settings: SessionSettings) -> Self {
        Self {
            rng,
            settings: settings.clamped(),
            deck: None,
            order: Vec::new(),
            index: 0,
            score: 0,
            phase: Phase::Loading,
        }
    }

    /// Completion of the data load. Only meaningful while `Loading`.
    pub fn load(&mut self, result: Result<Vec<Pair>, LoadError>) -> Step {
        if self.phase != Phase::Loading {
            return Step::Ignored(IgnoreReason::NotReady);
        }
        match result.and_then(|pairs| {
            if pairs.is_empty() { Err(LoadError::NoUsableContent) } else { Ok(pairs) }
        }) {
            Ok(pairs) => {
                let pairs: Arc<[Pair]> = pairs.into();
                self.deck = Some(Deck::new(pairs, &mut self.rng));
                self.start_round();
                info!(target: "quiz", pairs = self.pool_size(), round_len = self.order.len(), "Session ready");
            }
            Err(e) => {
                warn!(target: "quiz", error = %e, "Session failed to load data");
                self.phase = Phase::Error { message: format!("Failed to load data. {e}") };
            }
        }
        Step::Applied
    }

    /// The user marks the email on `side` as the phish.
    pub fn pick(&mut self, side: Side) -> Step {
        match self.phase {
            Phase::Presenting => {}
            Phase::Locked(_) => return Step::Ignored(IgnoreReason::Locked),
            Phase::Finished => return Step::Ignored(IgnoreReason::RoundOver),
            Phase::Loading | Phase::Error { .. } => return Step::Ignored(IgnoreReason::NotReady),
        }
        let Some((chosen, other)) = self.current_emails_for(side) else {
            return Step::Ignored(IgnoreReason::RoundOver);
        };
        let correct = chosen.is_phish();
        let verdict = Verdict {
            chosen: side,
            correct,
            chosen_explain: chosen.explain.clone(),
            other_explain: other.explain.clone(),
            highlight: Highlight {
                side,
                tone: if correct { Tone::Affirmative } else { Tone::Negative },
                duration_ms: self.settings.highlight_ms,
            },
        };
        info!(target: "quiz", index = self.index, %side, correct, "Answer locked");
        self.phase = Phase::Locked(verdict);
        Step::Applied
    }

    /// The OK control. The only path that scores and advances.
    pub fn confirm(&mut self) -> Step {
        let correct = match &self.phase {
            Phase::Locked(verdict) => verdict.correct,
            _ => return Step::Ignored(IgnoreReason::NothingToConfirm),
        };
        if correct {
            self.score += 1;
        }
        self.index += 1;
        self.phase = if self.index >= self.order.len() { Phase::Finished } else { Phase::Presenting };
        if self.phase == Phase::Finished {
            let s = self.summary();
            info!(target: "quiz", score = s.score, total = s.total, percent = s.percent, "Round finished");
        }
        Step::Applied
    }

    /// Enter or Space while the OK control has focus confirm; nothing else does.
    pub fn key(&mut self, key: &str, ok_focused: bool) -> Step {
        if !matches!(self.phase, Phase::Locked(_)) {
            return Step::Ignored(IgnoreReason::NothingToConfirm);
        }
        match key {
            "Enter" | " " | "Space" | "Spacebar" if ok_focused => self.confirm(),
            "Escape" | "Esc" => Step::Ignored(IgnoreReason::ConfirmRequired),
            _ => Step::Ignored(IgnoreReason::KeyNotAccepted),
        }
    }

    /// Outside clicks, backdrop clicks and Escape never close the verdict.
    pub fn dismiss(&mut self, via: DismissVia) -> Step {
        if matches!(self.phase, Phase::Locked(_)) {
            info!(target: "quiz", ?via, "Dismissal without confirmation ignored");
            Step::Ignored(IgnoreReason::ConfirmRequired)
        } else {
            Step::Ignored(IgnoreReason::NothingToConfirm)
        }
    }

    /// Deal a fresh round. Allowed from `Presenting` and `Finished`.
    pub fn restart(&mut self) -> Step {
        match self.phase {
            Phase::Presenting | Phase::Finished => {
                self.start_round();
                info!(target: "quiz", round_len = self.order.len(), "Round restarted");
                Step::Applied
            }
            Phase::Locked(_) => Step::Ignored(IgnoreReason::Locked),
            Phase::Loading | Phase::Error { .. } => Step::Ignored(IgnoreReason::NotReady),
        }
    }

    fn start_round(&mut self) {
        let Some(deck) = self.deck.as_mut() else { return };
        self.order = deck.deal(self.settings.round_size, &mut self.rng);
        self.index = 0;
        self.score = 0;
        self.phase = if self.order.is_empty() { Phase::Finished } else { Phase::Presenting };
    }

    fn current_emails_for(&self, side: Side) -> Option<(&Email, &Email)> {
        let deck = self.deck.as_ref()?;
        let dealt = *self.order.get(self.index)?;
        Some((deck.email_at(dealt, side), deck.email_at(dealt, side.other())))
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.phase, Phase::Locked(_))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn round_len(&self) -> usize {
        self.order.len()
    }

    pub fn pool_size(&self) -> usize {
        self.deck.as_ref().map(Deck::len).unwrap_or(0)
    }

    /// (left, right) for the pair on screen, if any.
    pub fn current_pair(&self) -> Option<(&Email, &Email)> {
        if !matches!(self.phase, Phase::Presenting | Phase::Locked(_)) {
            return None;
        }
        self.current_emails_for(Side::Left)
    }

    pub fn summary(&self) -> Summary {
        let total = self.order.len();
        let pct = percent(self.score, total);
        Summary { score: self.score, total, percent: pct, tier: feedback(pct) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::email;
    use crate::domain::Label;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pairs(n: usize) -> Vec<Pair> {
        (0..n)
            .map(|i| Pair::new(email(&format!("s{i}"), Label::Safe), email(&format!("p{i}"), Label::Phish)).unwrap())
            .collect()
    }

    fn ready(n: usize, seed: u64) -> QuizSession<StdRng> {
        let mut s = QuizSession::new(StdRng::seed_from_u64(seed), SessionSettings::default());
        assert_eq!(s.load(Ok(pairs(n))), Step::Applied);
        s
    }

    fn phish_side(s: &QuizSession<StdRng>) -> Side {
        let (left, _) = s.current_pair().unwrap();
        if left.is_phish() { Side::Left } else { Side::Right }
    }

    #[test]
    fn load_failure_enters_error_and_blocks_everything() {
        let mut s = QuizSession::new(StdRng::seed_from_u64(1), SessionSettings::default());
        s.load(Err(LoadError::NoUsableContent));
        assert!(matches!(s.phase(), Phase::Error { message } if message.contains("no valid pairs")));
        assert_eq!(s.pick(Side::Left), Step::Ignored(IgnoreReason::NotReady));
        assert_eq!(s.restart(), Step::Ignored(IgnoreReason::NotReady));
        assert_eq!(s.load(Ok(pairs(1))), Step::Ignored(IgnoreReason::NotReady));
    }

    #[test]
    fn empty_pair_list_is_treated_as_no_content() {
        let mut s = QuizSession::new(StdRng::seed_from_u64(1), SessionSettings::default());
        s.load(Ok(Vec::new()));
        assert_eq!(s.phase().name(), "error");
    }

    #[test]
    fn picks_while_locked_are_no_ops() {
        let mut s = ready(3, 2);
        let side = phish_side(&s);
        assert_eq!(s.pick(side), Step::Applied);
        assert!(s.is_locked());
        let before = (s.score(), s.index());
        assert_eq!(s.pick(side.other()), Step::Ignored(IgnoreReason::Locked));
        assert_eq!(s.pick(side), Step::Ignored(IgnoreReason::Locked));
        assert_eq!((s.score(), s.index()), before);
        match s.phase() {
            Phase::Locked(v) => assert_eq!(v.chosen, side),
            other => panic!("unexpected phase {other:?}"),
        }
    }

    #[test]
    fn only_explicit_confirmation_advances() {
        let mut s = ready(3, 4);
        s.pick(Side::Left);
        assert_eq!(s.dismiss(DismissVia::OutsideClick), Step::Ignored(IgnoreReason::ConfirmRequired));
        assert_eq!(s.dismiss(DismissVia::Backdrop), Step::Ignored(IgnoreReason::ConfirmRequired));
        assert_eq!(s.dismiss(DismissVia::Escape), Step::Ignored(IgnoreReason::ConfirmRequired));
        assert_eq!(s.key("Escape", true), Step::Ignored(IgnoreReason::ConfirmRequired));
        assert_eq!(s.key("Enter", false), Step::Ignored(IgnoreReason::KeyNotAccepted));
        assert_eq!(s.key("a", true), Step::Ignored(IgnoreReason::KeyNotAccepted));
        assert!(s.is_locked());
        assert_eq!(s.index(), 0);

        assert_eq!(s.key(" ", true), Step::Applied);
        assert!(!s.is_locked());
        assert_eq!(s.index(), 1);

        s.pick(Side::Right);
        assert_eq!(s.key("Enter", true), Step::Applied);
        assert_eq!(s.index(), 2);
    }

    #[test]
    fn confirm_without_verdict_is_ignored() {
        let mut s = ready(2, 5);
        assert_eq!(s.confirm(), Step::Ignored(IgnoreReason::NothingToConfirm));
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn verdict_carries_both_explanations_and_highlight() {
        let mut s = ready(1, 6);
        let side = phish_side(&s);
        s.pick(side.other());
        let Phase::Locked(v) = s.phase().clone() else { panic!("not locked") };
        assert!(!v.correct);
        assert_eq!(v.title(), "Incorrect");
        assert_eq!(v.chosen_explain, "s0 explanation");
        assert_eq!(v.other_explain, "p0 explanation");
        assert_eq!(v.highlight, Highlight { side: side.other(), tone: Tone::Negative, duration_ms: 2_000 });
    }

    #[test]
    fn single_pair_correct_pick_scores_full_marks() {
        let mut s = ready(1, 7);
        s.pick(phish_side(&s));
        s.confirm();
        assert_eq!(s.phase(), &Phase::Finished);
        let sum = s.summary();
        assert_eq!((sum.score, sum.total, sum.percent), (1, 1, 100));
        assert_eq!(sum.tier, FeedbackTier::Sharp);
    }

    #[test]
    fn single_pair_wrong_pick_scores_zero() {
        let mut s = ready(1, 8);
        let wrong = phish_side(&s).other();
        s.pick(wrong);
        s.confirm();
        let sum = s.summary();
        assert_eq!((sum.score, sum.total, sum.percent), (0, 1, 0));
        assert_eq!(sum.tier, FeedbackTier::NeedsPractice);
        assert_eq!(s.pick(Side::Left), Step::Ignored(IgnoreReason::RoundOver));
    }

    #[test]
    fn restart_resets_round_state() {
        let mut s = ready(12, 9);
        assert_eq!(s.round_len(), 10);
        for _ in 0..10 {
            let side = phish_side(&s);
            s.pick(side);
            s.confirm();
        }
        assert_eq!(s.phase(), &Phase::Finished);
        assert_eq!(s.score(), 10);
        assert_eq!(s.restart(), Step::Applied);
        assert_eq!(s.phase(), &Phase::Presenting);
        assert_eq!((s.score(), s.index()), (0, 0));
        assert_eq!(s.round_len(), 2);
    }

    #[test]
    fn restart_mid_round_abandons_it_and_keeps_pool_consumption() {
        let mut s = ready(25, 11);
        let first_round: Vec<Dealt> = s.order.clone();
        for _ in 0..3 {
            let side = phish_side(&s);
            s.pick(side);
            s.confirm();
        }
        assert_eq!((s.score(), s.index()), (3, 3));
        assert_eq!(s.phase(), &Phase::Presenting);

        assert_eq!(s.restart(), Step::Applied);
        assert_eq!(s.phase(), &Phase::Presenting);
        assert_eq!((s.score(), s.index()), (0, 0));
        assert_eq!(s.round_len(), 10);
        // The abandoned round's pairs stay consumed: 25 - 10 - 10 left.
        assert_eq!(s.deck.as_ref().map(Deck::remaining), Some(5));
        assert!(s.order.iter().all(|d| first_round.iter().all(|f| f.pair != d.pair)));
    }

    #[test]
    fn restart_is_refused_while_locked() {
        let mut s = ready(2, 10);
        s.pick(Side::Left);
        assert_eq!(s.restart(), Step::Ignored(IgnoreReason::Locked));
        assert!(s.is_locked());
    }

    #[test]
    fn settings_are_clamped() {
        let s: QuizSession<StdRng> = QuizSession::new(
            StdRng::seed_from_u64(0),
            SessionSettings { round_size: 0, highlight_ms: 60_000 },
        );
        assert_eq!(s.settings.round_size, 1);
        assert_eq!(s.settings.highlight_ms, MAX_HIGHLIGHT_MS);
    }
}
