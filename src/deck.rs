//! Round dealing: a shuffled pool of pairs served without replacement,
//! refilled from a fresh shuffle of the full set once exhausted.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::domain::{Email, Pair, Side};

pub const DEFAULT_ROUND_SIZE: usize = 10;

/// Fisher–Yates into a fresh vector; the input is left untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
  let mut out = items.to_vec();
  for i in (1..out.len()).rev() {
    let j = rng.gen_range(0..=i);
    out.swap(i, j);
  }
  out
}

/// Take up to `round_size` items from the front of `remaining`, refilling it
/// with a reshuffle of `all` first when it is empty.
/// Returns `(round, remaining_after)`.
pub fn deal_round<T: Clone, R: Rng + ?Sized>(
  all: &[T],
  mut remaining: Vec<T>,
  round_size: usize,
  rng: &mut R,
) -> (Vec<T>, Vec<T>) {
  if remaining.is_empty() {
    remaining = shuffle(all, rng);
  }
  let take = round_size.min(remaining.len());
  let round: Vec<T> = remaining.drain(..take).collect();
  (round, remaining)
}

/// A pair as it will be shown: which stored email goes on the left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dealt {
  pub pair: usize,
  pub flipped: bool,
}

/// Pool of pairs for one session. Holds indices into the shared pair set.
#[derive(Clone, Debug)]
pub struct Deck {
  pairs: Arc<[Pair]>,
  remaining: Vec<usize>,
}

impl Deck {
  pub fn new<R: Rng + ?Sized>(pairs: Arc<[Pair]>, rng: &mut R) -> Self {
    let all: Vec<usize> = (0..pairs.len()).collect();
    let remaining = shuffle(&all, rng);
    Self { pairs, remaining }
  }

  pub fn len(&self) -> usize {
    self.pairs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  /// Pairs not yet dealt in the current shuffle cycle.
  pub fn remaining(&self) -> usize {
    self.remaining.len()
  }

  /// Deal the next round and give every pair an independent 50/50 placement.
  pub fn deal<R: Rng + ?Sized>(&mut self, round_size: usize, rng: &mut R) -> Vec<Dealt> {
    let all: Vec<usize> = (0..self.pairs.len()).collect();
    let refill = self.remaining.is_empty();
    let (round, rest) = deal_round(&all, std::mem::take(&mut self.remaining), round_size, rng);
    self.remaining = rest;
    debug!(target: "quiz", round_len = round.len(), remaining = self.remaining.len(), refill, "Dealt round");
    round
      .into_iter()
      .map(|pair| Dealt { pair, flipped: rng.gen_bool(0.5) })
      .collect()
  }

  /// The email shown on `side` for a dealt pair.
  pub fn email_at(&self, dealt: Dealt, side: Side) -> &Email {
    let [first, second] = self.pairs[dealt.pair].emails();
    match (side, dealt.flipped) {
      (Side::Left, false) | (Side::Right, true) => first,
      (Side::Right, false) | (Side::Left, true) => second,
    }
  }
}
