//! Score summary: percentage and the four canned feedback tiers.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
  /// 0..=30
  NeedsPractice,
  /// 31..=50
  GettingThere,
  /// 51..=80
  Solid,
  /// 81..=100
  Sharp,
}

impl FeedbackTier {
  pub fn message(self) -> &'static str {
    match self {
      FeedbackTier::NeedsPractice => "\
Phishing emails are getting past you right now.
Slow down before clicking: check the sender's domain letter by letter,
hover over links before opening them, and treat urgency as a warning sign.
Try another round and read each explanation carefully.",
      FeedbackTier::GettingThere => "\
You are catching some of the phish, but several slipped through.
Look for lookalike domains, unexpected attachments (especially .exe files)
and requests for passwords or payment details.
Another round will help these patterns stick.",
      FeedbackTier::Solid => "\
Good work. You spot most phishing attempts.
The ones you missed were subtle: compare the From address with the
company domain and question any message that pushes you to act fast.",
      FeedbackTier::Sharp => "\
Excellent. You reliably tell phishing apart from legitimate mail.
Keep the same habits in your real inbox and report anything suspicious
to the security team.",
    }
  }
}

/// Total over 0..=100 (larger inputs land in the top tier).
/// Bands are inclusive: <=30, <=50, <=80, >80.
pub fn feedback(percent: u8) -> FeedbackTier {
  match percent {
    0..=30 => FeedbackTier::NeedsPractice,
    31..=50 => FeedbackTier::GettingThere,
    51..=80 => FeedbackTier::Solid,
    _ => FeedbackTier::Sharp,
  }
}

/// Rounded percentage; 0 when nothing was answered.
pub fn percent(score: usize, total: usize) -> u8 {
  if total == 0 {
    return 0;
  }
  let score = score.min(total);
  ((score * 100 + total / 2) / total) as u8
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn band_boundaries_are_inclusive() {
    assert_eq!(feedback(0), FeedbackTier::NeedsPractice);
    assert_eq!(feedback(30), FeedbackTier::NeedsPractice);
    assert_eq!(feedback(31), FeedbackTier::GettingThere);
    assert_eq!(feedback(50), FeedbackTier::GettingThere);
    assert_eq!(feedback(51), FeedbackTier::Solid);
    assert_eq!(feedback(80), FeedbackTier::Solid);
    assert_eq!(feedback(81), FeedbackTier::Sharp);
    assert_eq!(feedback(100), FeedbackTier::Sharp);
  }

  #[test]
  fn every_tier_has_a_multiline_message() {
    for tier in [
      FeedbackTier::NeedsPractice,
      FeedbackTier::GettingThere,
      FeedbackTier::Solid,
      FeedbackTier::Sharp,
    ] {
      assert!(tier.message().lines().count() > 1);
    }
  }

  #[test]
  fn percent_rounds_half_up() {
    assert_eq!(percent(0, 0), 0);
    assert_eq!(percent(1, 1), 100);
    assert_eq!(percent(0, 1), 0);
    assert_eq!(percent(1, 3), 33);
    assert_eq!(percent(2, 3), 67);
    assert_eq!(percent(1, 8), 13);
    assert_eq!(percent(7, 10), 70);
  }
}
