//! Scoring and reward formulas shared by every lesson.

/// Minimum score (in percent) that counts as a pass.
pub const PASS_THRESHOLD_PERCENT: u32 = 70;

/// XP granted for any passing attempt before per-answer bonuses.
pub const PASS_REWARD_BASE: u32 = 10;

/// XP granted per correct answer on a passing attempt.
pub const PASS_REWARD_PER_CORRECT: u32 = 2;

/// Floor for the XP granted on a failing attempt.
pub const MIN_REWARD: u32 = 2;

/// Rounded percentage of `part` over `total` (half rounds up).
///
/// Returns 0 when `total` is 0.
#[must_use]
pub fn percent(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let part = u64::from(part.min(total));
    let total = u64::from(total);
    let rounded = (200 * part + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(100)
}

#[must_use]
pub fn is_passing(score_percent: u32) -> bool {
    score_percent >= PASS_THRESHOLD_PERCENT
}

/// XP reward for an attempt with `correct` answers.
#[must_use]
pub fn reward(passed: bool, correct: u32) -> u32 {
    if passed {
        PASS_REWARD_BASE.saturating_add(PASS_REWARD_PER_CORRECT.saturating_mul(correct))
    } else {
        correct.max(MIN_REWARD)
    }
}
