use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer_sheet::CheckOutcome;

/// Persisted per-lesson history. Survives across views and is never deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(rename = "attempts", default)]
    attempt_count: u32,
    #[serde(rename = "bestScore", default)]
    best_score_percent: u32,
    #[serde(default)]
    completed: bool,
}

impl ProgressRecord {
    #[must_use]
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Best score so far, 0-100.
    #[must_use]
    pub fn best_score_percent(&self) -> u32 {
        self.best_score_percent
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Fold one checked attempt into the record.
    ///
    /// The attempt count grows by one, the best score never decreases, and a
    /// perfect attempt marks the lesson completed for good.
    #[must_use]
    pub fn with_attempt(self, score_percent: u32) -> Self {
        let score_percent = score_percent.min(100);
        Self {
            attempt_count: self.attempt_count.saturating_add(1),
            best_score_percent: self.best_score_percent.max(score_percent),
            completed: self.completed || score_percent == 100,
        }
    }
}

/// Snapshot of the most recent checked attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonResult {
    pub total: u32,
    pub score: u32,
    pub passed: bool,
    pub at: DateTime<Utc>,
}

impl LessonResult {
    #[must_use]
    pub fn from_outcome(outcome: &CheckOutcome, at: DateTime<Utc>) -> Self {
        Self {
            total: outcome.total(),
            score: outcome.correct(),
            passed: outcome.passed(),
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn best_score_is_monotonic() {
        let record = ProgressRecord::default()
            .with_attempt(60)
            .with_attempt(90)
            .with_attempt(40);

        assert_eq!(record.attempt_count(), 3);
        assert_eq!(record.best_score_percent(), 90);
        assert!(!record.completed());
    }

    #[test]
    fn perfect_attempt_completes_permanently() {
        let record = ProgressRecord::default().with_attempt(100).with_attempt(20);
        assert!(record.completed());
        assert_eq!(record.best_score_percent(), 100);
    }

    #[test]
    fn decodes_stored_shape_with_missing_fields() {
        let record: ProgressRecord =
            serde_json::from_str(r#"{"attempts":2,"bestScore":75}"#).unwrap();
        assert_eq!(record.attempt_count(), 2);
        assert_eq!(record.best_score_percent(), 75);
        assert!(!record.completed());

        let encoded = serde_json::to_string(&record.with_attempt(100)).unwrap();
        assert_eq!(encoded, r#"{"attempts":3,"bestScore":100,"completed":true}"#);
    }

    #[test]
    fn result_timestamp_round_trips() {
        let result = LessonResult {
            total: 5,
            score: 4,
            passed: true,
            at: fixed_now(),
        };
        let raw = serde_json::to_string(&result).unwrap();
        assert!(raw.contains("\"at\":\"2023-11-14T22:13:20Z\""));
        assert_eq!(serde_json::from_str::<LessonResult>(&raw).unwrap(), result);
    }
}
