use std::sync::Arc;

use log::info;

use lesson_core::model::{LessonDefinition, LessonId, LessonResult, ProgressRecord, TopicKey};
use storage::{KeySpace, ProgressStore};

use crate::best_effort::BestEffortStore;

const UNLOCKED_FLAG: &str = "1";
const BADGE_EARNED_FLAG: &str = "earned";

/// Reads and updates persisted learner state: per-lesson progress, last
/// results, unlock flags, topic badges and the global XP total.
///
/// Every method is best-effort. Unreadable state falls back to its default
/// and failed writes are logged and dropped, so callers never see a storage
/// error. Updates are read-modify-write with no isolation; two views writing
/// the same key race and the later write wins.
#[derive(Clone)]
pub struct ProgressService {
    store: BestEffortStore,
    keys: KeySpace,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>, keys: KeySpace) -> Self {
        Self {
            store: BestEffortStore::new(store),
            keys,
        }
    }

    #[must_use]
    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Stored progress for `lesson`, or an empty record.
    pub async fn progress_record(&self, lesson: &LessonId) -> ProgressRecord {
        self.store
            .read_json(&self.keys.progress(lesson))
            .await
            .unwrap_or_default()
    }

    /// Fold a checked attempt into the lesson's record and persist it.
    ///
    /// Returns the updated record even if it could not be written.
    pub async fn record_attempt(&self, lesson: &LessonId, score_percent: u32) -> ProgressRecord {
        let updated = self
            .progress_record(lesson)
            .await
            .with_attempt(score_percent);
        self.store
            .write_json(&self.keys.progress(lesson), &updated)
            .await;
        updated
    }

    pub async fn save_result(&self, lesson: &LessonId, result: &LessonResult) {
        self.store.write_json(&self.keys.result(lesson), result).await;
    }

    pub async fn last_result(&self, lesson: &LessonId) -> Option<LessonResult> {
        self.store.read_json(&self.keys.result(lesson)).await
    }

    pub async fn total_xp(&self) -> u32 {
        self.store.read_json(&self.keys.xp()).await.unwrap_or(0)
    }

    /// Add `reward` to the XP total and return the new total.
    pub async fn award_xp(&self, reward: u32) -> u32 {
        let total = self.total_xp().await.saturating_add(reward);
        self.store.write_json(&self.keys.xp(), &total).await;
        total
    }

    /// Mark the topic badge earned. Returns `true` only the first time.
    pub async fn earn_badge(&self, topic: &TopicKey) -> bool {
        let key = self.keys.badge(topic);
        if self.store.flag(&key).await {
            return false;
        }
        self.store.write_raw(&key, BADGE_EARNED_FLAG).await;
        info!("badge earned for topic {topic}");
        true
    }

    pub async fn has_badge(&self, topic: &TopicKey) -> bool {
        self.store.flag(&self.keys.badge(topic)).await
    }

    pub async fn unlock(&self, lesson: &LessonId) {
        self.store
            .write_raw(&self.keys.unlocked(lesson), UNLOCKED_FLAG)
            .await;
        info!("lesson {lesson} unlocked");
    }

    pub async fn is_unlocked(&self, lesson: &LessonId) -> bool {
        self.store.flag(&self.keys.unlocked(lesson)).await
    }

    /// Whether the unlock gate lets `lesson` through.
    pub async fn can_open(&self, lesson: &LessonDefinition) -> bool {
        !lesson.is_access_restricted() || self.is_unlocked(lesson.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lesson_core::time::fixed_now;
    use storage::{InMemoryStore, StorageError};

    /// Fails every read and write.
    struct BrokenStore;

    #[async_trait]
    impl ProgressStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("disk unplugged".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk unplugged".into()))
        }
    }

    fn in_memory() -> (InMemoryStore, ProgressService) {
        let store = InMemoryStore::new();
        let service = ProgressService::new(Arc::new(store.clone()), KeySpace::default());
        (store, service)
    }

    #[tokio::test]
    async fn read_failure_falls_back_to_default_record() {
        let service = ProgressService::new(Arc::new(BrokenStore), KeySpace::default());
        let lesson = LessonId::new("past-simple");

        let record = service.progress_record(&lesson).await;
        assert_eq!(record, ProgressRecord::default());
        assert_eq!(record.attempt_count(), 0);
        assert_eq!(record.best_score_percent(), 0);
        assert!(!record.completed());
        assert_eq!(service.total_xp().await, 0);
        assert!(!service.is_unlocked(&lesson).await);
    }

    #[tokio::test]
    async fn write_failure_still_returns_updated_values() {
        let service = ProgressService::new(Arc::new(BrokenStore), KeySpace::default());
        let lesson = LessonId::new("past-simple");

        let record = service.record_attempt(&lesson, 80).await;
        assert_eq!(record.attempt_count(), 1);
        assert_eq!(service.award_xp(18).await, 18);
        assert!(service.earn_badge(&TopicKey::new("past")).await);
    }

    #[tokio::test]
    async fn corrupt_record_is_treated_as_absent() {
        let (store, service) = in_memory();
        let lesson = LessonId::new("l1");
        store
            .set(&service.keys().progress(&lesson), "{not json")
            .await
            .unwrap();

        assert_eq!(service.progress_record(&lesson).await, ProgressRecord::default());
        let record = service.record_attempt(&lesson, 50).await;
        assert_eq!(record.attempt_count(), 1);
    }

    #[tokio::test]
    async fn attempts_accumulate_with_monotonic_best() {
        let (_store, service) = in_memory();
        let lesson = LessonId::new("l1");

        service.record_attempt(&lesson, 90).await;
        service.record_attempt(&lesson, 30).await;
        let record = service.progress_record(&lesson).await;

        assert_eq!(record.attempt_count(), 2);
        assert_eq!(record.best_score_percent(), 90);
    }

    #[tokio::test]
    async fn xp_accumulates_across_awards() {
        let (store, service) = in_memory();
        service.award_xp(18).await;
        assert_eq!(service.award_xp(2).await, 20);
        assert_eq!(store.get("a2:v1:xp").await.unwrap().as_deref(), Some("20"));
    }

    #[tokio::test]
    async fn badge_is_written_once() {
        let (store, service) = in_memory();
        let topic = TopicKey::new("past");

        assert!(service.earn_badge(&topic).await);
        assert!(!service.earn_badge(&topic).await);
        assert!(service.has_badge(&topic).await);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn gate_respects_unlock_flag() {
        let (_store, service) = in_memory();
        let lesson = LessonDefinition::new(
            LessonId::new("l2"),
            TopicKey::new("t"),
            "Locked",
            Vec::new(),
        )
        .with_locked(true);
        let open =
            LessonDefinition::new(LessonId::new("l3"), TopicKey::new("t"), "Open", Vec::new());

        assert!(!service.can_open(&lesson).await);
        assert!(service.can_open(&open).await);
        service.unlock(lesson.id()).await;
        assert!(service.can_open(&lesson).await);
    }

    #[tokio::test]
    async fn last_result_round_trips() {
        let (_store, service) = in_memory();
        let lesson = LessonId::new("l1");
        assert!(service.last_result(&lesson).await.is_none());

        let result = LessonResult {
            total: 5,
            score: 1,
            passed: false,
            at: fixed_now(),
        };
        service.save_result(&lesson, &result).await;
        assert_eq!(service.last_result(&lesson).await, Some(result));
    }
}
