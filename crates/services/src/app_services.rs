use std::sync::Arc;

use lesson_core::model::LessonDefinition;
use storage::{KeySpace, Storage};

use crate::Clock;
use crate::error::AppServicesError;
use crate::lesson::{LessonAccess, LessonSession};
use crate::progress_service::ProgressService;
use crate::vocabulary_service::VocabularyService;

/// Assembles the app-facing services over one progress store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    progress: Arc<ProgressService>,
    vocabulary: Arc<VocabularyService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        keys: KeySpace,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, keys, clock))
    }

    #[must_use]
    pub fn in_memory(keys: KeySpace, clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), keys, clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, keys: KeySpace, clock: Clock) -> Self {
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.progress),
            keys.clone(),
        ));
        let vocabulary = Arc::new(VocabularyService::new(Arc::clone(&storage.progress), keys));
        Self {
            clock,
            progress,
            vocabulary,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn vocabulary(&self) -> Arc<VocabularyService> {
        Arc::clone(&self.vocabulary)
    }

    /// Open a lesson view, honouring the unlock gate.
    pub async fn open_lesson(&self, lesson: Arc<LessonDefinition>) -> LessonAccess {
        LessonSession::open(lesson, self.progress(), self.clock).await
    }
}
