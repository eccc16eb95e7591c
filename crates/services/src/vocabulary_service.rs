use std::sync::Arc;

use lesson_core::model::{VocabularyProgress, VocabularyScope};
use storage::{KeySpace, ProgressStore};

use crate::best_effort::BestEffortStore;

/// Tracks which vocabulary terms a learner has ticked off per list.
#[derive(Clone)]
pub struct VocabularyService {
    store: BestEffortStore,
    keys: KeySpace,
}

impl VocabularyService {
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>, keys: KeySpace) -> Self {
        Self {
            store: BestEffortStore::new(store),
            keys,
        }
    }

    /// Stored progress for the list, or an empty set.
    pub async fn load(&self, scope: &VocabularyScope) -> VocabularyProgress {
        self.store
            .read_json(&self.keys.vocabulary(scope))
            .await
            .unwrap_or_default()
    }

    /// Flip `term` and persist the whole set. Returns the updated progress.
    pub async fn toggle(&self, scope: &VocabularyScope, term: &str) -> VocabularyProgress {
        let mut progress = self.load(scope).await;
        progress.toggle(term);
        self.store
            .write_json(&self.keys.vocabulary(scope), &progress)
            .await;
        progress
    }
}
