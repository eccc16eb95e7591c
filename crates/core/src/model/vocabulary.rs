use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::scoring;

/// A vocabulary list is identified by its CEFR level and category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VocabularyScope {
    level: String,
    category: String,
}

impl VocabularyScope {
    #[must_use]
    pub fn new(level: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            category: category.into(),
        }
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }
}

/// Terms the learner has ticked off in one vocabulary list.
///
/// Persisted as a JSON array of terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyProgress {
    completed: BTreeSet<String>,
}

impl VocabularyProgress {
    /// Flip a term between done and not done. Returns the new state.
    pub fn toggle(&mut self, term: &str) -> bool {
        if self.completed.remove(term) {
            false
        } else {
            self.completed.insert(term.to_owned());
            true
        }
    }

    #[must_use]
    pub fn is_completed(&self, term: &str) -> bool {
        self.completed.contains(term)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.completed.iter().map(String::as_str)
    }

    /// Rounded share of `total_words` completed; 0 for an empty list.
    #[must_use]
    pub fn percent(&self, total_words: usize) -> u32 {
        let done = u32::try_from(self.completed.len()).unwrap_or(u32::MAX);
        let total = u32::try_from(total_words).unwrap_or(u32::MAX);
        scoring::percent(done, total)
    }
}
