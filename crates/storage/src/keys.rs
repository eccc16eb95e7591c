use lesson_core::model::{LessonId, TopicKey, VocabularyScope};

/// Version segment baked into every key; bump when a value's shape changes.
pub const SCHEMA_VERSION: &str = "v1";

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "a2";

/// Builds the versioned keys lesson state is stored under.
///
/// Every key has the form `{namespace}:{version}:{kind}:...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl KeySpace {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, rest: &str) -> String {
        format!("{}:{SCHEMA_VERSION}:{rest}", self.namespace)
    }

    #[must_use]
    pub fn progress(&self, lesson: &LessonId) -> String {
        self.key(&format!("progress:{lesson}"))
    }

    #[must_use]
    pub fn result(&self, lesson: &LessonId) -> String {
        self.key(&format!("result:{lesson}"))
    }

    #[must_use]
    pub fn unlocked(&self, lesson: &LessonId) -> String {
        self.key(&format!("unlocked:{lesson}"))
    }

    #[must_use]
    pub fn badge(&self, topic: &TopicKey) -> String {
        self.key(&format!("badge:{topic}"))
    }

    #[must_use]
    pub fn xp(&self) -> String {
        self.key("xp")
    }

    #[must_use]
    pub fn vocabulary(&self, scope: &VocabularyScope) -> String {
        self.key(&format!("vocab:{}:{}", scope.level(), scope.category()))
    }
}
