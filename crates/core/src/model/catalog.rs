use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::LessonError;
use crate::model::ids::LessonId;
use crate::model::lesson::{AuthoringIssue, LessonDefinition};

/// Index entry shown on the lesson grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub title: String,
    pub slug: LessonId,
    pub topic: String,
    pub can_do: String,
    pub count: usize,
}

/// A lint finding tied to the lesson it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogIssue {
    pub lesson: LessonId,
    pub issue: AuthoringIssue,
}

/// The `{ "lessons": [...] }` document lessons are authored in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonCatalog {
    lessons: Vec<LessonDefinition>,
}

impl LessonCatalog {
    #[must_use]
    pub fn new(lessons: Vec<LessonDefinition>) -> Self {
        Self { lessons }
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` for malformed JSON or a lesson with a blank slug.
    pub fn from_json(raw: &str) -> Result<Self, LessonError> {
        let catalog: Self = serde_json::from_str(raw)?;
        for lesson in &catalog.lessons {
            lesson.ensure_id()?;
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn lessons(&self) -> &[LessonDefinition] {
        &self.lessons
    }

    /// First lesson declared with `id`.
    #[must_use]
    pub fn get(&self, id: &LessonId) -> Option<&LessonDefinition> {
        self.lessons.iter().find(|lesson| lesson.id() == id)
    }

    #[must_use]
    pub fn index(&self) -> Vec<LessonSummary> {
        self.lessons
            .iter()
            .map(|lesson| LessonSummary {
                title: lesson.title().to_owned(),
                slug: lesson.id().clone(),
                topic: lesson.topic().to_owned(),
                can_do: lesson.can_do().to_owned(),
                count: lesson.item_count(),
            })
            .collect()
    }

    /// Lint every lesson, plus cross-lesson checks (duplicate ids, dangling successors).
    #[must_use]
    pub fn lint(&self) -> Vec<CatalogIssue> {
        let known: HashSet<&LessonId> = self.lessons.iter().map(LessonDefinition::id).collect();
        let mut seen = HashSet::new();
        let mut issues = Vec::new();

        for lesson in &self.lessons {
            let id = lesson.id();
            if !seen.insert(id) {
                issues.push(CatalogIssue {
                    lesson: id.clone(),
                    issue: AuthoringIssue::DuplicateLesson,
                });
            }
            issues.extend(lesson.lint().into_iter().map(|issue| CatalogIssue {
                lesson: id.clone(),
                issue,
            }));
            if let Some(next) = lesson.next_lesson() {
                if !known.contains(next) {
                    issues.push(CatalogIssue {
                        lesson: id.clone(),
                        issue: AuthoringIssue::UnknownNextLesson(next.clone()),
                    });
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{ "lessons": [
        { "slug": "a", "topic": "Past", "topicKey": "past", "title": "A", "canDo": "I can A",
          "nextSlug": "b",
          "questions": [ { "prompt": "?", "options": [ { "text": "x", "correct": true } ] } ] },
        { "slug": "b", "topicKey": "past", "title": "B", "locked": true, "nextSlug": "zzz",
          "questions": [ { "prompt": "?", "options": [ { "text": "x" } ] } ] },
        { "slug": "a", "topicKey": "past", "title": "A again", "questions": [] }
    ] }"#;

    #[test]
    fn index_lists_every_lesson_with_item_counts() {
        let catalog = LessonCatalog::from_json(CATALOG).unwrap();
        let index = catalog.index();

        assert_eq!(index.len(), 3);
        assert_eq!(index[0].slug.as_str(), "a");
        assert_eq!(index[0].can_do, "I can A");
        assert_eq!(index[0].count, 1);
        assert_eq!(index[2].count, 0);

        let tasks = LessonCatalog::from_json(
            r#"{ "lessons": [ { "slug": "m", "topicKey": "t", "title": "M",
                "task": { "type": "dragmatch", "pairs": [
                    { "base": "go", "past": "went" }, { "base": "do", "past": "did" } ] } } ] }"#,
        )
        .unwrap();
        assert_eq!(tasks.index()[0].count, 2);

        let encoded = serde_json::to_value(&index[0]).unwrap();
        assert_eq!(encoded["canDo"], "I can A");
    }

    #[test]
    fn get_returns_first_match() {
        let catalog = LessonCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.get(&LessonId::new("a")).unwrap().title(), "A");
        assert!(catalog.get(&LessonId::new("missing")).is_none());
    }

    #[test]
    fn lint_covers_cross_lesson_problems() {
        let catalog = LessonCatalog::from_json(CATALOG).unwrap();
        let issues = catalog.lint();

        assert_eq!(
            issues,
            vec![
                CatalogIssue {
                    lesson: LessonId::new("b"),
                    issue: AuthoringIssue::NoCorrectOption { question: 0 },
                },
                CatalogIssue {
                    lesson: LessonId::new("b"),
                    issue: AuthoringIssue::UnknownNextLesson(LessonId::new("zzz")),
                },
                CatalogIssue {
                    lesson: LessonId::new("a"),
                    issue: AuthoringIssue::DuplicateLesson,
                },
                CatalogIssue {
                    lesson: LessonId::new("a"),
                    issue: AuthoringIssue::NoQuestions,
                },
            ]
        );
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(matches!(
            LessonCatalog::from_json("{ \"lessons\": 3 }"),
            Err(LessonError::Payload(_))
        ));
    }
}
