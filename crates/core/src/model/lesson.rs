use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::borrow::Cow;

use crate::error::LessonError;
use crate::model::ids::{LessonId, TopicKey};
use crate::model::task::{PracticeItem, Response, Task};

/// Challenge length used when a lesson does not declare one.
pub const DEFAULT_CHALLENGE_SECONDS: u32 = 60;

//
// ─── AUTHORING ISSUES ──────────────────────────────────────────────────────────
//

/// Content problems reported by the lint; none of them stop a lesson from running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthoringIssue {
    #[error("lesson has no questions")]
    NoQuestions,

    #[error("question {question} has no options")]
    NoOptions { question: usize },

    #[error("question {question} has no correct option")]
    NoCorrectOption { question: usize },

    #[error("question {question} marks {count} options as correct")]
    MultipleCorrectOptions { question: usize, count: usize },

    #[error("{count} multiple-choice question(s) are ignored because the lesson has a task")]
    QuestionsIgnored { count: usize },

    #[error("lesson id is declared more than once")]
    DuplicateLesson,

    #[error("next lesson `{0}` does not exist")]
    UnknownNextLesson(LessonId),
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    #[serde(rename = "correct", default)]
    pub is_correct: bool,
}

impl AnswerOption {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// A multiple-choice question with its options in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

impl Question {
    #[must_use]
    pub fn new(prompt: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        Self {
            prompt: prompt.into(),
            options,
        }
    }

    /// Whether choosing `option` answers this question correctly.
    ///
    /// Any option flagged correct counts; out-of-range options never do.
    #[must_use]
    pub fn is_correct_choice(&self, option: usize) -> bool {
        self.options.get(option).is_some_and(|opt| opt.is_correct)
    }

    #[must_use]
    pub fn correct_option_count(&self) -> usize {
        self.options.iter().filter(|opt| opt.is_correct).count()
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Immutable lesson payload supplied by the hosting page.
///
/// The serialized shape uses the camelCase field names of the published
/// lesson JSON (`slug`, `topicKey`, `ruleHTML`, `nextSlug`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDefinition {
    #[serde(rename = "slug")]
    id: LessonId,
    #[serde(default)]
    topic: String,
    topic_key: TopicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    badge: Option<String>,
    title: String,
    #[serde(default)]
    can_do: String,
    #[serde(rename = "ruleHTML", default)]
    rule_html: String,
    #[serde(rename = "examplesHTML", default)]
    examples_html: String,
    #[serde(default)]
    challenge_seconds: u32,
    #[serde(rename = "nextSlug", default)]
    next_lesson: Option<LessonId>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task: Option<Task>,
}

impl LessonDefinition {
    #[must_use]
    pub fn new(
        id: LessonId,
        topic_key: TopicKey,
        title: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id,
            topic: String::new(),
            topic_key,
            badge: None,
            title: title.into(),
            can_do: String::new(),
            rule_html: String::new(),
            examples_html: String::new(),
            challenge_seconds: 0,
            next_lesson: None,
            locked: false,
            questions,
            task: None,
        }
    }

    /// Parse a single lesson payload.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Payload` for malformed JSON and
    /// `LessonError::EmptyId` when the slug is blank.
    pub fn from_json(raw: &str) -> Result<Self, LessonError> {
        let lesson: Self = serde_json::from_str(raw)?;
        lesson.ensure_id()?;
        Ok(lesson)
    }

    pub(crate) fn ensure_id(&self) -> Result<(), LessonError> {
        if self.id.as_str().trim().is_empty() {
            return Err(LessonError::EmptyId);
        }
        Ok(())
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    #[must_use]
    pub fn with_can_do(mut self, can_do: impl Into<String>) -> Self {
        self.can_do = can_do.into();
        self
    }

    #[must_use]
    pub fn with_content(
        mut self,
        rule_html: impl Into<String>,
        examples_html: impl Into<String>,
    ) -> Self {
        self.rule_html = rule_html.into();
        self.examples_html = examples_html.into();
        self
    }

    #[must_use]
    pub fn with_challenge_seconds(mut self, seconds: u32) -> Self {
        self.challenge_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_next_lesson(mut self, next: LessonId) -> Self {
        self.next_lesson = Some(next);
        self
    }

    /// Replace the multiple-choice questions with another practice format.
    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }

    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn topic_key(&self) -> &TopicKey {
        &self.topic_key
    }

    #[must_use]
    pub fn badge(&self) -> Option<&str> {
        self.badge.as_deref()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn can_do(&self) -> &str {
        &self.can_do
    }

    #[must_use]
    pub fn rule_html(&self) -> &str {
        &self.rule_html
    }

    #[must_use]
    pub fn examples_html(&self) -> &str {
        &self.examples_html
    }

    /// Declared challenge length; may be 0.
    #[must_use]
    pub fn challenge_seconds(&self) -> u32 {
        self.challenge_seconds
    }

    /// Challenge length to run when the host does not pick one.
    #[must_use]
    pub fn effective_challenge_seconds(&self) -> u32 {
        if self.challenge_seconds == 0 {
            DEFAULT_CHALLENGE_SECONDS
        } else {
            self.challenge_seconds
        }
    }

    #[must_use]
    pub fn next_lesson(&self) -> Option<&LessonId> {
        self.next_lesson.as_ref()
    }

    /// Whether the lesson stays hidden until a predecessor unlocks it.
    #[must_use]
    pub fn is_access_restricted(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The task block as authored, including unrecognised types.
    #[must_use]
    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// The task that drives practice, if the lesson has a recognised one.
    /// Otherwise the multiple-choice questions do.
    #[must_use]
    pub fn active_task(&self) -> Option<&Task> {
        self.task.as_ref().filter(|task| task.is_known())
    }

    /// Number of scorable items: task items, or questions without a task.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.active_task()
            .map_or(self.questions.len(), Task::item_count)
    }

    #[must_use]
    pub fn items(&self) -> Vec<PracticeItem<'_>> {
        if let Some(task) = self.active_task() {
            return task.items();
        }
        self.questions
            .iter()
            .map(|q| PracticeItem::Choice {
                prompt: Cow::Borrowed(q.prompt.as_str()),
                choices: q.options.iter().map(|opt| opt.text.as_str()).collect(),
            })
            .collect()
    }

    #[must_use]
    pub fn is_correct_response(&self, item: usize, response: &Response) -> bool {
        if let Some(task) = self.active_task() {
            return task.is_correct(item, response);
        }
        match response {
            Response::Choice(option) => self
                .questions
                .get(item)
                .is_some_and(|q| q.is_correct_choice(*option)),
            Response::Text(_) => false,
        }
    }

    /// Countdown the practice format runs with on its own, if any.
    #[must_use]
    pub fn built_in_countdown(&self) -> Option<u32> {
        self.active_task().and_then(Task::built_in_countdown)
    }

    /// Report content-authoring problems without rejecting the lesson.
    #[must_use]
    pub fn lint(&self) -> Vec<AuthoringIssue> {
        if let Some(task) = self.active_task() {
            return Self::lint_task(task, self.questions.len());
        }
        if self.questions.is_empty() {
            return vec![AuthoringIssue::NoQuestions];
        }

        let mut issues = Vec::new();
        for (question, q) in self.questions.iter().enumerate() {
            if q.options.is_empty() {
                issues.push(AuthoringIssue::NoOptions { question });
                continue;
            }
            match q.correct_option_count() {
                0 => issues.push(AuthoringIssue::NoCorrectOption { question }),
                1 => {}
                count => issues.push(AuthoringIssue::MultipleCorrectOptions { question, count }),
            }
        }
        issues
    }

    fn lint_task(task: &Task, question_count: usize) -> Vec<AuthoringIssue> {
        let mut issues = Vec::new();
        if task.item_count() == 0 {
            issues.push(AuthoringIssue::NoQuestions);
        }
        if question_count > 0 {
            issues.push(AuthoringIssue::QuestionsIgnored {
                count: question_count,
            });
        }
        if let Task::Interview { items } = task {
            for (question, item) in items.iter().enumerate() {
                if item.choices.is_empty() {
                    issues.push(AuthoringIssue::NoOptions { question });
                    continue;
                }
                match item.matching_choice_count() {
                    0 => issues.push(AuthoringIssue::NoCorrectOption { question }),
                    1 => {}
                    count => {
                        issues.push(AuthoringIssue::MultipleCorrectOptions { question, count });
                    }
                }
            }
        }
        issues
    }
}
