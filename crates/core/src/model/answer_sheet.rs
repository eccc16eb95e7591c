use thiserror::Error;

use crate::model::ids::LessonId;
use crate::model::lesson::LessonDefinition;
use crate::model::task::{PracticeItem, Response};
use crate::scoring;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question {index} is out of range ({len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("option {option} is out of range for question {question} ({len} options)")]
    OptionOutOfRange {
        question: usize,
        option: usize,
        len: usize,
    },

    #[error("question {question} takes a numbered choice")]
    ChoiceExpected { question: usize },

    #[error("question {question} takes a written answer")]
    TextExpected { question: usize },

    #[error("answers have already been checked")]
    AlreadyChecked,

    #[error("{unanswered} question(s) are still unanswered")]
    Incomplete { unanswered: usize },
}

/// What triggered the scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishMode {
    /// The learner pressed "check"; every question must be answered.
    Manual,
    /// The challenge countdown expired; unanswered questions score as incorrect.
    Timer,
}

/// Result of a single scoring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    correct: u32,
    total: u32,
    score_percent: u32,
    passed: bool,
    reward: u32,
    next_lesson: Option<LessonId>,
    mode: FinishMode,
}

impl CheckOutcome {
    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn score_percent(&self) -> u32 {
        self.score_percent
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// XP earned by this attempt.
    #[must_use]
    pub fn reward(&self) -> u32 {
        self.reward
    }

    #[must_use]
    pub fn mode(&self) -> FinishMode {
        self.mode
    }

    /// Successor the learner may navigate to; only set on a pass.
    #[must_use]
    pub fn next_lesson(&self) -> Option<&LessonId> {
        if self.passed {
            self.next_lesson.as_ref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetPhase {
    Answering,
    Checked(CheckOutcome),
}

//
// ─── ANSWER SHEET ──────────────────────────────────────────────────────────────
//

/// Working answers for one lesson view.
///
/// Holds one slot per practice item. Responses may change freely while
/// `Answering`; once checked the sheet is frozen until `reset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    responses: Vec<Option<Response>>,
    phase: SheetPhase,
}

impl AnswerSheet {
    #[must_use]
    pub fn for_lesson(lesson: &LessonDefinition) -> Self {
        Self {
            responses: vec![None; lesson.item_count()],
            phase: SheetPhase::Answering,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &SheetPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        matches!(self.phase, SheetPhase::Checked(_))
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&CheckOutcome> {
        match &self.phase {
            SheetPhase::Checked(outcome) => Some(outcome),
            SheetPhase::Answering => None,
        }
    }

    #[must_use]
    pub fn responses(&self) -> &[Option<Response>] {
        &self.responses
    }

    #[must_use]
    pub fn response(&self, question: usize) -> Option<&Response> {
        self.responses.get(question).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_some()).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.responses.iter().all(Option::is_some)
    }

    /// Share of answered questions, for progress bars.
    #[must_use]
    pub fn answered_percent(&self) -> u32 {
        let answered = u32::try_from(self.answered_count()).unwrap_or(u32::MAX);
        let total = u32::try_from(self.responses.len()).unwrap_or(u32::MAX);
        scoring::percent(answered, total)
    }

    /// Record `option` as the answer to `question`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::AlreadyChecked` once the sheet is checked, an
    /// out-of-range error for indices the lesson does not have, and
    /// `AnswerError::TextExpected` for a written item. The sheet is unchanged
    /// on error.
    pub fn select(
        &mut self,
        lesson: &LessonDefinition,
        question: usize,
        option: usize,
    ) -> Result<(), AnswerError> {
        match self.item(lesson, question)? {
            PracticeItem::Choice { choices, .. } if option >= choices.len() => {
                Err(AnswerError::OptionOutOfRange {
                    question,
                    option,
                    len: choices.len(),
                })
            }
            PracticeItem::Choice { .. } => {
                self.responses[question] = Some(Response::Choice(option));
                Ok(())
            }
            PracticeItem::Text { .. } => Err(AnswerError::TextExpected { question }),
        }
    }

    /// Record a written answer for a sentence-correction item.
    ///
    /// # Errors
    ///
    /// Same as `select`, with `AnswerError::ChoiceExpected` for items that
    /// take a numbered choice.
    pub fn write(
        &mut self,
        lesson: &LessonDefinition,
        question: usize,
        text: impl Into<String>,
    ) -> Result<(), AnswerError> {
        match self.item(lesson, question)? {
            PracticeItem::Text { .. } => {
                self.responses[question] = Some(Response::Text(text.into()));
                Ok(())
            }
            PracticeItem::Choice { .. } => Err(AnswerError::ChoiceExpected { question }),
        }
    }

    fn item<'a>(
        &self,
        lesson: &'a LessonDefinition,
        question: usize,
    ) -> Result<PracticeItem<'a>, AnswerError> {
        if self.is_checked() {
            return Err(AnswerError::AlreadyChecked);
        }
        let len = self.responses.len();
        lesson
            .items()
            .into_iter()
            .nth(question)
            .filter(|_| question < len)
            .ok_or(AnswerError::QuestionOutOfRange {
                index: question,
                len,
            })
    }

    /// Score the sheet and freeze it.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::AlreadyChecked` if already scored, and
    /// `AnswerError::Incomplete` for a manual check with unanswered questions.
    pub fn check(
        &mut self,
        lesson: &LessonDefinition,
        mode: FinishMode,
    ) -> Result<CheckOutcome, AnswerError> {
        if self.is_checked() {
            return Err(AnswerError::AlreadyChecked);
        }
        if mode == FinishMode::Manual && !self.is_complete() {
            return Err(AnswerError::Incomplete {
                unanswered: self.responses.len() - self.answered_count(),
            });
        }

        let correct = self
            .responses
            .iter()
            .enumerate()
            .filter(|(item, response)| {
                response
                    .as_ref()
                    .is_some_and(|r| lesson.is_correct_response(*item, r))
            })
            .count();
        let correct = u32::try_from(correct).unwrap_or(u32::MAX);
        let total = u32::try_from(self.responses.len()).unwrap_or(u32::MAX);
        let score_percent = scoring::percent(correct, total);
        let passed = scoring::is_passing(score_percent);

        let outcome = CheckOutcome {
            correct,
            total,
            score_percent,
            passed,
            reward: scoring::reward(passed, correct),
            next_lesson: lesson.next_lesson().cloned(),
            mode,
        };
        self.phase = SheetPhase::Checked(outcome.clone());
        Ok(outcome)
    }

    /// Clear every answer and return to `Answering`.
    pub fn reset(&mut self) {
        self.responses.fill(None);
        self.phase = SheetPhase::Answering;
    }
}
