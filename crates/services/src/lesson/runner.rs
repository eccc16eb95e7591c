use std::sync::Arc;

use log::debug;

use lesson_core::Clock;
use lesson_core::model::{
    AnswerSheet, CheckOutcome, FinishMode, LessonDefinition, LessonResult, ProgressRecord,
};

use super::challenge::ChallengeState;
use crate::error::RunnerError;
use crate::progress_service::ProgressService;

/// Working state of one open lesson: the answer sheet, the learner's stored
/// progress and the challenge countdown state.
///
/// Only reachable through an unlocked `LessonSession`.
pub struct LessonRunner {
    lesson: Arc<LessonDefinition>,
    sheet: AnswerSheet,
    record: ProgressRecord,
    challenge: ChallengeState,
    progress: Arc<ProgressService>,
    clock: Clock,
}

impl LessonRunner {
    pub(crate) fn new(
        lesson: Arc<LessonDefinition>,
        record: ProgressRecord,
        progress: Arc<ProgressService>,
        clock: Clock,
    ) -> Self {
        let sheet = AnswerSheet::for_lesson(&lesson);
        Self {
            lesson,
            sheet,
            record,
            challenge: ChallengeState::Idle,
            progress,
            clock,
        }
    }

    #[must_use]
    pub fn lesson(&self) -> &LessonDefinition {
        &self.lesson
    }

    #[must_use]
    pub fn sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    /// Progress as read when the lesson opened, updated after every check.
    #[must_use]
    pub fn progress_record(&self) -> ProgressRecord {
        self.record
    }

    #[must_use]
    pub fn challenge_state(&self) -> ChallengeState {
        self.challenge
    }

    /// # Errors
    ///
    /// Returns `RunnerError::Answer` if the sheet is checked or an index is out of range.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), RunnerError> {
        self.sheet.select(&self.lesson, question, option)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RunnerError::Answer` if the sheet is checked, the index is out
    /// of range or the item takes a numbered choice.
    pub fn write_answer(&mut self, question: usize, text: &str) -> Result<(), RunnerError> {
        self.sheet.write(&self.lesson, question, text)?;
        Ok(())
    }

    /// Score a fully answered sheet and apply its side effects.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Answer` if already checked or any question is unanswered.
    pub async fn check_answers(&mut self) -> Result<CheckOutcome, RunnerError> {
        self.finish(FinishMode::Manual).await
    }

    /// Clear the working answers. Persisted history is untouched.
    pub fn reset(&mut self) {
        self.sheet.reset();
    }

    async fn finish(&mut self, mode: FinishMode) -> Result<CheckOutcome, RunnerError> {
        let outcome = self.sheet.check(&self.lesson, mode)?;
        let lesson_id = self.lesson.id();

        self.record = self
            .progress
            .record_attempt(lesson_id, outcome.score_percent())
            .await;
        self.progress
            .save_result(lesson_id, &LessonResult::from_outcome(&outcome, self.clock.now()))
            .await;
        let xp_total = self.progress.award_xp(outcome.reward()).await;

        if outcome.passed() {
            self.progress.earn_badge(self.lesson.topic_key()).await;
            if let Some(next) = self.lesson.next_lesson() {
                self.progress.unlock(next).await;
            }
        }

        debug!(
            "lesson {lesson_id} checked ({mode:?}): {}/{} = {}%, passed={}, +{} xp (total {})",
            outcome.correct(),
            outcome.total(),
            outcome.score_percent(),
            outcome.passed(),
            outcome.reward(),
            xp_total,
        );
        Ok(outcome)
    }

    pub(crate) fn begin_challenge(&mut self, duration_secs: u32) -> Result<(), RunnerError> {
        match self.challenge {
            ChallengeState::Idle => {
                self.challenge = ChallengeState::Running {
                    remaining_secs: duration_secs,
                };
                Ok(())
            }
            ChallengeState::Running { .. } => Err(RunnerError::ChallengeRunning),
            ChallengeState::Expired => Err(RunnerError::ChallengeExpired),
        }
    }

    pub(crate) fn set_challenge_remaining(&mut self, remaining_secs: u32) {
        if let ChallengeState::Running { .. } = self.challenge {
            self.challenge = ChallengeState::Running { remaining_secs };
        }
    }

    /// Stop the challenge for good and score whatever has been answered.
    ///
    /// Returns `None` when the sheet was already checked.
    pub(crate) async fn expire_challenge(&mut self) -> Option<CheckOutcome> {
        self.challenge = ChallengeState::Expired;
        if self.sheet.is_checked() {
            return None;
        }
        self.finish(FinishMode::Timer).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{
        AnswerError, AnswerOption, CorrectionItem, LessonId, Question, Task, TopicKey,
    };
    use lesson_core::time::fixed_clock;
    use storage::{InMemoryStore, KeySpace};

    fn lesson() -> Arc<LessonDefinition> {
        let questions = (0..5)
            .map(|i| {
                Question::new(
                    format!("Q{i}"),
                    vec![AnswerOption::new("yes", true), AnswerOption::new("no", false)],
                )
            })
            .collect();
        Arc::new(
            LessonDefinition::new(LessonId::new("L1"), TopicKey::new("past"), "Past", questions)
                .with_next_lesson(LessonId::new("L2")),
        )
    }

    fn runner() -> (LessonRunner, Arc<ProgressService>) {
        let progress = Arc::new(ProgressService::new(
            Arc::new(InMemoryStore::new()),
            KeySpace::default(),
        ));
        let runner = LessonRunner::new(
            lesson(),
            ProgressRecord::default(),
            Arc::clone(&progress),
            fixed_clock(),
        );
        (runner, progress)
    }

    fn answer(runner: &mut LessonRunner, choices: [usize; 5]) {
        for (q, option) in choices.into_iter().enumerate() {
            runner.select_answer(q, option).unwrap();
        }
    }

    #[tokio::test]
    async fn passing_check_unlocks_successor_and_pays_bonus() {
        let (mut runner, progress) = runner();
        answer(&mut runner, [0, 0, 0, 0, 1]);

        let outcome = runner.check_answers().await.unwrap();
        assert_eq!(outcome.score_percent(), 80);
        assert_eq!(outcome.reward(), 18);

        assert!(progress.is_unlocked(&LessonId::new("L2")).await);
        assert!(progress.has_badge(&TopicKey::new("past")).await);
        assert_eq!(progress.total_xp().await, 18);
        assert_eq!(runner.progress_record().attempt_count(), 1);
        assert_eq!(runner.progress_record().best_score_percent(), 80);

        let result = progress.last_result(&LessonId::new("L1")).await.unwrap();
        assert_eq!((result.score, result.total, result.passed), (4, 5, true));
    }

    #[tokio::test]
    async fn failing_check_does_not_unlock() {
        let (mut runner, progress) = runner();
        answer(&mut runner, [0, 1, 1, 1, 1]);

        let outcome = runner.check_answers().await.unwrap();
        assert_eq!(outcome.score_percent(), 20);
        assert!(!outcome.passed());
        assert_eq!(outcome.reward(), 2);

        assert!(!progress.is_unlocked(&LessonId::new("L2")).await);
        assert!(!progress.has_badge(&TopicKey::new("past")).await);
        assert_eq!(progress.total_xp().await, 2);
    }

    #[tokio::test]
    async fn check_happens_once_per_attempt() {
        let (mut runner, progress) = runner();
        answer(&mut runner, [0, 0, 0, 0, 0]);
        runner.check_answers().await.unwrap();

        assert_eq!(
            runner.check_answers().await,
            Err(RunnerError::Answer(AnswerError::AlreadyChecked))
        );
        assert_eq!(
            runner.select_answer(0, 1),
            Err(RunnerError::Answer(AnswerError::AlreadyChecked))
        );
        assert_eq!(progress.progress_record(&LessonId::new("L1")).await.attempt_count(), 1);
        assert_eq!(progress.total_xp().await, 20);
    }

    #[tokio::test]
    async fn reset_keeps_history_and_best_score() {
        let (mut runner, progress) = runner();
        answer(&mut runner, [0, 0, 0, 0, 0]);
        runner.check_answers().await.unwrap();
        runner.reset();
        assert!(!runner.sheet().is_checked());

        answer(&mut runner, [1, 1, 1, 1, 1]);
        runner.check_answers().await.unwrap();

        let record = progress.progress_record(&LessonId::new("L1")).await;
        assert_eq!(record.attempt_count(), 2);
        assert_eq!(record.best_score_percent(), 100);
        assert!(record.completed());
        assert_eq!(progress.total_xp().await, 20 + 2);
    }

    #[tokio::test]
    async fn incomplete_manual_check_records_nothing() {
        let (mut runner, progress) = runner();
        runner.select_answer(0, 0).unwrap();

        assert_eq!(
            runner.check_answers().await,
            Err(RunnerError::Answer(AnswerError::Incomplete { unanswered: 4 }))
        );
        assert_eq!(progress.progress_record(&LessonId::new("L1")).await.attempt_count(), 0);
        assert_eq!(progress.total_xp().await, 0);
    }

    #[tokio::test]
    async fn challenge_state_transitions() {
        let (mut runner, _progress) = runner();
        runner.begin_challenge(5).unwrap();
        assert_eq!(runner.begin_challenge(5), Err(RunnerError::ChallengeRunning));

        runner.set_challenge_remaining(3);
        assert_eq!(
            runner.challenge_state(),
            ChallengeState::Running { remaining_secs: 3 }
        );

        let outcome = runner.expire_challenge().await.expect("auto-finished");
        assert_eq!(outcome.mode(), FinishMode::Timer);
        assert_eq!(outcome.correct(), 0);
        assert_eq!(runner.begin_challenge(5), Err(RunnerError::ChallengeExpired));
    }

    #[tokio::test]
    async fn expiry_after_manual_check_scores_nothing_more() {
        let (mut runner, progress) = runner();
        answer(&mut runner, [0, 0, 0, 0, 0]);
        runner.begin_challenge(10).unwrap();
        runner.check_answers().await.unwrap();

        assert!(runner.expire_challenge().await.is_none());
        assert_eq!(progress.progress_record(&LessonId::new("L1")).await.attempt_count(), 1);
    }

    #[tokio::test]
    async fn written_answers_flow_through_finish() {
        let lesson = Arc::new(
            LessonDefinition::new(LessonId::new("fix"), TopicKey::new("past"), "Fix", Vec::new())
                .with_task(Task::Correct {
                    items: vec![CorrectionItem {
                        bad: "He goed.".into(),
                        good: "He went.".into(),
                    }],
                }),
        );
        let progress = Arc::new(ProgressService::new(
            Arc::new(InMemoryStore::new()),
            KeySpace::default(),
        ));
        let mut runner = LessonRunner::new(
            lesson,
            ProgressRecord::default(),
            Arc::clone(&progress),
            fixed_clock(),
        );

        assert_eq!(
            runner.select_answer(0, 0),
            Err(RunnerError::Answer(AnswerError::TextExpected { question: 0 }))
        );
        runner.write_answer(0, "he went.").unwrap();
        let outcome = runner.check_answers().await.unwrap();

        assert_eq!(outcome.score_percent(), 100);
        assert!(runner.progress_record().completed());
        assert!(progress.has_badge(&TopicKey::new("past")).await);
    }
}
