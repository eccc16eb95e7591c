use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use lesson_core::Clock;
use lesson_core::model::{AnswerSheet, CheckOutcome, LessonDefinition, LessonId, ProgressRecord};

use super::challenge::{ChallengeState, Countdown};
use super::runner::LessonRunner;
use crate::error::RunnerError;
use crate::progress_service::ProgressService;

/// What opening a lesson yields: either the interactive view or a placeholder.
pub enum LessonAccess {
    /// The lesson is restricted and not yet unlocked. No interactive content
    /// is handed out.
    Locked(LockedLesson),
    Open(LessonSession),
}

/// Everything a host may show for a lesson it cannot open yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedLesson {
    pub id: LessonId,
    pub title: String,
    pub topic: String,
}

/// One open lesson view.
///
/// Operations run one at a time against the view's runner. A started
/// challenge countdown lives exactly as long as the session: dropping the
/// session stops it.
pub struct LessonSession {
    lesson: Arc<LessonDefinition>,
    runner: Arc<Mutex<LessonRunner>>,
    countdown: Option<Countdown>,
}

impl LessonSession {
    /// Apply the unlock gate and, if it passes, open a view restored with the
    /// learner's stored progress.
    pub async fn open(
        lesson: Arc<LessonDefinition>,
        progress: Arc<ProgressService>,
        clock: Clock,
    ) -> LessonAccess {
        if !progress.can_open(&lesson).await {
            return LessonAccess::Locked(LockedLesson {
                id: lesson.id().clone(),
                title: lesson.title().to_owned(),
                topic: lesson.topic().to_owned(),
            });
        }

        let record = progress.progress_record(lesson.id()).await;
        let runner = LessonRunner::new(Arc::clone(&lesson), record, progress, clock);
        LessonAccess::Open(Self {
            lesson,
            runner: Arc::new(Mutex::new(runner)),
            countdown: None,
        })
    }

    #[must_use]
    pub fn lesson(&self) -> &LessonDefinition {
        &self.lesson
    }

    /// # Errors
    ///
    /// Returns `RunnerError::Answer` once checked or for out-of-range indices.
    pub async fn select_answer(&self, question: usize, option: usize) -> Result<(), RunnerError> {
        self.runner.lock().await.select_answer(question, option)
    }

    /// # Errors
    ///
    /// Returns `RunnerError::Answer` once checked, for out-of-range indices or
    /// for an item that takes a numbered choice.
    pub async fn write_answer(&self, question: usize, text: &str) -> Result<(), RunnerError> {
        self.runner.lock().await.write_answer(question, text)
    }

    /// # Errors
    ///
    /// Returns `RunnerError::Answer` if already checked or not fully answered.
    pub async fn check_answers(&self) -> Result<CheckOutcome, RunnerError> {
        self.runner.lock().await.check_answers().await
    }

    pub async fn reset(&self) {
        self.runner.lock().await.reset();
    }

    /// Start the challenge countdown. `None` uses the practice format's own
    /// countdown if it has one, else the lesson's challenge length.
    ///
    /// Returns a receiver of the remaining seconds; it reads 0 once the
    /// lesson has been auto-finished.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::ChallengeRunning` while a countdown is active and
    /// `RunnerError::ChallengeExpired` after one has run out.
    pub async fn start_challenge(
        &mut self,
        duration_secs: Option<u32>,
    ) -> Result<watch::Receiver<u32>, RunnerError> {
        let duration = duration_secs
            .or_else(|| self.lesson.built_in_countdown())
            .unwrap_or_else(|| self.lesson.effective_challenge_seconds());
        let mut runner = self.runner.lock().await;
        runner.begin_challenge(duration)?;

        if duration == 0 {
            runner.expire_challenge().await;
            let (_tx, rx) = watch::channel(0);
            return Ok(rx);
        }
        drop(runner);

        let countdown = Countdown::spawn(Arc::downgrade(&self.runner), duration);
        let rx = countdown.subscribe();
        self.countdown = Some(countdown);
        Ok(rx)
    }

    pub async fn challenge_state(&self) -> ChallengeState {
        self.runner.lock().await.challenge_state()
    }

    /// Snapshot of the working answers.
    pub async fn sheet(&self) -> AnswerSheet {
        self.runner.lock().await.sheet().clone()
    }

    pub async fn outcome(&self) -> Option<CheckOutcome> {
        self.runner.lock().await.sheet().outcome().cloned()
    }

    pub async fn progress_record(&self) -> ProgressRecord {
        self.runner.lock().await.progress_record()
    }
}
