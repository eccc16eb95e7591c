//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::AnswerError;
use storage::sqlite::SqliteInitError;

/// Calls a lesson view rejects. State is unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RunnerError {
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error("a challenge is already running for this lesson")]
    ChallengeRunning,
    #[error("the challenge has already expired for this lesson view")]
    ChallengeExpired,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
