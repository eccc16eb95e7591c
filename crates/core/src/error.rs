use thiserror::Error;

/// Errors raised while loading lesson content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonError {
    #[error("invalid lesson payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("lesson id cannot be empty")]
    EmptyId,
}
