mod challenge;
mod runner;
mod session;

// Public API of the lesson subsystem.
pub use crate::error::RunnerError;
pub use challenge::{ChallengeState, TICK};
pub use runner::LessonRunner;
pub use session::{LessonAccess, LessonSession, LockedLesson};
