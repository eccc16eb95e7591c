#![forbid(unsafe_code)]

mod best_effort;

pub mod app_services;
pub mod error;
pub mod lesson;
pub mod progress_service;
pub mod vocabulary_service;

pub use lesson_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, RunnerError};
pub use lesson::{ChallengeState, LessonAccess, LessonRunner, LessonSession, LockedLesson};
pub use progress_service::ProgressService;
pub use vocabulary_service::VocabularyService;
