mod answer_sheet;
mod catalog;
mod ids;
mod lesson;
mod progress;
mod task;
mod vocabulary;

pub use ids::{LessonId, TopicKey};

pub use answer_sheet::{AnswerError, AnswerSheet, CheckOutcome, FinishMode, SheetPhase};
pub use catalog::{CatalogIssue, LessonCatalog, LessonSummary};
pub use lesson::{
    AnswerOption, AuthoringIssue, DEFAULT_CHALLENGE_SECONDS, LessonDefinition, Question,
};
pub use progress::{LessonResult, ProgressRecord};
pub use task::{
    CorrectionItem, InterviewItem, MatchPair, PracticeItem, Response, TIMED_QA_SECONDS, Task,
    YES_NO_CHOICES, YesNo, YesNoItem, normalize_sentence,
};
pub use vocabulary::{VocabularyProgress, VocabularyScope};
