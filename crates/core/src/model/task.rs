//! Practice formats other than plain multiple choice.
//!
//! Every format is reduced to a list of scorable items so the answer sheet,
//! scoring and rewards work the same whichever format a lesson uses.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Countdown a yes/no drill runs with when the host does not pick one.
pub const TIMED_QA_SECONDS: u32 = 30;

/// Labels of the two answers in a yes/no drill, in choice order.
pub const YES_NO_CHOICES: [&str; 2] = ["Yes", "No"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub base: String,
    pub past: String,
}

/// A sentence to fix: shown as `bad`, accepted when it reads as `good`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionItem {
    pub bad: String,
    pub good: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    fn choice_index(self) -> usize {
        match self {
            YesNo::Yes => 0,
            YesNo::No => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YesNoItem {
    #[serde(rename = "q")]
    pub question: String,
    #[serde(rename = "a")]
    pub answer: YesNo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewItem {
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
    pub answer: String,
}

impl InterviewItem {
    /// How many listed choices equal the expected answer.
    #[must_use]
    pub fn matching_choice_count(&self) -> usize {
        self.choices.iter().filter(|c| **c == self.answer).count()
    }
}

/// The `task` block of a lesson payload, tagged by `type`.
///
/// Unrecognised types deserialize as `Unknown` and the lesson falls back to
/// its multiple-choice questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Task {
    /// Pair each base verb with its past form.
    #[serde(rename = "dragmatch")]
    DragMatch {
        #[serde(default)]
        pairs: Vec<MatchPair>,
    },
    /// Rewrite faulty sentences; compared case- and whitespace-insensitively.
    #[serde(rename = "correct")]
    Correct {
        #[serde(default)]
        items: Vec<CorrectionItem>,
    },
    /// Rapid yes/no questions, normally against a short countdown.
    #[serde(rename = "timedQA")]
    TimedQa {
        #[serde(default)]
        items: Vec<YesNoItem>,
    },
    /// Pick the right answer from a list of strings.
    #[serde(rename = "interview")]
    Interview {
        #[serde(default)]
        items: Vec<InterviewItem>,
    },
    /// Put the story lines back in order; each position scores on its own.
    #[serde(rename = "storyOrder")]
    StoryOrder {
        #[serde(default)]
        lines: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

/// A learner's answer to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Index into the item's choices.
    Choice(usize),
    /// Free text, for sentence correction.
    Text(String),
}

/// How one item is presented and answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeItem<'a> {
    Choice {
        prompt: Cow<'a, str>,
        choices: Vec<&'a str>,
    },
    Text {
        prompt: Cow<'a, str>,
        /// Starting text the learner edits.
        draft: &'a str,
    },
}

impl PracticeItem<'_> {
    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            PracticeItem::Choice { prompt, .. } | PracticeItem::Text { prompt, .. } => prompt,
        }
    }

    /// Number of choices, or `None` for a free-text item.
    #[must_use]
    pub fn choice_count(&self) -> Option<usize> {
        match self {
            PracticeItem::Choice { choices, .. } => Some(choices.len()),
            PracticeItem::Text { .. } => None,
        }
    }
}

/// Lower-case and collapse whitespace runs to one space.
#[must_use]
pub fn normalize_sentence(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Task {
    /// Whether the task replaces the lesson's multiple-choice questions.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Task::Unknown)
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Task::DragMatch { pairs } => pairs.len(),
            Task::Correct { items } => items.len(),
            Task::TimedQa { items } => items.len(),
            Task::Interview { items } => items.len(),
            Task::StoryOrder { lines } => lines.len(),
            Task::Unknown => 0,
        }
    }

    /// Countdown the format runs with on its own, if any.
    #[must_use]
    pub fn built_in_countdown(&self) -> Option<u32> {
        matches!(self, Task::TimedQa { .. }).then_some(TIMED_QA_SECONDS)
    }

    #[must_use]
    pub fn items(&self) -> Vec<PracticeItem<'_>> {
        match self {
            Task::DragMatch { pairs } => {
                let past_forms: Vec<&str> = pairs.iter().map(|p| p.past.as_str()).collect();
                pairs
                    .iter()
                    .map(|pair| PracticeItem::Choice {
                        prompt: Cow::Owned(format!("Past form of \"{}\"", pair.base)),
                        choices: past_forms.clone(),
                    })
                    .collect()
            }
            Task::Correct { items } => items
                .iter()
                .enumerate()
                .map(|(i, item)| PracticeItem::Text {
                    prompt: Cow::Owned(format!("Correct sentence {}", i + 1)),
                    draft: &item.bad,
                })
                .collect(),
            Task::TimedQa { items } => items
                .iter()
                .map(|item| PracticeItem::Choice {
                    prompt: Cow::Borrowed(item.question.as_str()),
                    choices: YES_NO_CHOICES.to_vec(),
                })
                .collect(),
            Task::Interview { items } => items
                .iter()
                .map(|item| PracticeItem::Choice {
                    prompt: Cow::Borrowed(item.prompt.as_str()),
                    choices: item.choices.iter().map(String::as_str).collect(),
                })
                .collect(),
            Task::StoryOrder { lines } => {
                let choices: Vec<&str> = lines.iter().map(String::as_str).collect();
                (0..lines.len())
                    .map(|position| PracticeItem::Choice {
                        prompt: Cow::Owned(format!("Line {} of the story", position + 1)),
                        choices: choices.clone(),
                    })
                    .collect()
            }
            Task::Unknown => Vec::new(),
        }
    }

    /// Whether `response` answers item `item` correctly. Mismatched response
    /// kinds and out-of-range indices are never correct.
    #[must_use]
    pub fn is_correct(&self, item: usize, response: &Response) -> bool {
        match (self, response) {
            (Task::DragMatch { pairs }, Response::Choice(chosen)) => {
                match (pairs.get(item), pairs.get(*chosen)) {
                    (Some(pair), Some(picked)) => pair.past == picked.past,
                    _ => false,
                }
            }
            (Task::Correct { items }, Response::Text(text)) => items
                .get(item)
                .is_some_and(|it| normalize_sentence(text) == normalize_sentence(&it.good)),
            (Task::TimedQa { items }, Response::Choice(chosen)) => items
                .get(item)
                .is_some_and(|it| it.answer.choice_index() == *chosen),
            (Task::Interview { items }, Response::Choice(chosen)) => items
                .get(item)
                .is_some_and(|it| it.choices.get(*chosen) == Some(&it.answer)),
            (Task::StoryOrder { lines }, Response::Choice(chosen)) => {
                match (lines.get(item), lines.get(*chosen)) {
                    (Some(expected), Some(placed)) => expected == placed,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}
