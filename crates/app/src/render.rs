//! Plain-text rendering of lesson content and results for the terminal.

use lesson_core::model::{CheckOutcome, FinishMode, LessonResult, PracticeItem, ProgressRecord};

const TEXT_WIDTH: usize = 78;

/// Strip lesson HTML down to wrapped text. Unparseable markup is shown as-is.
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), TEXT_WIDTH)
        .unwrap_or_else(|_| html.to_owned())
        .trim_end()
        .to_owned()
}

pub fn item(index: usize, item: &PracticeItem<'_>) -> String {
    let mut out = format!("{}. {}", index + 1, item.prompt());
    match item {
        PracticeItem::Choice { choices, .. } => {
            for (i, choice) in choices.iter().enumerate() {
                out.push_str(&format!("\n   {}) {choice}", i + 1));
            }
        }
        PracticeItem::Text { draft, .. } => out.push_str(&format!("\n   > {draft}")),
    }
    out
}

/// Parse a 1-based option number typed by the learner into an option index.
pub fn parse_choice(input: &str, option_count: usize) -> Option<usize> {
    let number: usize = input.trim().parse().ok()?;
    (1..=option_count).contains(&number).then(|| number - 1)
}

pub fn outcome(outcome: &CheckOutcome) -> String {
    let verdict = if outcome.passed() { "passed" } else { "not passed" };
    let mut out = format!(
        "Score: {}/{} ({}%), {verdict}, +{} XP",
        outcome.correct(),
        outcome.total(),
        outcome.score_percent(),
        outcome.reward()
    );
    if outcome.mode() == FinishMode::Timer {
        out.push_str(" [time up]");
    }
    if let Some(next) = outcome.next_lesson() {
        out.push_str(&format!("\nNext lesson unlocked: {next}"));
    }
    out
}

pub fn record(record: &ProgressRecord) -> String {
    let status = if record.completed() { ", completed" } else { "" };
    format!(
        "attempts: {}, best: {}%{status}",
        record.attempt_count(),
        record.best_score_percent()
    )
}

pub fn result(result: &LessonResult) -> String {
    format!(
        "last result: {}/{} ({}) at {}",
        result.score,
        result.total,
        if result.passed { "passed" } else { "not passed" },
        result.at.format("%Y-%m-%d %H:%M UTC")
    )
}
