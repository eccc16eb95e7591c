//! Interactive lesson run over stdin/stdout.

use std::sync::Arc;

use anyhow::{Result, bail};
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;

use lesson_core::model::{AnswerError, CheckOutcome, LessonDefinition, PracticeItem};
use services::{AppServices, LessonAccess, LessonSession, RunnerError};

use crate::render;

type Input = Lines<BufReader<Stdin>>;

enum Finish {
    Answered,
    TimeUp,
}

pub async fn run(
    services: &AppServices,
    lesson: LessonDefinition,
    challenge: bool,
    seconds: Option<u32>,
) -> Result<()> {
    let mut session = match services.open_lesson(Arc::new(lesson)).await {
        LessonAccess::Open(session) => session,
        LessonAccess::Locked(locked) => {
            println!("🔒 {} ({}) is locked.", locked.title, locked.topic);
            println!("Pass the previous lesson to unlock it.");
            return Ok(());
        }
    };

    intro(&session).await;

    let mut remaining = if challenge || session.lesson().built_in_countdown().is_some() {
        let rx = session.start_challenge(seconds).await?;
        println!("\n⏱  Challenge: {}s on the clock.", *rx.borrow());
        Some(rx)
    } else {
        None
    };

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let outcome = match answer_all(&session, &mut input, &mut remaining).await? {
        Finish::Answered => match session.check_answers().await {
            Ok(outcome) => outcome,
            Err(RunnerError::Answer(AnswerError::AlreadyChecked)) => timed_out(&session).await?,
            Err(err) => return Err(err.into()),
        },
        Finish::TimeUp => timed_out(&session).await?,
    };

    println!("\n{}", render::outcome(&outcome));
    println!("XP total: {}", services.progress().total_xp().await);
    Ok(())
}

async fn intro(session: &LessonSession) {
    let lesson = session.lesson();
    println!("{} · {}", lesson.topic(), lesson.title());
    if !lesson.can_do().is_empty() {
        println!("Can do: {}", lesson.can_do());
    }

    let record = session.progress_record().await;
    if record.completed() {
        println!("✓ Already completed ({})", render::record(&record));
    } else if record.attempt_count() > 0 {
        println!("Previously: {}", render::record(&record));
    }

    for html in [lesson.rule_html(), lesson.examples_html()] {
        if !html.trim().is_empty() {
            println!("\n{}", render::html_to_text(html));
        }
    }
}

/// Prompt for every item until all are answered or the countdown runs out.
async fn answer_all(
    session: &LessonSession,
    input: &mut Input,
    remaining: &mut Option<watch::Receiver<u32>>,
) -> Result<Finish> {
    let items = session.lesson().items();

    for (index, item) in items.iter().enumerate() {
        let answered = session.sheet().await.answered_percent();
        println!("\n[{answered:>3}% answered]");
        println!("{}", render::item(index, item));
        loop {
            let hint = match item.choice_count() {
                Some(count) => format!("answer 1-{count}"),
                None => "type the corrected sentence (empty keeps it)".to_owned(),
            };
            match remaining.as_ref() {
                Some(rx) => println!("({}s left) {hint}:", *rx.borrow()),
                None => println!("{hint}:"),
            }

            let line = tokio::select! {
                line = input.next_line() => line?,
                () = expired(remaining) => return Ok(Finish::TimeUp),
            };
            let Some(line) = line else {
                if remaining.is_some() {
                    println!("Input closed; waiting for the clock.");
                    expired(remaining).await;
                    return Ok(Finish::TimeUp);
                }
                bail!("input ended with {} item(s) unanswered", items.len() - index);
            };

            let recorded = match item {
                PracticeItem::Choice { choices, .. } => {
                    let Some(option) = render::parse_choice(&line, choices.len()) else {
                        println!("Please type a number from 1 to {}.", choices.len());
                        continue;
                    };
                    session.select_answer(index, option).await
                }
                PracticeItem::Text { draft, .. } => {
                    let text = if line.trim().is_empty() { *draft } else { line.as_str() };
                    session.write_answer(index, text).await
                }
            };
            match recorded {
                Ok(()) => break,
                Err(RunnerError::Answer(AnswerError::AlreadyChecked)) => {
                    return Ok(Finish::TimeUp);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(Finish::Answered)
}

/// Resolves once the countdown has auto-finished the lesson. Never resolves
/// without a countdown.
async fn expired(remaining: &mut Option<watch::Receiver<u32>>) {
    if let Some(rx) = remaining {
        if rx.wait_for(|secs| *secs == 0).await.is_ok() {
            return;
        }
        debug!("countdown stopped before reaching zero");
    }
    std::future::pending::<()>().await;
}

async fn timed_out(session: &LessonSession) -> Result<CheckOutcome> {
    println!("\n⏰ Time is up!");
    match session.outcome().await {
        Some(outcome) => Ok(outcome),
        None => bail!("countdown ended without scoring the lesson"),
    }
}
