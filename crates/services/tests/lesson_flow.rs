use std::sync::Arc;

use lesson_core::model::{LessonCatalog, LessonId, TopicKey};
use lesson_core::time::fixed_now;
use services::{AppServices, Clock, LessonAccess, LessonSession};
use storage::KeySpace;

const CATALOG: &str = r#"{ "lessons": [
    { "slug": "L1", "topic": "Past Simple", "topicKey": "past", "title": "Regular verbs",
      "nextSlug": "L2",
      "questions": [
        { "prompt": "I ___ home.", "options":
            [ { "text": "walked", "correct": true }, { "text": "walk" } ] },
        { "prompt": "She ___ TV.", "options":
            [ { "text": "watched", "correct": true }, { "text": "watch" } ] },
        { "prompt": "We ___ dinner.", "options":
            [ { "text": "cooked", "correct": true }, { "text": "cook" } ] },
        { "prompt": "They ___ late.", "options":
            [ { "text": "arrived", "correct": true }, { "text": "arrive" } ] },
        { "prompt": "He ___ hard.", "options":
            [ { "text": "worked", "correct": true }, { "text": "work" } ] }
      ] },
    { "slug": "L2", "topic": "Past Simple", "topicKey": "past", "title": "Irregular verbs",
      "locked": true, "nextSlug": null,
      "questions": [
        { "prompt": "I ___ a cake.", "options":
            [ { "text": "maked" }, { "text": "made", "correct": true } ] }
      ] }
] }"#;

fn lesson(catalog: &LessonCatalog, id: &str) -> Arc<lesson_core::model::LessonDefinition> {
    Arc::new(catalog.get(&LessonId::new(id)).expect("lesson in catalog").clone())
}

async fn open(services: &AppServices, catalog: &LessonCatalog, id: &str) -> LessonAccess {
    services.open_lesson(lesson(catalog, id)).await
}

fn expect_open(access: LessonAccess) -> LessonSession {
    match access {
        LessonAccess::Open(session) => session,
        LessonAccess::Locked(locked) => panic!("lesson {} unexpectedly locked", locked.id),
    }
}

#[tokio::test]
async fn passing_first_lesson_opens_the_second() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_lesson_flow?mode=memory&cache=shared",
        KeySpace::default(),
        Clock::fixed(fixed_now()),
    )
    .await
    .expect("sqlite services");
    let catalog = LessonCatalog::from_json(CATALOG).unwrap();

    match open(&services, &catalog, "L2").await {
        LessonAccess::Locked(locked) => assert_eq!(locked.title, "Irregular verbs"),
        LessonAccess::Open(_) => panic!("L2 must start locked"),
    }

    let first = expect_open(open(&services, &catalog, "L1").await);
    for question in 0..4 {
        first.select_answer(question, 0).await.unwrap();
    }
    first.select_answer(4, 1).await.unwrap();
    let outcome = first.check_answers().await.unwrap();

    assert_eq!(outcome.score_percent(), 80);
    assert!(outcome.passed());
    assert_eq!(outcome.reward(), 18);
    assert_eq!(outcome.next_lesson(), Some(&LessonId::new("L2")));

    let progress = services.progress();
    assert_eq!(progress.total_xp().await, 18);
    assert!(progress.has_badge(&TopicKey::new("past")).await);

    let second = expect_open(open(&services, &catalog, "L2").await);
    assert_eq!(second.progress_record().await.attempt_count(), 0);
}

#[tokio::test]
async fn failing_attempt_leaves_successor_locked() {
    let services = AppServices::in_memory(KeySpace::default(), Clock::fixed(fixed_now()));
    let catalog = LessonCatalog::from_json(CATALOG).unwrap();

    let session = expect_open(open(&services, &catalog, "L1").await);
    session.select_answer(0, 0).await.unwrap();
    for question in 1..5 {
        session.select_answer(question, 1).await.unwrap();
    }
    let outcome = session.check_answers().await.unwrap();

    assert_eq!(outcome.score_percent(), 20);
    assert!(!outcome.passed());
    assert_eq!(outcome.reward(), 2);
    assert!(outcome.next_lesson().is_none());
    assert!(matches!(
        open(&services, &catalog, "L2").await,
        LessonAccess::Locked(_)
    ));
}

#[tokio::test]
async fn reopened_view_restores_progress_but_not_answers() {
    let services = AppServices::in_memory(KeySpace::default(), Clock::fixed(fixed_now()));
    let catalog = LessonCatalog::from_json(CATALOG).unwrap();

    let session = expect_open(open(&services, &catalog, "L1").await);
    for question in 0..5 {
        session.select_answer(question, 0).await.unwrap();
    }
    session.check_answers().await.unwrap();
    drop(session);

    let again = expect_open(open(&services, &catalog, "L1").await);
    let record = again.progress_record().await;
    assert!(record.completed());
    assert_eq!(record.best_score_percent(), 100);
    assert_eq!(again.sheet().await.answered_count(), 0);
    assert!(again.outcome().await.is_none());
}

#[tokio::test]
async fn best_score_survives_worse_retries() {
    let services = AppServices::in_memory(KeySpace::default(), Clock::fixed(fixed_now()));
    let catalog = LessonCatalog::from_json(CATALOG).unwrap();
    let session = expect_open(open(&services, &catalog, "L1").await);

    let mut best_seen = 0;
    for correct in [3_usize, 5, 1, 4] {
        for question in 0..5 {
            let option = usize::from(question >= correct);
            session.select_answer(question, option).await.unwrap();
        }
        session.check_answers().await.unwrap();
        let best = session.progress_record().await.best_score_percent();
        assert!(best >= best_seen);
        best_seen = best;
        session.reset().await;
    }

    let record = services.progress().progress_record(&LessonId::new("L1")).await;
    assert_eq!(record.attempt_count(), 4);
    assert_eq!(record.best_score_percent(), 100);
}

#[tokio::test]
async fn story_order_lesson_unlocks_through_the_same_pipeline() {
    let raw = r#"{ "lessons": [
        { "slug": "story", "topicKey": "narrative", "title": "Last Saturday", "nextSlug": "quiz",
          "task": { "type": "storyOrder", "lines": [
              "I woke up late.", "I had breakfast.", "I met Anna.", "We went to the cinema." ] } },
        { "slug": "quiz", "topicKey": "narrative", "title": "Quiz", "locked": true,
          "questions": [ { "prompt": "?", "options": [ { "text": "ok", "correct": true } ] } ] }
    ] }"#;
    let catalog = LessonCatalog::from_json(raw).unwrap();
    let services = AppServices::in_memory(KeySpace::default(), Clock::fixed(fixed_now()));

    let story = expect_open(open(&services, &catalog, "story").await);
    assert_eq!(story.lesson().item_count(), 4);
    for (position, line) in [0, 1, 3, 2].into_iter().enumerate() {
        story.select_answer(position, line).await.unwrap();
    }
    let outcome = story.check_answers().await.unwrap();
    assert_eq!((outcome.correct(), outcome.score_percent()), (2, 50));
    assert!(matches!(open(&services, &catalog, "quiz").await, LessonAccess::Locked(_)));

    story.reset().await;
    for position in 0..4 {
        story.select_answer(position, position).await.unwrap();
    }
    let outcome = story.check_answers().await.unwrap();
    assert!(outcome.passed());
    assert_eq!(outcome.reward(), 20);
    assert_eq!(services.progress().total_xp().await, 2 + 20);
    expect_open(open(&services, &catalog, "quiz").await);
}
