use std::sync::{Arc, Mutex};

use karo_core::model::{
    CompletionRecord, LessonCatalog, LessonId, LessonProgress, Milestone, Question, Streak,
};
use karo_core::{EngineConfig, model::Lesson};
use services::{AppServices, QuizEngine, QuizEvents, QuizStep};
use storage::repository::Storage;

#[derive(Default)]
struct RecordingEvents {
    seen: Mutex<Vec<Milestone>>,
}

impl RecordingEvents {
    fn take(&self) -> Vec<Milestone> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

impl QuizEvents for RecordingEvents {
    fn milestone(&self, milestone: Milestone) {
        self.seen.lock().unwrap().push(milestone);
    }
}

fn id(raw: &str) -> LessonId {
    LessonId::new(raw).unwrap()
}

fn engine_with(catalog: LessonCatalog) -> (QuizEngine, Storage, Arc<RecordingEvents>) {
    let storage = Storage::in_memory();
    let events = Arc::new(RecordingEvents::default());
    let engine = QuizEngine::new(
        EngineConfig::default(),
        Arc::new(catalog),
        Arc::clone(&storage.progress),
        events.clone(),
    );
    (engine, storage, events)
}

fn builtin_engine() -> (QuizEngine, Storage, Arc<RecordingEvents>) {
    engine_with(LessonCatalog::builtin().unwrap())
}

fn long_lesson(count: usize) -> LessonCatalog {
    let questions = (0..count)
        .map(|i| Question::new(format!("Q{i}"), "", ["sí", "no", "quizás", "nunca"], 0).unwrap())
        .collect();
    LessonCatalog::new([Lesson::new(id("long"), "Длинный", "Largo", questions).unwrap()])
}

#[tokio::test]
async fn ten_correct_answers_complete_lesson_one() {
    let (engine, storage, events) = builtin_engine();
    let (mut session, mut step) = engine.initialize(Some(id("1"))).await.unwrap();

    let mut answered = 0;
    while let QuizStep::Question(_) = step {
        let submission = engine.submit_answer(&mut session, 0).unwrap();
        assert!(submission.is_correct);
        answered += 1;
        step = engine.advance(&mut session).await.unwrap();
    }

    assert_eq!(answered, 10);
    assert_eq!(session.streak(), Streak::new(10));
    assert_eq!(
        events.take(),
        vec![
            Milestone::FirstStreak,
            Milestone::SecondStreak,
            Milestone::LessonComplete
        ]
    );

    let QuizStep::Completed(summary) = step else {
        panic!("lesson should be complete");
    };
    assert_eq!(summary.record, CompletionRecord::new(10, 10));
    assert_eq!(summary.streak.value(), 10);

    let progress = storage.progress.get_progress().await.unwrap();
    assert_eq!(progress.get(&id("1")), Some(CompletionRecord::new(10, 10)));
}

#[tokio::test]
async fn wrong_then_right_only_reaches_one() {
    let (engine, _storage, events) = builtin_engine();
    let (mut session, _) = engine.initialize(Some(id("1"))).await.unwrap();

    let miss = engine.submit_answer(&mut session, 1).unwrap();
    assert!(!miss.is_correct);
    assert_eq!(miss.selected, 1);
    assert_eq!(miss.correct_index, 0);
    assert_eq!(miss.streak.value(), 0);

    engine.advance(&mut session).await.unwrap();
    let hit = engine.submit_answer(&mut session, 0).unwrap();
    assert_eq!(hit.streak.value(), 1);
    assert!(events.take().is_empty());
}

#[tokio::test]
async fn repeated_submission_does_not_rescore() {
    let (engine, _storage, _events) = builtin_engine();
    let (mut session, _) = engine.initialize(Some(id("1"))).await.unwrap();

    assert!(engine.submit_answer(&mut session, 0).is_some());
    assert!(engine.submit_answer(&mut session, 0).is_none());
    assert!(engine.submit_answer(&mut session, 2).is_none());
    assert_eq!(session.streak().value(), 1);
}

#[tokio::test]
async fn completion_records_total_regardless_of_correctness() {
    let (engine, storage, events) = builtin_engine();
    let (mut session, _) = engine.initialize(Some(id("2"))).await.unwrap();

    engine.submit_answer(&mut session, 3).unwrap();
    engine.advance(&mut session).await.unwrap();
    engine.submit_answer(&mut session, 2).unwrap();
    let step = engine.advance(&mut session).await.unwrap();

    assert!(matches!(step, QuizStep::Completed(_)));
    assert_eq!(session.streak().value(), 0);
    assert_eq!(events.take(), vec![Milestone::LessonComplete]);

    let progress = storage.progress.get_progress().await.unwrap();
    assert_eq!(progress.get(&id("2")), Some(CompletionRecord::new(2, 2)));
}

#[tokio::test]
async fn advancing_past_the_end_completes_once() {
    let (engine, _storage, events) = builtin_engine();
    let (mut session, _) = engine.initialize(Some(id("2"))).await.unwrap();

    engine.advance(&mut session).await.unwrap();
    let first = engine.advance(&mut session).await.unwrap();
    let second = engine.advance(&mut session).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(events.take(), vec![Milestone::LessonComplete]);
}

#[tokio::test]
async fn recompleting_overwrites_with_same_record() {
    let (engine, storage, _events) = builtin_engine();

    let mut stale = LessonProgress::new();
    stale.record_completion(id("2"), CompletionRecord::new(1, 5));
    storage.progress.save_progress(&stale).await.unwrap();

    for _ in 0..2 {
        let (mut session, mut step) = engine.initialize(Some(id("2"))).await.unwrap();
        while let QuizStep::Question(_) = step {
            engine.submit_answer(&mut session, 0);
            step = engine.advance(&mut session).await.unwrap();
        }
        let progress = storage.progress.get_progress().await.unwrap();
        assert_eq!(progress.get(&id("2")), Some(CompletionRecord::new(2, 2)));
        assert_eq!(progress.len(), 1);
    }
}

#[tokio::test]
async fn long_streak_fires_every_fifth_answer_after_ten() {
    let (engine, _storage, events) = engine_with(long_lesson(22));
    let (mut session, mut step) = engine.initialize(Some(id("long"))).await.unwrap();

    while let QuizStep::Question(_) = step {
        engine.submit_answer(&mut session, 0);
        step = engine.advance(&mut session).await.unwrap();
    }

    assert_eq!(
        events.take(),
        vec![
            Milestone::FirstStreak,
            Milestone::SecondStreak,
            Milestone::Streak(15),
            Milestone::Streak(20),
            Milestone::LessonComplete,
        ]
    );
}

#[tokio::test]
async fn streak_counts_consecutive_correct_answers() {
    let (engine, _storage, _events) = engine_with(long_lesson(8));
    let (mut session, _) = engine.initialize(Some(id("long"))).await.unwrap();

    let answers = [0, 0, 1, 0, 0, 0, 2, 0];
    let mut expected = 0;
    for selected in answers {
        let submission = engine.submit_answer(&mut session, selected).unwrap();
        expected = if selected == 0 { expected + 1 } else { 0 };
        assert_eq!(submission.streak.value(), expected);
        engine.advance(&mut session).await.unwrap();
    }
    assert_eq!(session.streak().value(), 1);
}

#[tokio::test]
async fn presented_progress_counts_current_question() {
    let (engine, _storage, _events) = builtin_engine();
    let (mut session, step) = engine.initialize(Some(id("2"))).await.unwrap();

    let QuizStep::Question(first) = step else {
        panic!("expected first question");
    };
    assert_eq!((first.number, first.total), (1, 2));
    assert!((first.progress() - 0.5).abs() < f64::EPSILON);
    assert_eq!(first.options[0], "Un café, por favor");

    let QuizStep::Question(second) = engine.advance(&mut session).await.unwrap() else {
        panic!("expected second question");
    };
    assert!((second.progress() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn re_presenting_keeps_cursor_and_rearms_guard() {
    let (engine, _storage, _events) = builtin_engine();
    let (mut session, first) = engine.initialize(Some(id("1"))).await.unwrap();

    engine.submit_answer(&mut session, 0).unwrap();
    assert!(session.is_answered());

    let again = engine.present_question(&mut session).await.unwrap();
    assert_eq!(again, first);
    assert_eq!(session.cursor(), 0);
    assert!(!session.is_answered());
}

#[tokio::test]
async fn app_services_share_storage_between_quiz_and_list() {
    let storage = Storage::in_memory();
    let services = AppServices::new(
        &storage,
        EngineConfig::default(),
        LessonCatalog::builtin().unwrap(),
        Arc::new(services::NoopEvents),
    );

    let quiz = services.quiz();
    let (mut session, mut step) = quiz.open_lesson(id("2")).await.unwrap();
    while let QuizStep::Question(_) = step {
        quiz.submit_answer(&mut session, 0);
        step = quiz.advance(&mut session).await.unwrap();
    }

    let items = services.progress().lesson_list().await.unwrap();
    let coffee = items.iter().find(|item| item.id == id("2")).unwrap();
    assert_eq!(coffee.record, Some(CompletionRecord::new(2, 2)));
    assert_eq!(
        storage.progress.get_current_lesson().await.unwrap(),
        Some(id("2"))
    );
}
