use std::io;
use std::sync::Mutex;
use std::time::Duration;

use karo_core::model::{LessonId, Milestone, Settings, Streak};
use karo_core::quiz::{PresentedQuestion, Submission};
use services::{
    AppServices, CompletionSummary, LessonListItem, QuizEngineError, QuizEvents, QuizStep,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Milestone popups waiting for the presentation delay to elapse.
#[derive(Default)]
pub struct ConsolePresenter {
    pending: Mutex<Vec<Milestone>>,
}

impl ConsolePresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn drain(&self) -> Vec<Milestone> {
        self.pending
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    /// Show queued popups after `delay`.
    pub async fn show_pending(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
        for milestone in self.drain() {
            println!();
            println!("  🦜 Каро: {milestone}");
            println!();
        }
    }
}

impl QuizEvents for ConsolePresenter {
    fn milestone(&self, milestone: Milestone) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(milestone);
        }
    }
}

/// Line-oriented user input.
pub struct Console<R> {
    lines: Lines<R>,
}

impl Console<BufReader<Stdin>> {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next input line, `None` at end of input.
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_owned()))
    }
}

/// Parse a 1-based option number typed by the user.
fn parse_selection(raw: &str, option_count: usize) -> Option<usize> {
    let number: usize = raw.trim().parse().ok()?;
    (1..=option_count).contains(&number).then(|| number - 1)
}

fn progress_bar(fraction: f64, width: usize) -> String {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn render_question(question: &PresentedQuestion, streak: Streak) {
    println!();
    println!(
        "{} Вопрос {} из {}   🔥 {}",
        progress_bar(question.progress(), 20),
        question.number,
        question.total,
        streak
    );
    println!("{}", question.prompt);
    if !question.hint.is_empty() {
        println!("  ({})", question.hint);
    }
    for (index, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", index + 1);
    }
}

fn render_submission(question: &PresentedQuestion, submission: &Submission) {
    if submission.is_correct {
        println!("✓ {}", question.options[submission.selected]);
    } else {
        println!(
            "✗ {}  →  {}",
            question.options[submission.selected], question.options[submission.correct_index]
        );
    }
    println!("🔥 {}", submission.streak);
}

fn render_completion(summary: &CompletionSummary) {
    println!();
    println!("¡Felicidades! Урок завершён! 🎉");
    println!("Ты ответил правильно на все вопросы!");
    println!(
        "Урок {}: {}/{}",
        summary.lesson_id, summary.record.completed, summary.record.total
    );
}

pub fn render_lesson_list(items: &[LessonListItem]) {
    println!();
    for item in items {
        let done = item
            .record
            .map_or_else(|| format!("0/{}", item.question_count), |r| {
                format!("{}/{}", r.completed, r.total)
            });
        println!(
            "  [{}] {} / {}  {} {done} ({:.0}%)",
            item.id,
            item.title,
            item.title_es,
            progress_bar(item.percentage() / 100.0, 10),
            item.percentage()
        );
    }
}

pub fn render_settings(settings: &Settings) {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    println!("theme:      {}", settings.theme());
    println!("gyroscope:  {}", on_off(settings.gyroscope()));
    println!("animations: {}", on_off(settings.animations()));
    println!("particles:  {}", on_off(settings.particles()));
}

/// Ask for the next lesson from the list. `None` means quit.
async fn choose_lesson<R: AsyncBufRead + Unpin>(
    services: &AppServices,
    console: &mut Console<R>,
) -> Result<Option<LessonId>, Box<dyn std::error::Error>> {
    let items = services.progress().lesson_list().await?;
    render_lesson_list(&items);
    println!();
    println!("Номер урока (Enter — выход):");

    loop {
        let Some(line) = console.read_line().await? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(None);
        }
        match LessonId::new(line) {
            Ok(id) => return Ok(Some(id)),
            Err(err) => println!("{err}"),
        }
    }
}

/// Run lessons until the user quits or input ends, returning the streak
/// reached.
///
/// The streak lives for the whole run and carries from one lesson to the
/// next; it is never persisted.
pub async fn run_quiz<R: AsyncBufRead + Unpin>(
    services: &AppServices,
    presenter: &ConsolePresenter,
    console: &mut Console<R>,
    lesson: Option<LessonId>,
) -> Result<Streak, Box<dyn std::error::Error>> {
    let quiz = services.quiz();
    let delay = quiz.config().presentation_delay();
    let mut streak = Streak::default();
    let mut next = lesson;
    let mut first = true;

    loop {
        let started = match next.take() {
            Some(id) => quiz.open_lesson(id).await,
            None if first => quiz.initialize(None).await,
            None => return Ok(streak),
        };
        first = false;

        let (session, mut step) = match started {
            Ok(started) => started,
            Err(QuizEngineError::LessonNotFound(id)) => {
                println!("Урок не найден: {id}");
                next = choose_lesson(services, console).await?;
                if next.is_none() {
                    return Ok(streak);
                }
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let mut session = session.with_streak(streak);

        loop {
            match step {
                QuizStep::Question(question) => {
                    render_question(&question, session.streak());
                    let submission = loop {
                        let Some(line) = console.read_line().await? else {
                            return Ok(session.streak());
                        };
                        let submitted = parse_selection(&line, question.options.len())
                            .and_then(|selected| quiz.submit_answer(&mut session, selected));
                        match submitted {
                            Some(submission) => break submission,
                            None => println!("1–{}?", question.options.len()),
                        }
                    };
                    render_submission(&question, &submission);
                    presenter.show_pending(delay).await;

                    println!("Enter → дальше");
                    if console.read_line().await?.is_none() {
                        return Ok(session.streak());
                    }
                    step = quiz.advance(&mut session).await?;
                }
                QuizStep::Completed(summary) => {
                    render_completion(&summary);
                    presenter.show_pending(delay).await;
                    streak = session.streak();
                    println!("Вернуться к урокам");
                    break;
                }
            }
        }

        next = choose_lesson(services, console).await?;
        if next.is_none() {
            return Ok(streak);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karo_core::EngineConfig;
    use karo_core::model::{CompletionRecord, LessonCatalog};
    use std::sync::Arc;
    use storage::repository::Storage;

    #[derive(Default)]
    struct RecordingEvents {
        seen: Mutex<Vec<Milestone>>,
    }

    impl QuizEvents for RecordingEvents {
        fn milestone(&self, milestone: Milestone) {
            self.seen.lock().unwrap().push(milestone);
        }
    }

    fn id(raw: &str) -> LessonId {
        LessonId::new(raw).unwrap()
    }

    fn services_over(storage: &Storage, events: Arc<RecordingEvents>) -> AppServices {
        AppServices::new(
            storage,
            EngineConfig::default().with_presentation_delay(Duration::ZERO),
            LessonCatalog::builtin().unwrap(),
            events,
        )
    }

    /// Input answering the first option and confirming, `count` times.
    fn correct_answers(count: usize) -> String {
        "1\n\n".repeat(count)
    }

    fn scripted(input: String) -> Console<io::Cursor<Vec<u8>>> {
        Console::new(io::Cursor::new(input.into_bytes()))
    }

    #[test]
    fn selection_is_one_based_and_bounded() {
        assert_eq!(parse_selection("1", 4), Some(0));
        assert_eq!(parse_selection(" 4 ", 4), Some(3));
        assert_eq!(parse_selection("0", 4), None);
        assert_eq!(parse_selection("5", 4), None);
        assert_eq!(parse_selection("Hola", 4), None);
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
        assert_eq!(progress_bar(0.0, 4), "[----]");
    }

    #[test]
    fn presenter_queues_milestones_until_shown() {
        let presenter = ConsolePresenter::new();
        presenter.milestone(Milestone::FirstStreak);
        presenter.milestone(Milestone::LessonComplete);
        assert_eq!(
            presenter.drain(),
            vec![Milestone::FirstStreak, Milestone::LessonComplete]
        );
        assert!(presenter.drain().is_empty());
    }

    #[tokio::test]
    async fn unknown_current_lesson_falls_back_to_lesson_list() {
        let storage = Storage::in_memory();
        storage.progress.set_current_lesson(&id("404")).await.unwrap();
        let services = services_over(&storage, Arc::new(RecordingEvents::default()));

        let mut console = scripted(format!("2\n{}", correct_answers(2)));
        let streak = run_quiz(&services, &ConsolePresenter::new(), &mut console, None)
            .await
            .unwrap();

        assert_eq!(streak.value(), 2);
        assert_eq!(
            storage.progress.get_current_lesson().await.unwrap(),
            Some(id("2"))
        );
        let progress = storage.progress.get_progress().await.unwrap();
        assert_eq!(progress.get(&id("2")), Some(CompletionRecord::new(2, 2)));
    }

    #[tokio::test]
    async fn streak_carries_into_next_lesson_chosen_from_list() {
        let storage = Storage::in_memory();
        let events = Arc::new(RecordingEvents::default());
        let services = services_over(&storage, Arc::clone(&events));

        let input = format!("{}1\n{}", correct_answers(2), correct_answers(10));
        let mut console = scripted(input);
        let streak = run_quiz(&services, &ConsolePresenter::new(), &mut console, Some(id("2")))
            .await
            .unwrap();

        assert_eq!(streak.value(), 12);
        let progress = storage.progress.get_progress().await.unwrap();
        assert_eq!(progress.get(&id("2")), Some(CompletionRecord::new(2, 2)));
        assert_eq!(progress.get(&id("1")), Some(CompletionRecord::new(10, 10)));
        assert_eq!(
            storage.progress.get_current_lesson().await.unwrap(),
            Some(id("1"))
        );

        // Lesson "1" picks up at 2, so 5 and 10 land on its 3rd and 8th answers.
        let seen = events.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                Milestone::LessonComplete,
                Milestone::FirstStreak,
                Milestone::SecondStreak,
                Milestone::LessonComplete,
            ]
        );
    }

    #[tokio::test]
    async fn end_of_input_mid_lesson_stops_without_saving() {
        let storage = Storage::in_memory();
        let services = services_over(&storage, Arc::new(RecordingEvents::default()));

        let mut console = scripted(correct_answers(3));
        let streak = run_quiz(&services, &ConsolePresenter::new(), &mut console, Some(id("1")))
            .await
            .unwrap();

        assert_eq!(streak.value(), 3);
        assert!(storage.progress.get_progress().await.unwrap().is_empty());
    }
}
