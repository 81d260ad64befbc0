use std::sync::Arc;

use karo_core::EngineConfig;
use karo_core::model::{CompletionRecord, LessonCatalog, LessonId, Milestone, Streak};
use karo_core::quiz::{PresentedQuestion, Presentation, QuizSession, Submission};
use storage::repository::ProgressRepository;

use crate::error::QuizEngineError;
use crate::events::QuizEvents;

/// Result of finishing a lesson attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    pub lesson_id: LessonId,
    pub record: CompletionRecord,
    pub streak: Streak,
}

/// What the presentation layer should show next.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizStep {
    Question(PresentedQuestion),
    Completed(CompletionSummary),
}

/// Drives lesson attempts: catalog lookup, scoring, milestone events and
/// completion persistence.
///
/// The engine holds no per-attempt state. Each attempt is an owned
/// `QuizSession` returned by `initialize` and threaded through
/// `submit_answer` and `advance`.
#[derive(Clone)]
pub struct QuizEngine {
    config: EngineConfig,
    catalog: Arc<LessonCatalog>,
    progress: Arc<dyn ProgressRepository>,
    events: Arc<dyn QuizEvents>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        catalog: Arc<LessonCatalog>,
        progress: Arc<dyn ProgressRepository>,
        events: Arc<dyn QuizEvents>,
    ) -> Self {
        Self {
            config,
            catalog,
            progress,
            events,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &LessonCatalog {
        &self.catalog
    }

    /// The persisted `currentLesson`, or the configured default.
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::Storage` if the store cannot be read.
    pub async fn resolve_lesson_id(&self) -> Result<LessonId, QuizEngineError> {
        let persisted = self.progress.get_current_lesson().await?;
        Ok(persisted.unwrap_or_else(|| self.config.default_lesson().clone()))
    }

    /// Remember `lesson_id` as the current lesson and start an attempt at it.
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::LessonNotFound` for unknown ids (nothing is
    /// persisted in that case) and `QuizEngineError::Storage` on store failures.
    pub async fn open_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<(QuizSession, QuizStep), QuizEngineError> {
        if !self.catalog.contains(&lesson_id) {
            log::warn!("cannot open unknown lesson {lesson_id}");
            return Err(QuizEngineError::LessonNotFound(lesson_id));
        }
        self.progress.set_current_lesson(&lesson_id).await?;
        self.initialize(Some(lesson_id)).await
    }

    /// Start a new attempt with cursor and streak at zero.
    ///
    /// With no explicit id the persisted current lesson is used, falling
    /// back to the configured default.
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::LessonNotFound` if the id is not in the
    /// catalog and `QuizEngineError::Storage` on store failures.
    pub async fn initialize(
        &self,
        lesson_id: Option<LessonId>,
    ) -> Result<(QuizSession, QuizStep), QuizEngineError> {
        let lesson_id = match lesson_id {
            Some(id) => id,
            None => self.resolve_lesson_id().await?,
        };

        let Some(lesson) = self.catalog.get(&lesson_id) else {
            log::warn!("lesson {lesson_id} not found");
            return Err(QuizEngineError::LessonNotFound(lesson_id));
        };

        log::info!(
            "starting lesson {lesson_id} ({} questions)",
            lesson.question_count()
        );
        let mut session = QuizSession::new(Arc::new(lesson.clone()));
        let presentation = session.present();
        let step = self.step(&mut session, presentation).await?;
        Ok((session, step))
    }

    /// Present the question at the session cursor, completing the lesson
    /// when the cursor has run past the end.
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::Storage` if completion cannot be persisted.
    pub async fn present_question(
        &self,
        session: &mut QuizSession,
    ) -> Result<QuizStep, QuizEngineError> {
        let presentation = session.present();
        self.step(session, presentation).await
    }

    /// Score an answer for the current question.
    ///
    /// Returns `None` when the question was already answered (or the
    /// selection is not one of its options); the streak is untouched then.
    /// Reached milestones go to the event sink.
    pub fn submit_answer(&self, session: &mut QuizSession, selected: usize) -> Option<Submission> {
        let submission = session.submit(selected)?;
        if let Some(milestone) = submission.milestone {
            log::info!(
                "streak milestone in lesson {}: {}",
                session.lesson_id(),
                submission.streak
            );
            self.events.milestone(milestone);
        }
        Some(submission)
    }

    /// Move to the next question, or complete the lesson after the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::Storage` if completion cannot be persisted.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<QuizStep, QuizEngineError> {
        let presentation = session.advance();
        self.step(session, presentation).await
    }

    /// Persist `{completed: total, total}` for the session's lesson and emit
    /// the final milestone.
    ///
    /// The record replaces whatever was stored for the lesson before. Runs
    /// its side effects once per session; later calls only return the summary.
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::NotFinished` while the session still has
    /// questions to present, and `QuizEngineError::Storage` if progress cannot
    /// be read or written.
    pub async fn complete_lesson(
        &self,
        session: &mut QuizSession,
    ) -> Result<CompletionSummary, QuizEngineError> {
        if !session.is_complete() {
            return Err(QuizEngineError::NotFinished(session.lesson_id().clone()));
        }

        let total = u32::try_from(session.total_questions()).unwrap_or(u32::MAX);
        let summary = CompletionSummary {
            lesson_id: session.lesson_id().clone(),
            record: CompletionRecord::finished(total),
            streak: session.streak(),
        };

        let Some(record) = session.take_completion() else {
            return Ok(summary);
        };

        let mut progress = self.progress.get_progress().await?;
        progress.record_completion(summary.lesson_id.clone(), record);
        self.progress.save_progress(&progress).await?;
        log::info!(
            "lesson {} complete: {}/{}",
            summary.lesson_id,
            record.completed,
            record.total
        );

        self.events.milestone(Milestone::LessonComplete);
        Ok(summary)
    }

    async fn step(
        &self,
        session: &mut QuizSession,
        presentation: Presentation,
    ) -> Result<QuizStep, QuizEngineError> {
        match presentation {
            Presentation::Question(question) => Ok(QuizStep::Question(question)),
            Presentation::Completed => {
                let summary = self.complete_lesson(session).await?;
                Ok(QuizStep::Completed(summary))
            }
        }
    }
}
