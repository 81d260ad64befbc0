use std::sync::Arc;

use karo_core::model::{CompletionRecord, LessonCatalog, LessonId};
use storage::repository::ProgressRepository;

use crate::error::ProgressServiceError;

/// Presentation-agnostic row of the lesson list.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonListItem {
    pub id: LessonId,
    pub title: String,
    pub title_es: String,
    pub question_count: usize,
    pub record: Option<CompletionRecord>,
}

impl LessonListItem {
    /// Completion percentage shown on the lesson card (0 when never completed).
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.record.map_or(0.0, |record| record.percentage())
    }
}

/// Lesson list with persisted completion, for the landing page.
#[derive(Clone)]
pub struct ProgressService {
    catalog: Arc<LessonCatalog>,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(catalog: Arc<LessonCatalog>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { catalog, progress }
    }

    /// Every catalog lesson with its completion record, in id order.
    ///
    /// Records for lessons missing from the catalog are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if progress cannot be read.
    pub async fn lesson_list(&self) -> Result<Vec<LessonListItem>, ProgressServiceError> {
        let progress = self.progress.get_progress().await?;
        Ok(self
            .catalog
            .iter()
            .map(|lesson| LessonListItem {
                id: lesson.id().clone(),
                title: lesson.title().to_owned(),
                title_es: lesson.title_es().to_owned(),
                question_count: lesson.question_count(),
                record: progress.get(lesson.id()),
            })
            .collect())
    }
}
