use std::sync::Arc;

use karo_core::EngineConfig;
use karo_core::model::LessonCatalog;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::events::QuizEvents;
use crate::progress_service::ProgressService;
use crate::quiz_engine::QuizEngine;
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizEngine>,
    progress: Arc<ProgressService>,
    settings: Arc<SettingsService>,
}

impl AppServices {
    /// Build services over an already opened storage.
    #[must_use]
    pub fn new(
        storage: &Storage,
        config: EngineConfig,
        catalog: LessonCatalog,
        events: Arc<dyn QuizEvents>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let quiz = Arc::new(QuizEngine::new(
            config,
            Arc::clone(&catalog),
            Arc::clone(&storage.progress),
            events,
        ));
        let progress = Arc::new(ProgressService::new(
            catalog,
            Arc::clone(&storage.progress),
        ));
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));

        Self {
            quiz,
            progress,
            settings,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: EngineConfig,
        catalog: LessonCatalog,
        events: Arc<dyn QuizEvents>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, config, catalog, events))
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizEngine> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }
}
