#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod events;
pub mod progress_service;
pub mod quiz_engine;
pub mod settings_service;

pub use karo_core::EngineConfig;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressServiceError, QuizEngineError, SettingsServiceError};
pub use events::{NoopEvents, QuizEvents};
pub use progress_service::{LessonListItem, ProgressService};
pub use quiz_engine::{CompletionSummary, QuizEngine, QuizStep};
pub use settings_service::SettingsService;
