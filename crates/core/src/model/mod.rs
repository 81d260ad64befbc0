mod catalog;
mod ids;
mod lesson;
mod progress;
mod settings;
mod streak;

pub use catalog::{CatalogError, LessonCatalog};
pub use ids::{LessonId, LessonIdError};
pub use lesson::{Lesson, LessonError, Question, QuestionError};
pub use progress::{CompletionRecord, LessonProgress};
pub use settings::{Settings, Theme, ThemeParseError};
pub use streak::{Milestone, Streak};
