//! Keys of the local key-value store.
//!
//! These match the browser `localStorage` keys so a store exported from the
//! web page can be read as-is.

pub const THEME: &str = "theme";
pub const GYROSCOPE: &str = "gyroscope";
pub const ANIMATIONS: &str = "animations";
pub const PARTICLES: &str = "particles";
pub const CURRENT_LESSON: &str = "currentLesson";
pub const LESSON_PROGRESS: &str = "lessonProgress";
