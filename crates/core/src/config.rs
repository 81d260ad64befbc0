use std::time::Duration;

use crate::model::LessonId;

/// Lesson opened when nothing has been persisted under `currentLesson`.
pub const DEFAULT_LESSON_ID: &str = "1";

/// Pause before revealing the "next" control and milestone popups.
pub const DEFAULT_PRESENTATION_DELAY: Duration = Duration::from_millis(500);

/// Explicit configuration for the quiz engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    default_lesson: LessonId,
    presentation_delay: Duration,
}

impl EngineConfig {
    #[must_use]
    pub fn new(default_lesson: LessonId) -> Self {
        Self {
            default_lesson,
            presentation_delay: DEFAULT_PRESENTATION_DELAY,
        }
    }

    #[must_use]
    pub fn with_presentation_delay(mut self, delay: Duration) -> Self {
        self.presentation_delay = delay;
        self
    }

    #[must_use]
    pub fn default_lesson(&self) -> &LessonId {
        &self.default_lesson
    }

    /// Animation pacing only; scoring never waits on it.
    #[must_use]
    pub fn presentation_delay(&self) -> Duration {
        self.presentation_delay
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(LessonId::from_static(DEFAULT_LESSON_ID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_opens_lesson_one_with_half_second_delay() {
        let config = EngineConfig::default();
        assert_eq!(config.default_lesson().as_str(), "1");
        assert_eq!(config.presentation_delay(), Duration::from_millis(500));
    }

    #[test]
    fn presentation_delay_can_be_overridden() {
        let config = EngineConfig::new(LessonId::new("2").unwrap())
            .with_presentation_delay(Duration::ZERO);
        assert_eq!(config.default_lesson().as_str(), "2");
        assert_eq!(config.presentation_delay(), Duration::ZERO);
    }
}
