use std::fmt;

const FIRST_MILESTONE: u32 = 5;
const SECOND_MILESTONE: u32 = 10;
const MILESTONE_STEP: u32 = 5;

/// A celebratory notification triggered by the streak or by finishing a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    /// Exactly 5 correct answers in a row.
    FirstStreak,
    /// Exactly 10 correct answers in a row.
    SecondStreak,
    /// Any multiple of 5 above 10.
    Streak(u32),
    /// Every question of a lesson has been answered.
    LessonComplete,
}

impl Milestone {
    /// Milestone reached by a streak of exactly `streak`, if any.
    #[must_use]
    pub fn for_streak(streak: u32) -> Option<Self> {
        match streak {
            FIRST_MILESTONE => Some(Self::FirstStreak),
            SECOND_MILESTONE => Some(Self::SecondStreak),
            n if n > SECOND_MILESTONE && n % MILESTONE_STEP == 0 => Some(Self::Streak(n)),
            _ => None,
        }
    }

    /// The streak value that triggered this milestone.
    #[must_use]
    pub fn streak(&self) -> Option<u32> {
        match self {
            Self::FirstStreak => Some(FIRST_MILESTONE),
            Self::SecondStreak => Some(SECOND_MILESTONE),
            Self::Streak(n) => Some(*n),
            Self::LessonComplete => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::FirstStreak => "¡Genial! 5 правильных ответов подряд! 🎉".to_owned(),
            Self::SecondStreak => "¡Increíble! 10 ответов подряд! Ты просто супер! 🔥".to_owned(),
            Self::Streak(n) => {
                format!("¡Fantástico! {n} ответов подряд! Каро гордится тобой! 🌟")
            }
            Self::LessonComplete => {
                "¡Excelente trabajo! Ты завершил урок! Каро очень рад! 🎊".to_owned()
            }
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Count of consecutive correct answers since the last wrong one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Streak(u32);

impl Streak {
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Count a correct answer and report the milestone it reaches.
    pub fn record_correct(&mut self) -> Option<Milestone> {
        self.0 = self.0.saturating_add(1);
        Milestone::for_streak(self.0)
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
