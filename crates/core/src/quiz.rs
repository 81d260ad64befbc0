//! Lesson attempt state machine.
//!
//! A `QuizSession` walks a lesson's questions in order. It is either
//! presenting the question at its cursor or completed. Submitting an answer
//! never moves the cursor; only `advance` does.

use std::fmt;
use std::sync::Arc;

use crate::model::{CompletionRecord, Lesson, LessonId, Milestone, Question, Streak};

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Presenting(usize),
    Completed,
}

/// A question as shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedQuestion {
    /// 1-based position in the lesson.
    pub number: usize,
    pub total: usize,
    pub prompt: String,
    pub hint: String,
    pub options: Vec<String>,
}

impl PresentedQuestion {
    fn from_question(question: &Question, cursor: usize, total: usize) -> Self {
        Self {
            number: cursor + 1,
            total,
            prompt: question.prompt().to_owned(),
            hint: question.hint().to_owned(),
            options: question.options().to_vec(),
        }
    }

    /// Fraction of the lesson reached, counting the current question.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.number as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Question(PresentedQuestion),
    Completed,
}

/// Outcome of the first answer submitted for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub streak: Streak,
    pub milestone: Option<Milestone>,
}

/// One attempt at a lesson.
pub struct QuizSession {
    lesson: Arc<Lesson>,
    cursor: usize,
    streak: Streak,
    answered: bool,
    completion_taken: bool,
}

impl QuizSession {
    /// Start an attempt at question 0 with an empty streak.
    #[must_use]
    pub fn new(lesson: Arc<Lesson>) -> Self {
        Self {
            lesson,
            cursor: 0,
            streak: Streak::default(),
            answered: false,
            completion_taken: false,
        }
    }

    /// Carry an in-memory streak over from a previous attempt.
    #[must_use]
    pub fn with_streak(mut self, streak: Streak) -> Self {
        self.streak = streak;
        self
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        self.lesson.id()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn streak(&self) -> Streak {
        self.streak
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.lesson.question_count()
    }

    /// True once an answer has been scored for the current question.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        if self.cursor >= self.lesson.question_count() {
            QuizState::Completed
        } else {
            QuizState::Presenting(self.cursor)
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state(), QuizState::Completed)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.lesson.question(self.cursor)
    }

    /// Present the question at the cursor and re-arm the answer guard.
    pub fn present(&mut self) -> Presentation {
        let Some(question) = self.lesson.question(self.cursor) else {
            return Presentation::Completed;
        };
        self.answered = false;
        Presentation::Question(PresentedQuestion::from_question(
            question,
            self.cursor,
            self.lesson.question_count(),
        ))
    }

    /// Score `selected` against the current question.
    ///
    /// Only the first submission per presented question counts; later ones
    /// return `None` and change nothing. Indices outside the options and
    /// submissions after completion are ignored the same way.
    pub fn submit(&mut self, selected: usize) -> Option<Submission> {
        if self.answered {
            return None;
        }
        let question = self.lesson.question(self.cursor)?;
        if selected >= question.options().len() {
            return None;
        }
        self.answered = true;

        let correct_index = question.correct_index();
        let is_correct = question.is_correct(selected);
        let milestone = if is_correct {
            self.streak.record_correct()
        } else {
            self.streak.reset();
            None
        };

        Some(Submission {
            selected,
            correct_index,
            is_correct,
            streak: self.streak,
            milestone,
        })
    }

    /// Move to the next question and present it.
    pub fn advance(&mut self) -> Presentation {
        if !self.is_complete() {
            self.cursor += 1;
        }
        self.present()
    }

    /// Completion record to persist, handed out once after the lesson ends.
    pub fn take_completion(&mut self) -> Option<CompletionRecord> {
        if !self.is_complete() || self.completion_taken {
            return None;
        }
        self.completion_taken = true;
        let total = u32::try_from(self.lesson.question_count()).unwrap_or(u32::MAX);
        Some(CompletionRecord::finished(total))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("lesson_id", self.lesson.id())
            .field("cursor", &self.cursor)
            .field("total", &self.lesson.question_count())
            .field("streak", &self.streak)
            .field("answered", &self.answered)
            .finish_non_exhaustive()
    }
}
