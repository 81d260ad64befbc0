use thiserror::Error;

use crate::model::ids::LessonId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have at least one answer option")]
    NoOptions,

    #[error("correct option {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson {id} has no questions")]
    NoQuestions { id: LessonId },

    #[error("lesson {id}, question {position}: {source}")]
    InvalidQuestion {
        id: LessonId,
        position: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Options keep their stored order; they are never shuffled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    hint: String,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are no options,
    /// or `correct_index` does not point at an option.
    pub fn new<I, S>(
        prompt: impl Into<String>,
        hint: impl Into<String>,
        options: I,
        correct_index: usize,
    ) -> Result<Self, QuestionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                len: options.len(),
            });
        }

        Ok(Self {
            prompt,
            hint: hint.into(),
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn hint(&self) -> &str {
        &self.hint
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Static lesson content: a titled, ordered list of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    title_es: String,
    questions: Vec<Question>,
}

impl Lesson {
    /// Creates a lesson from already validated questions.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NoQuestions` if `questions` is empty.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        title_es: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, LessonError> {
        if questions.is_empty() {
            return Err(LessonError::NoQuestions { id });
        }
        Ok(Self {
            id,
            title: title.into(),
            title_es: title_es.into(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    /// Title in the learner's language.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title in the language being learned.
    #[must_use]
    pub fn title_es(&self) -> &str {
        &self.title_es
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
