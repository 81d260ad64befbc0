use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::LessonId;
use crate::model::lesson::{Lesson, LessonError, Question};

const BUILTIN_LESSONS: &str = include_str!("../../assets/lessons.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("invalid lesson catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lesson(#[from] LessonError),
}

/// Static lesson content, keyed by lesson id.
///
/// The catalog is immutable once built; lessons are looked up by the id
/// persisted under `currentLesson`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonCatalog {
    lessons: BTreeMap<LessonId, Lesson>,
}

// Wire shape of a catalog file: `{ "<id>": { title, titleEs, questions } }`.
#[derive(Deserialize)]
struct LessonEntry {
    title: String,
    #[serde(rename = "titleEs")]
    title_es: String,
    questions: Vec<QuestionEntry>,
}

#[derive(Deserialize)]
struct QuestionEntry {
    question: String,
    #[serde(default)]
    hint: String,
    answers: Vec<String>,
    correct: usize,
}

impl LessonCatalog {
    /// Build a catalog from already validated lessons. Later duplicates replace earlier ones.
    #[must_use]
    pub fn new(lessons: impl IntoIterator<Item = Lesson>) -> Self {
        Self {
            lessons: lessons
                .into_iter()
                .map(|lesson| (lesson.id().clone(), lesson))
                .collect(),
        }
    }

    /// The lessons shipped with the app ("Saludos" and "Pide un café").
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled content fails validation.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_LESSONS)
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed input and
    /// `CatalogError::Lesson` when a lesson or question violates its invariants.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let entries: BTreeMap<LessonId, LessonEntry> = serde_json::from_str(raw)?;
        let mut lessons = BTreeMap::new();

        for (id, entry) in entries {
            let questions = entry
                .questions
                .into_iter()
                .enumerate()
                .map(|(position, q)| {
                    Question::new(q.question, q.hint, q.answers, q.correct).map_err(|source| {
                        LessonError::InvalidQuestion {
                            id: id.clone(),
                            position,
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let lesson = Lesson::new(id.clone(), entry.title, entry.title_es, questions)?;
            lessons.insert(id, lesson);
        }

        Ok(Self { lessons })
    }

    #[must_use]
    pub fn get(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &LessonId) -> bool {
        self.lessons.contains_key(id)
    }

    /// Lessons in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionError;

    fn id(raw: &str) -> LessonId {
        LessonId::new(raw).unwrap()
    }

    #[test]
    fn builtin_catalog_has_both_lessons() {
        let catalog = LessonCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 2);

        let greetings = catalog.get(&id("1")).unwrap();
        assert_eq!(greetings.title_es(), "Saludos");
        assert_eq!(greetings.question_count(), 10);
        assert!(greetings.questions().iter().all(|q| q.correct_index() == 0));
        assert!(greetings.questions().iter().all(|q| q.options().len() == 4));

        let coffee = catalog.get(&id("2")).unwrap();
        assert_eq!(coffee.title(), "Закажите кофе");
        assert_eq!(coffee.question_count(), 2);
    }

    #[test]
    fn every_builtin_correct_index_is_in_range() {
        let catalog = LessonCatalog::builtin().unwrap();
        for lesson in catalog.iter() {
            for q in lesson.questions() {
                assert!(q.correct_index() < q.options().len());
            }
        }
    }

    #[test]
    fn from_json_reports_invalid_question_position() {
        let raw = r#"{
            "7": {
                "title": "t",
                "titleEs": "t",
                "questions": [
                    { "question": "ok", "hint": "", "answers": ["a"], "correct": 0 },
                    { "question": "bad", "hint": "", "answers": ["a", "b"], "correct": 5 }
                ]
            }
        }"#;

        let err = LessonCatalog::from_json(raw).unwrap_err();
        match err {
            CatalogError::Lesson(LessonError::InvalidQuestion {
                id: lesson,
                position,
                source,
            }) => {
                assert_eq!(lesson, id("7"));
                assert_eq!(position, 1);
                assert_eq!(
                    source,
                    QuestionError::CorrectIndexOutOfRange { index: 5, len: 2 }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        assert!(matches!(
            LessonCatalog::from_json("[1, 2]"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn unknown_lesson_is_absent() {
        let catalog = LessonCatalog::builtin().unwrap();
        assert!(catalog.get(&id("99")).is_none());
        assert!(!catalog.contains(&id("99")));
    }
}
