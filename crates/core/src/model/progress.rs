use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ids::LessonId;

/// Completion record stored per lesson: `{"completed": n, "total": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub completed: u32,
    pub total: u32,
}

impl CompletionRecord {
    #[must_use]
    pub fn new(completed: u32, total: u32) -> Self {
        Self { completed, total }
    }

    /// Record for a lesson whose end was reached.
    ///
    /// Reaching the end counts every question as completed, whatever the
    /// answers were.
    #[must_use]
    pub fn finished(total: u32) -> Self {
        Self::new(total, total)
    }

    /// Completion percentage in `0.0..=100.0` (0 for an empty record).
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (f64::from(self.completed) / f64::from(self.total) * 100.0).min(100.0)
    }
}

/// Persisted `lessonProgress` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonProgress {
    records: BTreeMap<LessonId, CompletionRecord>,
}

impl LessonProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &LessonId) -> Option<CompletionRecord> {
        self.records.get(id).copied()
    }

    /// Overwrite rule: the new record replaces any previous one for the
    /// lesson. No merge and no best-attempt comparison.
    pub fn record_completion(&mut self, id: LessonId, record: CompletionRecord) {
        self.records.insert(id, record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LessonId, &CompletionRecord)> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
