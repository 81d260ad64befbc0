use async_trait::async_trait;
use karo_core::model::{LessonId, LessonProgress, Settings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::keys;
use crate::mapping::{
    decode_current_lesson, decode_progress, decode_settings, encode_progress, encode_settings,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String key-value store with `localStorage` semantics: last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Repository contract for display settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings, filling in defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_settings(&self) -> Result<Settings, StorageError>;

    /// Persist every settings key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError>;
}

/// Repository contract for lesson progress and the last opened lesson.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load the `lessonProgress` map (empty when never written).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored JSON is malformed.
    async fn get_progress(&self) -> Result<LessonProgress, StorageError>;

    /// Replace the whole `lessonProgress` map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the map cannot be encoded or stored.
    async fn save_progress(&self, progress: &LessonProgress) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_current_lesson(&self) -> Result<Option<LessonId>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set_current_lesson(&self, id: &LessonId) -> Result<(), StorageError>;
}

/// Typed repositories layered over any `KeyValueStore`.
#[derive(Clone)]
pub struct LocalStorage {
    store: Arc<dyn KeyValueStore>,
}

impl LocalStorage {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsRepository for LocalStorage {
    async fn get_settings(&self) -> Result<Settings, StorageError> {
        let theme = self.store.get_item(keys::THEME).await?;
        let gyroscope = self.store.get_item(keys::GYROSCOPE).await?;
        let animations = self.store.get_item(keys::ANIMATIONS).await?;
        let particles = self.store.get_item(keys::PARTICLES).await?;

        Ok(decode_settings(
            theme.as_deref(),
            gyroscope.as_deref(),
            animations.as_deref(),
            particles.as_deref(),
        ))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        for (key, value) in encode_settings(settings) {
            self.store.set_item(key, value).await?;
        }
        log::debug!("saved settings: {settings:?}");
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for LocalStorage {
    async fn get_progress(&self) -> Result<LessonProgress, StorageError> {
        let raw = self.store.get_item(keys::LESSON_PROGRESS).await?;
        decode_progress(raw.as_deref())
    }

    async fn save_progress(&self, progress: &LessonProgress) -> Result<(), StorageError> {
        let raw = encode_progress(progress)?;
        self.store.set_item(keys::LESSON_PROGRESS, &raw).await?;
        log::debug!("saved lesson progress: {raw}");
        Ok(())
    }

    async fn get_current_lesson(&self) -> Result<Option<LessonId>, StorageError> {
        let raw = self.store.get_item(keys::CURRENT_LESSON).await?;
        Ok(decode_current_lesson(raw))
    }

    async fn set_current_lesson(&self, id: &LessonId) -> Result<(), StorageError> {
        self.store.set_item(keys::CURRENT_LESSON, id.as_str()).await
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub store: Arc<dyn KeyValueStore>,
    pub settings: Arc<dyn SettingsRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        let local = LocalStorage::new(Arc::clone(&store));
        let settings: Arc<dyn SettingsRepository> = Arc::new(local.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(local);
        Self {
            store,
            settings,
            progress,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karo_core::model::{CompletionRecord, Theme};

    fn id(raw: &str) -> LessonId {
        LessonId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn settings_default_when_store_is_empty() {
        let storage = Storage::in_memory();
        assert_eq!(
            storage.settings.get_settings().await.unwrap(),
            Settings::default()
        );
    }

    #[tokio::test]
    async fn settings_round_trip_through_string_keys() {
        let storage = Storage::in_memory();
        let settings = Settings::new(Theme::Dark, false, true, false);
        storage.settings.save_settings(&settings).await.unwrap();

        assert_eq!(
            storage.store.get_item(keys::THEME).await.unwrap().as_deref(),
            Some("dark")
        );
        assert_eq!(
            storage
                .store
                .get_item(keys::GYROSCOPE)
                .await
                .unwrap()
                .as_deref(),
            Some("false")
        );
        assert_eq!(storage.settings.get_settings().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn progress_overwrites_previous_value() {
        let storage = Storage::in_memory();
        let mut progress = LessonProgress::new();
        progress.record_completion(id("1"), CompletionRecord::new(4, 10));
        storage.progress.save_progress(&progress).await.unwrap();

        progress.record_completion(id("1"), CompletionRecord::finished(10));
        storage.progress.save_progress(&progress).await.unwrap();

        let loaded = storage.progress.get_progress().await.unwrap();
        assert_eq!(loaded.get(&id("1")), Some(CompletionRecord::finished(10)));
    }

    #[tokio::test]
    async fn current_lesson_round_trips() {
        let storage = Storage::in_memory();
        assert_eq!(storage.progress.get_current_lesson().await.unwrap(), None);

        storage.progress.set_current_lesson(&id("2")).await.unwrap();
        assert_eq!(
            storage.progress.get_current_lesson().await.unwrap(),
            Some(id("2"))
        );
    }

    #[tokio::test]
    async fn in_memory_store_keeps_last_write() {
        let store = InMemoryStore::new();
        assert_eq!(store.get_item("k").await.unwrap(), None);
        store.set_item("k", "v").await.unwrap();
        store.set_item("k", "w").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("w"));
    }
}
