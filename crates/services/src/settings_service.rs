use std::sync::Arc;

use karo_core::model::Settings;
use storage::repository::SettingsRepository;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (defaults for anything missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<Settings, SettingsServiceError> {
        Ok(self.repo.get_settings().await?)
    }

    /// Persist all settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn save(&self, settings: &Settings) -> Result<(), SettingsServiceError> {
        self.repo.save_settings(settings).await?;
        Ok(())
    }

    /// Switch between light and dark.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn toggle_theme(&self) -> Result<Settings, SettingsServiceError> {
        self.update(Settings::toggle_theme).await
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn set_gyroscope(&self, enabled: bool) -> Result<Settings, SettingsServiceError> {
        self.update(|s| s.set_gyroscope(enabled)).await
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn set_animations(&self, enabled: bool) -> Result<Settings, SettingsServiceError> {
        self.update(|s| s.set_animations(enabled)).await
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn set_particles(&self, enabled: bool) -> Result<Settings, SettingsServiceError> {
        self.update(|s| s.set_particles(enabled)).await
    }

    async fn update(
        &self,
        change: impl FnOnce(&mut Settings),
    ) -> Result<Settings, SettingsServiceError> {
        let mut settings = self.load().await?;
        change(&mut settings);
        self.save(&settings).await?;
        Ok(settings)
    }
}
