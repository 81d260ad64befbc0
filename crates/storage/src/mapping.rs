use karo_core::model::{LessonId, LessonProgress, Settings, Theme};

use crate::keys;
use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn encode_flag(enabled: bool) -> &'static str {
    if enabled { "true" } else { "false" }
}

/// Flags are on unless the stored string is exactly `"false"`.
pub(crate) fn decode_flag(raw: Option<&str>) -> bool {
    raw != Some("false")
}

pub(crate) fn decode_theme(raw: Option<&str>) -> Theme {
    match raw {
        None => Theme::default(),
        Some(value) => value.parse().unwrap_or_else(|err| {
            log::warn!("ignoring persisted theme: {err}");
            Theme::default()
        }),
    }
}

pub(crate) fn encode_settings(settings: &Settings) -> [(&'static str, &'static str); 4] {
    [
        (keys::THEME, settings.theme().as_str()),
        (keys::GYROSCOPE, encode_flag(settings.gyroscope())),
        (keys::ANIMATIONS, encode_flag(settings.animations())),
        (keys::PARTICLES, encode_flag(settings.particles())),
    ]
}

pub(crate) fn decode_settings(
    theme: Option<&str>,
    gyroscope: Option<&str>,
    animations: Option<&str>,
    particles: Option<&str>,
) -> Settings {
    Settings::new(
        decode_theme(theme),
        decode_flag(gyroscope),
        decode_flag(animations),
        decode_flag(particles),
    )
}

pub(crate) fn encode_progress(progress: &LessonProgress) -> Result<String, StorageError> {
    serde_json::to_string(progress).map_err(ser)
}

/// A missing `lessonProgress` entry reads as an empty map.
pub(crate) fn decode_progress(raw: Option<&str>) -> Result<LessonProgress, StorageError> {
    match raw {
        None => Ok(LessonProgress::new()),
        Some(value) => serde_json::from_str(value).map_err(ser),
    }
}

pub(crate) fn decode_current_lesson(raw: Option<String>) -> Option<LessonId> {
    let raw = raw?;
    match LessonId::new(raw) {
        Ok(id) => Some(id),
        Err(err) => {
            log::warn!("ignoring persisted current lesson: {err}");
            None
        }
    }
}
