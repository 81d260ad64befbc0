use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ThemeParseError {
    #[error("unknown theme: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ThemeParseError::Unknown(other.to_owned())),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing display settings.
///
/// Every visual effect is on until explicitly turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    theme: Theme,
    gyroscope: bool,
    animations: bool,
    particles: bool,
}

impl Settings {
    #[must_use]
    pub fn new(theme: Theme, gyroscope: bool, animations: bool, particles: bool) -> Self {
        Self {
            theme,
            gyroscope,
            animations,
            particles,
        }
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn gyroscope(&self) -> bool {
        self.gyroscope
    }

    #[must_use]
    pub fn animations(&self) -> bool {
        self.animations
    }

    #[must_use]
    pub fn particles(&self) -> bool {
        self.particles
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_gyroscope(&mut self, enabled: bool) {
        self.gyroscope = enabled;
    }

    pub fn set_animations(&mut self, enabled: bool) {
        self.animations = enabled;
    }

    pub fn set_particles(&mut self, enabled: bool) {
        self.particles = enabled;
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            gyroscope: true,
            animations: true,
            particles: true,
        }
    }
}
