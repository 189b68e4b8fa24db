//! Display preferences chosen from the settings menu.
//!
//! Preferences have no effect on the conversation; they are stored so that a
//! reload restores the same look.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A preference id that does not name any known option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownPreference {
    pub kind: &'static str,
    pub value: String,
}

/// Color theme of the chat panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Blue,
    Green,
    Purple,
    Orange,
}

impl Theme {
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Dark,
        Self::Blue,
        Self::Green,
        Self::Purple,
        Self::Orange,
    ];

    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Swatch color shown in the theme picker.
    #[must_use]
    pub const fn swatch(&self) -> &'static str {
        match self {
            Self::Default => "#f3efeb",
            Self::Dark => "#2C2C2C",
            Self::Blue => "#1E88E5",
            Self::Green => "#43A047",
            Self::Purple => "#8E24AA",
            Self::Orange => "#FB8C00",
        }
    }
}

impl FromStr for Theme {
    type Err = UnknownPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| UnknownPreference {
                kind: "theme",
                value: s.to_string(),
            })
    }
}

/// Transcript font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl FontSize {
    pub const ALL: [Self; 4] = [Self::Small, Self::Medium, Self::Large, Self::ExtraLarge];

    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::ExtraLarge => "extra-large",
        }
    }

    #[must_use]
    pub const fn pixels(&self) -> u8 {
        match self {
            Self::Small => 10,
            Self::Medium => 13,
            Self::Large => 15,
            Self::ExtraLarge => 18,
        }
    }
}

impl FromStr for FontSize {
    type Err = UnknownPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == s)
            .ok_or_else(|| UnknownPreference {
                kind: "font size",
                value: s.to_string(),
            })
    }
}

/// Size of the chat window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowSize {
    Compact,
    #[default]
    Regular,
    Expanded,
}

impl WindowSize {
    pub const ALL: [Self; 3] = [Self::Compact, Self::Regular, Self::Expanded];

    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Regular => "regular",
            Self::Expanded => "expanded",
        }
    }
}

impl FromStr for WindowSize {
    type Err = UnknownPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.id() == s)
            .ok_or_else(|| UnknownPreference {
                kind: "window size",
                value: s.to_string(),
            })
    }
}

/// All display preferences, stored under one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: FontSize,
    pub window_size: WindowSize,
}
