//! Display attributes of a habit: icon and accent color.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Icon shown next to a habit.
///
/// Serialized by name; deserialization shares the case-insensitive `FromStr`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String", into = "String")]
pub enum HabitIcon {
    #[default]
    Flame,
    Heart,
    Zap,
    Target,
    Coffee,
    Book,
}

impl HabitIcon {
    pub const ALL: [HabitIcon; 6] = [
        HabitIcon::Flame,
        HabitIcon::Heart,
        HabitIcon::Zap,
        HabitIcon::Target,
        HabitIcon::Coffee,
        HabitIcon::Book,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HabitIcon::Flame => "Flame",
            HabitIcon::Heart => "Heart",
            HabitIcon::Zap => "Zap",
            HabitIcon::Target => "Target",
            HabitIcon::Coffee => "Coffee",
            HabitIcon::Book => "Book",
        }
    }

    /// Terminal-friendly glyph for the icon.
    pub fn glyph(&self) -> &'static str {
        match self {
            HabitIcon::Flame => "🔥",
            HabitIcon::Heart => "❤️",
            HabitIcon::Zap => "⚡",
            HabitIcon::Target => "🎯",
            HabitIcon::Coffee => "☕",
            HabitIcon::Book => "📚",
        }
    }
}

impl fmt::Display for HabitIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HabitIcon {
    type Err = ValidationError;

    /// Case-insensitive lookup by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HabitIcon::ALL
            .into_iter()
            .find(|icon| icon.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownIcon(s.to_string()))
    }
}

impl TryFrom<String> for HabitIcon {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HabitIcon> for String {
    fn from(icon: HabitIcon) -> Self {
        icon.name().to_string()
    }
}

/// A `#rrggbb` accent color, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HabitColor(String);

impl HabitColor {
    /// Colors offered by the habit form.
    pub const PALETTE: [&'static str; 8] = [
        "#6366f1", "#8b5cf6", "#ec4899", "#ef4444", "#f59e0b", "#10b981", "#06b6d4", "#6b7280",
    ];

    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let valid = trimmed.len() == 7
            && trimmed.starts_with('#')
            && trimmed.chars().skip(1).all(|c| c.is_ascii_hexdigit());
        if valid {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(ValidationError::InvalidColor(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_palette(&self) -> bool {
        Self::PALETTE.contains(&self.0.as_str())
    }
}

impl Default for HabitColor {
    fn default() -> Self {
        Self(Self::PALETTE[0].to_string())
    }
}

impl fmt::Display for HabitColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HabitColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HabitColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<HabitColor> for String {
    fn from(color: HabitColor) -> Self {
        color.0
    }
}
