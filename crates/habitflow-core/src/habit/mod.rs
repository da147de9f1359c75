//! Habits and their completion records.
//!
//! A habit owns a [`CompletionRecord`] (the set of days it was done) and the
//! cached streak values derived from it. The record changes only through
//! [`Habit::toggle`], which recomputes the streak immediately afterwards.

mod appearance;

pub use appearance::{HabitColor, HabitIcon};

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::streak::{self, StreakState};

/// Days on which a habit was completed. One entry per calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionRecord(BTreeSet<NaiveDate>);

impl CompletionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from its persisted string form.
    ///
    /// Returns the record and the number of duplicate entries that were
    /// collapsed.
    ///
    /// # Errors
    /// Fails on the first string that is not a `YYYY-MM-DD` date.
    pub fn from_persisted<S: AsRef<str>>(dates: &[S]) -> Result<(Self, usize), ValidationError> {
        let mut set = BTreeSet::new();
        let mut duplicates = 0;
        for raw in dates {
            if !set.insert(streak::parse_day(raw.as_ref())?) {
                duplicates += 1;
            }
        }
        Ok((Self(set), duplicates))
    }

    /// Persisted form, oldest first.
    pub fn to_persisted(&self) -> Vec<String> {
        self.0.iter().copied().map(streak::format_day).collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &NaiveDate> {
        self.0.iter()
    }

    /// Add the date if absent, remove it if present.
    fn flip(&mut self, date: NaiveDate) -> ToggleOutcome {
        if self.0.remove(&date) {
            ToggleOutcome::Removed
        } else {
            self.0.insert(date);
            ToggleOutcome::Added
        }
    }
}

impl FromIterator<NaiveDate> for CompletionRecord {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CompletionRecord {
    type Item = &'a NaiveDate;
    type IntoIter = std::collections::btree_set::Iter<'a, NaiveDate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// What a toggle did to the completion record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// A recurring activity tracked by calendar-day completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier
    pub id: String,
    /// Identity of the user the habit belongs to
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub icon: HabitIcon,
    #[serde(default)]
    pub color: HabitColor,
    /// Days the habit was marked done
    #[serde(default)]
    pub completed_dates: CompletionRecord,
    /// Consecutive days ending today or yesterday
    #[serde(default)]
    pub current_streak: u32,
    /// Highest `current_streak` ever recorded
    #[serde(default)]
    pub longest_streak: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a habit's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub icon: Option<HabitIcon>,
    pub color: Option<HabitColor>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.color.is_none()
    }
}

fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            message: "name is required".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

impl Habit {
    /// Create a habit with an empty completion record.
    ///
    /// # Errors
    /// Returns a validation error if `name` is blank.
    pub fn new(
        owner: &str,
        name: &str,
        icon: HabitIcon,
        color: HabitColor,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            name: normalize_name(name)?,
            icon,
            color,
            completed_dates: CompletionRecord::new(),
            current_streak: 0,
            longest_streak: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn streak(&self) -> StreakState {
        StreakState {
            current: self.current_streak,
            longest: self.longest_streak,
        }
    }

    pub fn is_done_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(date)
    }

    /// Mark `date` done if it is not, or undo it if it is, then recompute the
    /// streak relative to `today`.
    pub fn toggle(&mut self, date: NaiveDate, today: NaiveDate) -> ToggleOutcome {
        let outcome = self.completed_dates.flip(date);
        self.refresh_streak(today);
        self.updated_at = Utc::now();
        outcome
    }

    /// Recompute `current_streak` for `today`. `longest_streak` only grows.
    pub fn refresh_streak(&mut self, today: NaiveDate) {
        let current = streak::current_streak(&self.completed_dates, today);
        let state = self.streak().advance(current);
        self.current_streak = state.current;
        self.longest_streak = state.longest;
    }

    /// Apply the fields present in `patch`.
    ///
    /// # Errors
    /// Returns a validation error if the patched name is blank; the habit is
    /// left untouched in that case.
    pub fn apply(&mut self, patch: HabitPatch) -> Result<(), ValidationError> {
        let name = patch.name.as_deref().map(normalize_name).transpose()?;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
