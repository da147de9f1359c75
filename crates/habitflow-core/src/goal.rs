//! Long-running goals with manual progress tracking.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Area of life a goal belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GoalCategory {
    Health,
    Career,
    Finance,
    #[default]
    Personal,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Health => "Health",
            GoalCategory::Career => "Career",
            GoalCategory::Finance => "Finance",
            GoalCategory::Personal => "Personal",
        }
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" => Ok(GoalCategory::Health),
            "career" => Ok(GoalCategory::Career),
            "finance" => Ok(GoalCategory::Finance),
            "personal" => Ok(GoalCategory::Personal),
            _ => Err(ValidationError::InvalidValue {
                field: "category".to_string(),
                message: format!("'{s}' is not one of Health, Career, Finance, Personal"),
            }),
        }
    }
}

/// Lifecycle state of a goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "archived" => Ok(GoalStatus::Archived),
            _ => Err(ValidationError::InvalidValue {
                field: "status".to_string(),
                message: format!("'{s}' is not one of active, completed, archived"),
            }),
        }
    }
}

/// A goal with a percentage progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub category: GoalCategory,
    /// Percent complete, always within 0..=100
    #[serde(default)]
    pub progress: u8,
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a goal.
///
/// `target_date: Some(None)` clears the date; `None` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<GoalCategory>,
    pub progress: Option<i64>,
    pub target_date: Option<Option<NaiveDate>>,
    pub status: Option<GoalStatus>,
}

fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "title".to_string(),
            message: "title is required".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Clamp an arbitrary progress value into 0..=100.
pub fn clamp_progress(value: i64) -> u8 {
    // Lossless: the clamp bounds the value to the u8 range.
    value.clamp(0, 100) as u8
}

impl Goal {
    /// Create an active goal with zero progress.
    ///
    /// # Errors
    /// Returns a validation error if `title` is blank.
    pub fn new(
        owner: &str,
        title: &str,
        description: Option<String>,
        category: GoalCategory,
        target_date: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            title: normalize_title(title)?,
            description: description.filter(|d| !d.trim().is_empty()),
            category,
            progress: 0,
            target_date,
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply the fields present in `patch`.
    ///
    /// # Errors
    /// Returns a validation error if the patched title is blank; the goal is
    /// left untouched in that case.
    pub fn apply(&mut self, patch: GoalPatch) -> Result<(), ValidationError> {
        let title = patch.title.as_deref().map(normalize_title).transpose()?;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(progress) = patch.progress {
            self.progress = clamp_progress(progress);
        }
        if let Some(target_date) = patch.target_date {
            self.target_date = target_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }
}
