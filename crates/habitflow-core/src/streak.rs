//! Consecutive-day streak calculation.
//!
//! A streak is the run of consecutive calendar days, counted backward from
//! `today`, on which a habit was completed. The run may start at `today` or at
//! yesterday: a habit that has not been marked yet today keeps its streak
//! until the day is over.
//!
//! The calculator is pure. `today` is always passed in by the caller so the
//! result depends only on its inputs.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Wire format for completion dates.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// # Errors
/// Returns [`ValidationError::InvalidDate`] for anything else, including
/// impossible dates such as `2024-02-30`.
pub fn parse_day(value: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDate {
        value: value.to_string(),
    };
    // chrono's %Y takes a sign and unpadded fields, so the shape is checked first.
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DAY_FORMAT).map_err(|_| invalid())
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Compute the current streak for a set of completion dates.
///
/// `dates` must not contain duplicates; order does not matter.
pub fn current_streak<'a, I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let mut sorted: Vec<NaiveDate> = dates.into_iter().copied().collect();
    if sorted.is_empty() {
        return 0;
    }
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in sorted {
        let alive = match previous {
            // Grace window: the newest entry may be today or yesterday.
            None => (today - date).num_days() <= 1,
            Some(prev) => (prev - date).num_days() == 1,
        };
        if !alive {
            break;
        }
        streak += 1;
        previous = Some(date);
    }
    streak
}

/// Compute the current streak from persisted `YYYY-MM-DD` strings.
///
/// Duplicate strings are collapsed before counting.
///
/// # Errors
/// Fails on the first malformed date rather than skipping it.
pub fn current_streak_from_strings<S: AsRef<str>>(
    dates: &[S],
    today: NaiveDate,
) -> Result<u32, ValidationError> {
    let parsed = dates
        .iter()
        .map(|d| parse_day(d.as_ref()))
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(current_streak(&parsed, today))
}

/// Cached streak values stored on a habit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
}

impl StreakState {
    /// Record a freshly computed current streak. `longest` never decreases.
    pub fn advance(self, current: u32) -> Self {
        Self {
            current,
            longest: self.longest.max(current),
        }
    }
}
