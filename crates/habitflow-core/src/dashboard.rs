//! Daily overview aggregated from a user's habits and goals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::goal::{Goal, GoalStatus};
use crate::habit::{Habit, HabitIcon};

/// How many items the overview lists in each section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLimits {
    pub pending_habits: usize,
    pub focus_goals: usize,
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self {
            pending_habits: 3,
            focus_goals: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingHabit {
    pub id: String,
    pub name: String,
    pub icon: HabitIcon,
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusGoal {
    pub id: String,
    pub title: String,
    pub progress: u8,
}

/// Aggregated statistics for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub date: NaiveDate,
    pub total_habits: usize,
    pub habits_done_today: usize,
    /// Percentage of habits done on `date`, rounded
    pub habit_completion_rate: u32,
    /// Sum of every habit's current streak
    pub total_current_streak: u32,
    /// Highest longest-streak across habits
    pub best_streak: u32,
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub average_goal_progress: u32,
    /// Habits not yet done on `date`
    pub pending_habits: Vec<PendingHabit>,
    /// Active goals with the least progress first
    pub focus_goals: Vec<FocusGoal>,
}

/// Integer percentage of `part / whole`, rounding halves up.
fn rounded_ratio(part: u64, whole: u64, scale: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let value = (part * scale * 2 + whole) / (whole * 2);
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl DashboardSummary {
    /// Build the overview for `today` from already owner-filtered records.
    ///
    /// Input order is preserved in `pending_habits`; callers pass habits
    /// newest first.
    pub fn compute(habits: &[Habit], goals: &[Goal], today: NaiveDate, limits: DashboardLimits) -> Self {
        let habits_done_today = habits.iter().filter(|h| h.is_done_on(today)).count();
        let total_current_streak = habits.iter().map(|h| h.current_streak).sum();
        let best_streak = habits.iter().map(|h| h.longest_streak).max().unwrap_or(0);

        let pending_habits = habits
            .iter()
            .filter(|h| !h.is_done_on(today))
            .take(limits.pending_habits)
            .map(|h| PendingHabit {
                id: h.id.clone(),
                name: h.name.clone(),
                icon: h.icon,
                current_streak: h.current_streak,
            })
            .collect();

        let progress_sum: u64 = goals.iter().map(|g| u64::from(g.progress)).sum();
        let mut active: Vec<&Goal> = goals.iter().filter(|g| g.is_active()).collect();
        // Stable sort keeps input order among equal progress.
        active.sort_by_key(|g| g.progress);
        let focus_goals = active
            .iter()
            .take(limits.focus_goals)
            .map(|g| FocusGoal {
                id: g.id.clone(),
                title: g.title.clone(),
                progress: g.progress,
            })
            .collect();

        Self {
            date: today,
            total_habits: habits.len(),
            habits_done_today,
            habit_completion_rate: rounded_ratio(habits_done_today as u64, habits.len() as u64, 100),
            total_current_streak,
            best_streak,
            total_goals: goals.len(),
            active_goals: active.len(),
            completed_goals: goals
                .iter()
                .filter(|g| g.status == GoalStatus::Completed)
                .count(),
            average_goal_progress: rounded_ratio(progress_sum, goals.len() as u64, 1),
            pending_habits,
            focus_goals,
        }
    }
}
