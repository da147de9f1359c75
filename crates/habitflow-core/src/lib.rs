//! # HabitFlow Core Library
//!
//! Core logic for the HabitFlow habit and goal tracker. All operations are
//! exposed through the standalone `habitflow` CLI, which is a thin layer over
//! this crate.
//!
//! ## Architecture
//!
//! - **Streak**: pure consecutive-day streak calculation with a one-day grace
//!   window. "Today" is always an explicit argument.
//! - **Habits / Goals**: domain types and their validated partial updates
//! - **Dashboard**: daily overview aggregated from habits and goals
//! - **Storage**: SQLite persistence scoped by owner, TOML configuration
//!
//! ## Key Components
//!
//! - [`current_streak`]: the streak calculator
//! - [`Habit::toggle`]: the only mutator of a completion record
//! - [`Database`]: habit and goal persistence
//! - [`Config`]: application configuration management

pub mod dashboard;
pub mod error;
pub mod goal;
pub mod habit;
pub mod storage;
pub mod streak;

pub use dashboard::{DashboardLimits, DashboardSummary};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use goal::{Goal, GoalCategory, GoalPatch, GoalStatus};
pub use habit::{CompletionRecord, Habit, HabitColor, HabitIcon, HabitPatch, ToggleOutcome};
pub use storage::{Config, Database};
pub use streak::{current_streak, current_streak_from_strings, format_day, parse_day, StreakState};
