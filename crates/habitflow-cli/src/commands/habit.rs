//! Habit management commands for CLI.

use clap::Subcommand;
use habitflow_core::{CoreError, Habit, HabitColor, HabitIcon, HabitPatch};
use serde::Serialize;

use super::{date_or, local_today, open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name
        name: String,
        /// Icon name (Flame, Heart, Zap, Target, Coffee, Book)
        #[arg(long)]
        icon: Option<HabitIcon>,
        /// Accent color as #rrggbb
        #[arg(long)]
        color: Option<HabitColor>,
    },
    /// List habits, newest first
    List,
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Update {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New icon
        #[arg(long)]
        icon: Option<HabitIcon>,
        /// New color
        #[arg(long)]
        color: Option<HabitColor>,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
    /// Mark a day done, or undo it if already done
    Toggle {
        /// Habit ID
        id: String,
        /// Day to toggle as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List available icons
    Icons,
}

#[derive(Serialize)]
struct IconEntry {
    name: &'static str,
    glyph: &'static str,
}

fn print_icons() -> CliResult {
    let icons: Vec<_> = HabitIcon::ALL
        .iter()
        .map(|icon| IconEntry {
            name: icon.name(),
            glyph: icon.glyph(),
        })
        .collect();
    print_json(&icons)
}

pub fn run(action: HabitAction) -> CliResult {
    // Listing icons needs no data directory.
    if matches!(action, HabitAction::Icons) {
        return print_icons();
    }

    let (config, mut db) = open_store()?;
    let owner = config.owner();

    match action {
        HabitAction::Create { name, icon, color } => {
            let habit = Habit::new(
                owner,
                &name,
                icon.unwrap_or(config.habits.default_icon),
                color.unwrap_or_else(|| config.habits.default_color.clone()),
            )?;
            db.create_habit(&habit)?;
            eprintln!("Habit created: {}", habit.id);
            print_json(&habit)?;
        }
        HabitAction::List => {
            print_json(&db.list_habits(owner)?)?;
        }
        HabitAction::Get { id } => {
            let habit = db
                .get_habit(owner, &id)?
                .ok_or_else(|| CoreError::habit_not_found(&id))?;
            print_json(&habit)?;
        }
        HabitAction::Update {
            id,
            name,
            icon,
            color,
        } => {
            let patch = HabitPatch { name, icon, color };
            if patch.is_empty() {
                return Err("nothing to update: pass --name, --icon or --color".into());
            }
            print_json(&db.update_habit(owner, &id, patch)?)?;
        }
        HabitAction::Delete { id } => {
            db.delete_habit(owner, &id)?;
            eprintln!("Habit deleted: {id}");
        }
        HabitAction::Toggle { id, date } => {
            let today = local_today();
            let date = date_or(date.as_deref(), today)?;
            let (habit, outcome) = db.toggle_habit(owner, &id, date, today)?;
            eprintln!(
                "{} {}: {:?}, streak {} (best {})",
                habit.icon.glyph(),
                habit.name,
                outcome,
                habit.current_streak,
                habit.longest_streak
            );
            print_json(&habit)?;
        }
        HabitAction::Icons => print_icons()?,
    }
    Ok(())
}
