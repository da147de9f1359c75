//! Goal management commands for CLI.

use clap::Subcommand;
use habitflow_core::{parse_day, CoreError, Goal, GoalCategory, GoalPatch, GoalStatus};

use super::{open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a new goal
    Create {
        /// Goal title
        title: String,
        /// Goal description
        #[arg(long)]
        description: Option<String>,
        /// Category: Health, Career, Finance or Personal (default: Personal)
        #[arg(long, default_value = "Personal")]
        category: GoalCategory,
        /// Target date as YYYY-MM-DD
        #[arg(long)]
        target_date: Option<String>,
    },
    /// List goals, newest first
    List {
        /// Filter by status (active, completed, archived)
        #[arg(long)]
        status: Option<GoalStatus>,
    },
    /// Get goal details
    Get {
        /// Goal ID
        id: String,
    },
    /// Update a goal
    Update {
        /// Goal ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<GoalCategory>,
        /// Progress percentage, clamped to 0-100
        #[arg(long, allow_hyphen_values = true)]
        progress: Option<i64>,
        /// New target date as YYYY-MM-DD
        #[arg(long, conflicts_with = "clear_target_date")]
        target_date: Option<String>,
        /// Remove the target date
        #[arg(long)]
        clear_target_date: bool,
        /// New status
        #[arg(long)]
        status: Option<GoalStatus>,
    },
    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,
    },
}

pub fn run(action: GoalAction) -> CliResult {
    let (config, db) = open_store()?;
    let owner = config.owner();

    match action {
        GoalAction::Create {
            title,
            description,
            category,
            target_date,
        } => {
            let target_date = target_date.as_deref().map(parse_day).transpose()?;
            let goal = Goal::new(owner, &title, description, category, target_date)?;
            db.create_goal(&goal)?;
            eprintln!("Goal created: {}", goal.id);
            print_json(&goal)?;
        }
        GoalAction::List { status } => {
            let goals: Vec<_> = db
                .list_goals(owner)?
                .into_iter()
                .filter(|goal| status.map_or(true, |s| goal.status == s))
                .collect();
            print_json(&goals)?;
        }
        GoalAction::Get { id } => {
            let goal = db
                .get_goal(owner, &id)?
                .ok_or_else(|| CoreError::goal_not_found(&id))?;
            print_json(&goal)?;
        }
        GoalAction::Update {
            id,
            title,
            description,
            category,
            progress,
            target_date,
            clear_target_date,
            status,
        } => {
            let target_date = if clear_target_date {
                Some(None)
            } else {
                target_date.as_deref().map(parse_day).transpose()?.map(Some)
            };
            let patch = GoalPatch {
                title,
                description,
                category,
                progress,
                target_date,
                status,
            };
            print_json(&db.update_goal(owner, &id, patch)?)?;
        }
        GoalAction::Delete { id } => {
            db.delete_goal(owner, &id)?;
            eprintln!("Goal deleted: {id}");
        }
    }
    Ok(())
}
