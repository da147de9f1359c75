use clap::Args;
use habitflow_core::DashboardSummary;

use super::{date_or, local_today, open_store, print_json, CliResult};

#[derive(Args)]
pub struct DashboardArgs {
    /// Day to summarize as YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,
}

pub fn run(args: DashboardArgs) -> CliResult {
    let (config, db) = open_store()?;
    let owner = config.owner();
    let today = date_or(args.date.as_deref(), local_today())?;

    let habits = db.list_habits(owner)?;
    let goals = db.list_goals(owner)?;
    let summary = DashboardSummary::compute(&habits, &goals, today, config.dashboard_limits());
    print_json(&summary)
}
