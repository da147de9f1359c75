pub mod config;
pub mod dashboard;
pub mod goal;
pub mod habit;

use chrono::{Local, NaiveDate};
use habitflow_core::{parse_day, Config, Database};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the config and database together; every data command needs both.
pub fn open_store() -> Result<(Config, Database), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    Ok((config, db))
}

/// The local calendar date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an optional `YYYY-MM-DD` argument, defaulting to `fallback`.
pub fn date_or(value: Option<&str>, fallback: NaiveDate) -> Result<NaiveDate, habitflow_core::ValidationError> {
    value.map(parse_day).transpose().map(|d| d.unwrap_or(fallback))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
