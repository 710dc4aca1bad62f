//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

/// Rounded timesheet report from Toggl time entries.
///
/// Groups a date range of entries by day, client, project and task, rounds
/// each group to the configured unit and prints daily and grand totals.
#[derive(Debug, Parser)]
#[command(name = "toggl-report", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Start date, default is the most recent Monday before the end date.
    #[arg(short, long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// End date, default is today.
    #[arg(short, long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Read a saved detail-report response instead of calling the service.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["start", "end"])]
    pub input: Option<PathBuf>,

    /// Path to a TOML settings file with service credentials.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Configuration file in JSON format.
    pub config: PathBuf,
}

/// Parses a `yyyy-mm-dd` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("Not a valid date: \"{value}\". Must be in format yyyy-mm-dd."))
}
