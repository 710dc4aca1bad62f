//! Report command: load entries, aggregate, and print the timesheet.
//!
//! Entries come either from the Toggl detail-report API (one request series
//! per day in the range) or from a saved response file. Output is a text
//! table or JSON.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use comfy_table::presets::ASCII_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Table};
use tr_core::{Config, RawEntry, Report, ReportLine, parse_detail_response};
use tr_toggl::Client;

use crate::Settings;

const HEADER: [&str; 7] = [
    "Date", "Client", "Project", "Task", "Duration", "Rounded", "Hours",
];
const SEPARATOR_ROW: [&str; 7] = ["", "", "", "", "--------", "--------", "-----"];

/// Where report entries come from.
#[derive(Debug)]
pub enum EntrySource {
    /// A saved detail-report response.
    File(PathBuf),
    /// The live service, for `start..=end`.
    Service {
        settings: Settings,
        start: NaiveDate,
        end: NaiveDate,
    },
}

// ========== Period Resolution ==========

/// The most recent Monday strictly before `end`.
pub fn previous_monday(end: NaiveDate) -> NaiveDate {
    let mut date = end - Duration::days(1);
    while date.weekday() != Weekday::Mon {
        date -= Duration::days(1);
    }
    date
}

/// Applies the defaults for missing range bounds and checks their order.
pub fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or_else(|| previous_monday(end));
    if start > end {
        bail!("end date cannot be before start date");
    }
    Ok((start, end))
}

// ========== Entry Loading ==========

/// Loads raw entries from the given source.
pub fn load_entries(source: &EntrySource) -> Result<Vec<RawEntry>> {
    match source {
        EntrySource::File(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_detail_response(&body)
                .with_context(|| format!("failed to parse {}", path.display()))
        }
        EntrySource::Service {
            settings,
            start,
            end,
        } => {
            let (api_token, options) = settings.client_parts()?;
            let client =
                Client::new(api_token, options).context("failed to create Toggl client")?;
            tracing::debug!(?client, %start, %end, "fetching detail report");

            let runtime =
                tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
            runtime
                .block_on(client.fetch_range(*start, *end))
                .context("failed to fetch detail report")
        }
    }
}

// ========== Formatting ==========

/// Formats milliseconds as `HH:MM:SS`.
/// Sub-second remainders are truncated and hours do not wrap at 24.
pub fn format_hms(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn line_cells(line: &ReportLine) -> Vec<Cell> {
    let date = line.date.map(|d| d.format("%Y-%m-%d").to_string());
    vec![
        Cell::new(date.unwrap_or_default()),
        Cell::new(&line.client),
        Cell::new(&line.project),
        Cell::new(&line.task),
        Cell::new(format_hms(line.totals.duration_ms)).set_alignment(CellAlignment::Right),
        Cell::new(format_hms(line.totals.rounded_duration_ms))
            .set_alignment(CellAlignment::Right),
        Cell::new(line.totals.rounded_hours).set_alignment(CellAlignment::Right),
    ]
}

/// Formats the human-readable report table.
pub fn format_report(report: &Report) -> String {
    if report.is_empty() {
        return "No time entries found.\n".to_string();
    }

    let mut table = Table::new();
    table.load_preset(ASCII_FULL_CONDENSED).set_header(HEADER);

    for line in &report.rows {
        table.add_row(line_cells(line));
    }
    table.add_row(
        SEPARATOR_ROW
            .iter()
            .map(|text| Cell::new(text).set_alignment(CellAlignment::Right)),
    );
    table.add_row(line_cells(&report.grand_total_line()));

    format!("{table}\n")
}

/// Formats the report as pretty-printed JSON.
pub fn format_report_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(
    writer: &mut W,
    source: &EntrySource,
    config: &Config,
    json: bool,
) -> Result<()> {
    let entries = load_entries(source)?;
    let report = Report::build(&entries, config);
    tracing::info!(entries = entries.len(), lines = report.rows.len(), "built report");

    if json {
        writeln!(writer, "{}", format_report_json(&report)?)?;
    } else {
        write!(writer, "{}", format_report(&report))?;
    }
    Ok(())
}
