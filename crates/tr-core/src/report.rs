//! Merging detail rows and daily totals into one presentation sequence.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{AggregatedRow, Aggregation, DailyTotal, GrandTotal, Totals, aggregate};
use crate::config::Config;
use crate::entry::RawEntry;

/// What a report line represents.
///
/// Variant order is presentation order within a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Detail,
    DailyTotal,
    GrandTotal,
}

/// One line handed to a renderer.
///
/// Total lines carry empty label strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub kind: RowKind,
    /// `None` only on the grand-total line.
    pub date: Option<NaiveDate>,
    pub client: String,
    pub project: String,
    pub task: String,
    #[serde(flatten)]
    pub totals: Totals,
}

impl ReportLine {
    pub fn detail(row: &AggregatedRow) -> Self {
        Self {
            kind: RowKind::Detail,
            date: Some(row.key.date),
            client: row.key.client.clone(),
            project: row.key.project.clone(),
            task: row.key.task.clone(),
            totals: row.totals,
        }
    }

    pub fn daily_total(day: &DailyTotal) -> Self {
        Self {
            kind: RowKind::DailyTotal,
            date: Some(day.date),
            client: String::new(),
            project: String::new(),
            task: String::new(),
            totals: day.totals,
        }
    }

    pub fn grand_total(total: &GrandTotal) -> Self {
        Self {
            kind: RowKind::GrandTotal,
            date: None,
            client: String::new(),
            project: String::new(),
            task: String::new(),
            totals: total.totals,
        }
    }
}

/// Interleaves detail rows with daily totals.
///
/// Dates ascend; within a date the detail rows come first in label order and
/// the day's total comes last.
pub fn assemble(rows: &[AggregatedRow], daily_totals: &[DailyTotal]) -> Vec<ReportLine> {
    let mut lines: Vec<ReportLine> = rows
        .iter()
        .map(ReportLine::detail)
        .chain(daily_totals.iter().map(ReportLine::daily_total))
        .collect();

    lines.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.kind.cmp(&b.kind))
            .then_with(|| {
                (&a.client, &a.project, &a.task).cmp(&(&b.client, &b.project, &b.task))
            })
    });
    lines
}

/// Sums the detail lines of an assembled sequence, skipping every total line.
pub fn sum_details(lines: &[ReportLine]) -> Totals {
    lines
        .iter()
        .filter(|line| line.kind == RowKind::Detail)
        .map(|line| &line.totals)
        .sum()
}

/// An assembled report: the interleaved lines plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportLine>,
    pub grand_total: Totals,
}

impl Report {
    /// Runs the whole pipeline over a batch of entries.
    pub fn build(entries: &[RawEntry], config: &Config) -> Self {
        Self::from_aggregation(&aggregate(entries, config))
    }

    pub fn from_aggregation(aggregation: &Aggregation) -> Self {
        Self {
            rows: assemble(&aggregation.rows, &aggregation.daily_totals),
            grand_total: aggregation.grand_total.totals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The trailing grand-total line.
    pub fn grand_total_line(&self) -> ReportLine {
        ReportLine::grand_total(&GrandTotal {
            totals: self.grand_total,
        })
    }
}
