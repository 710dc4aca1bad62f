//! Grouping entries into report rows.
//!
//! # Algorithm Summary
//!
//! 1. Each entry gets a [`GroupKey`]: its calendar day plus the mapped
//!    client, project and task labels.
//! 2. Durations are summed per key. Keys are kept ordered, so rows come out
//!    sorted by date, then client, project and task.
//! 3. Each row's summed duration is rounded and converted to hours.
//! 4. Daily totals and the grand total add up the already-rounded row
//!    values. Neither is rounded again, and the grand total is taken over
//!    rows only so daily totals are never counted twice.

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::Add;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Config;
use crate::entry::RawEntry;
use crate::hours::{Hours, to_hours};
use crate::rounding::DurationRounder;

/// Identity of one report row.
///
/// Field order defines row order: date first, then the three labels
/// compared byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub date: NaiveDate,
    pub client: String,
    pub project: String,
    pub task: String,
}

/// Raw, rounded and hour totals for a row or a group of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub duration_ms: u64,
    pub rounded_duration_ms: u64,
    pub rounded_hours: Hours,
}

impl Totals {
    /// Rounds a summed duration and derives its hours.
    pub fn rounded(duration_ms: u64, rounder: &DurationRounder) -> Self {
        let rounded_duration_ms = rounder.round(duration_ms);
        Self {
            duration_ms,
            rounded_duration_ms,
            rounded_hours: to_hours(rounded_duration_ms),
        }
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            duration_ms: self.duration_ms.saturating_add(rhs.duration_ms),
            rounded_duration_ms: self
                .rounded_duration_ms
                .saturating_add(rhs.rounded_duration_ms),
            rounded_hours: self.rounded_hours + rhs.rounded_hours,
        }
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Totals> for Totals {
    fn sum<I: Iterator<Item = &'a Totals>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// One row per distinct [`GroupKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRow {
    pub key: GroupKey,
    pub totals: Totals,
}

/// Sum of all rows sharing a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub totals: Totals,
}

/// Sum of all rows in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrandTotal {
    pub totals: Totals,
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Sorted by [`GroupKey`].
    pub rows: Vec<AggregatedRow>,
    /// One per distinct date, ascending.
    pub daily_totals: Vec<DailyTotal>,
    pub grand_total: GrandTotal,
}

/// Groups, sums, rounds and totals a batch of entries.
pub fn aggregate(entries: &[RawEntry], config: &Config) -> Aggregation {
    let mut groups: BTreeMap<GroupKey, u64> = BTreeMap::new();

    for entry in entries {
        let key = GroupKey {
            date: entry.date(config.date_basis),
            client: config.client_map.resolve(&entry.client).to_string(),
            project: config.project_map.resolve(&entry.project).to_string(),
            task: config.task_map.resolve(&entry.description).to_string(),
        };
        let sum = groups.entry(key).or_default();
        *sum = sum.saturating_add(entry.duration_ms);
    }

    let rows: Vec<AggregatedRow> = groups
        .into_iter()
        .map(|(key, duration_ms)| AggregatedRow {
            key,
            totals: Totals::rounded(duration_ms, &config.rounder),
        })
        .collect();

    let daily_totals = daily_totals(&rows);
    let grand_total = grand_total(&rows);

    tracing::debug!(
        entries = entries.len(),
        rows = rows.len(),
        days = daily_totals.len(),
        "aggregated entries"
    );

    Aggregation {
        rows,
        daily_totals,
        grand_total,
    }
}

/// Sums rows per date. `rows` must be sorted by date.
pub fn daily_totals(rows: &[AggregatedRow]) -> Vec<DailyTotal> {
    rows.chunk_by(|a, b| a.key.date == b.key.date)
        .map(|day| DailyTotal {
            date: day[0].key.date,
            totals: day.iter().map(|row| &row.totals).sum(),
        })
        .collect()
}

/// Sums all rows.
pub fn grand_total(rows: &[AggregatedRow]) -> GrandTotal {
    GrandTotal {
        totals: rows.iter().map(|row| &row.totals).sum(),
    }
}
