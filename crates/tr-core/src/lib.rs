//! Core report engine for the time report tool.
//!
//! This crate turns raw time entries into a grouped, rounded and totalled
//! report:
//! - Label mapping: literal-or-pattern lookup for client/project/task names
//! - Rounding: snapping durations to a billable unit
//! - Aggregation: grouping by day and labels, with daily and grand totals
//! - Assembly: interleaving detail rows with their daily totals
//!
//! Everything here is synchronous and free of I/O.

pub mod aggregate;
pub mod config;
pub mod entry;
pub mod hours;
pub mod label_map;
pub mod report;
pub mod rounding;

pub use aggregate::{
    AggregatedRow, Aggregation, DailyTotal, GrandTotal, GroupKey, Totals, aggregate,
};
pub use config::{Config, ConfigError, ConfigFile};
pub use entry::{
    DateBasis, DetailItem, EntryError, RawEntry, entries_from_items, parse_detail_response,
};
pub use hours::{Hours, to_hours};
pub use label_map::LabelMap;
pub use report::{Report, ReportLine, RowKind, assemble, sum_details};
pub use rounding::DurationRounder;

