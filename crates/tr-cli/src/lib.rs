//! Toggl timesheet report CLI library.
//!
//! This crate provides the CLI interface for the report generator.

mod cli;
pub mod commands;
mod config;

pub use cli::Cli;
pub use config::{Settings, load_report_config};
