//! Command implementations.

pub mod report;
