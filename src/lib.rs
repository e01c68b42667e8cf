//! tally: a personal day-count tracker.
//!
//! Loads a JSON list of dated records, filters, sorts and pages them, and
//! shows a live counter of whole days since a configured start instant,
//! either in the terminal or through an embedded web dashboard.

pub mod activity;
pub mod cli;
pub mod config;
pub mod counter;
pub mod datetime;
pub mod filter;
pub mod pagination;
pub mod records;
pub mod session;
pub mod stats;
pub mod table;
pub mod web;
