//! Tabular event roster
//!
//! This module reads the roster of scheduled events from a delimited file.
//! The file carries a header row naming the `Event name`, `Event date and time`
//! and `Weekday` columns; its text encoding is configurable so legacy exports
//! (e.g. Big5) can be read without conversion.

mod reader;
mod row;

pub use reader::*;
pub use row::*;
