//! Watches what you work on, turns it into billable summaries and keeps client and project
//! names consistent so the same engagement never shows up twice on an invoice.
//!

pub mod cli;
pub mod daemon;
pub mod names;
pub mod utils;
pub mod wip;
