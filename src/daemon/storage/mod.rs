//!  Storage of finished summaries is organized through [summary_storage::SummaryStorageImpl].
//!  The basic idea is:
//!   - There is a directory with all the summaries.
//!   - Every UTC day gets its own file, named after the date of the windows it holds.
//!   - Each line of a file is one JSON encoded [entities::WindowSummary].

pub mod entities;
pub mod summary_storage;
