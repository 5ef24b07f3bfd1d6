//! Output of a run: one JSON file per token domain, a run summary, and a console digest.
//!
//! # Implementation Model
//!
//! Reports are produced from finalized [`DomainReport`](crate::extractors::DomainReport)s and never
//! touch the registries, so a failed write can be retried from the same data.
//!
//! - **JSON**: `<domain>.json` files holding `{ "tokens": [...], "stats": {...} }` and a
//!   `summary.json` describing the run, including the cache key later runs compare against.
//! - **Console**: a short human-readable digest with token counts per domain, problem pages, and
//!   skipped values, colored when the terminal allows it.

mod console;
mod json;
mod run_summary;
mod serialization_error;

pub use console::generate as generate_console;
pub use json::{write_domain_reports, write_summary};
pub use run_summary::RunSummary;
pub use serialization_error::SerializationError;
