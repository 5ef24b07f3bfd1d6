//! Command-line interface and orchestration for css-distill
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **extract**: Discover pages from a starting URL (or replay a recording), run every page
//!   through the domain extractors, and write the token files and run summary
//! - **init**: Generate a default configuration file
//! - **validate**: Check a configuration file for syntax and out-of-range values
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the appropriate
//! command handler. `extract` follows these steps:
//!
//! 1. Load and validate configuration, applying command-line overrides
//! 2. Compute the run's cache key and stop early if a fresh matching run exists
//! 3. Collect pages, either from a recording or by following links over HTTP
//! 4. Finalize the extractors and write the reports
//!
//! All output goes through a [`Host`] so the commands can be driven from tests.

mod common;
mod config;
mod extract;
mod host;
mod init;
mod progress_reporter;
mod run;
mod validate;

pub use common::{ColorMode, LogLevel};
pub use config::{Config, ConfigError};
pub use extract::{ExtractArgs, extract};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
