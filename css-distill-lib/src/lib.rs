#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for css-distill
//!
//! This library consolidates all functionality for the css-distill tool, which visits the pages
//! of a website, reads the style values its elements use, and distills them into named,
//! deduplicated design tokens.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`crawl`]: Page sources, discovery, and bounded concurrent collection
//! - [`values`]: Parsing raw CSS values into canonical forms
//! - [`classify`]: Categorizing and naming canonical values
//! - [`registry`]: Deduplicating observations into tokens
//! - [`extractors`]: One extractor per token domain
//! - [`reports`]: Token files, run summary, and console output

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod classify;
#[cfg(not(any(debug_assertions, test)))]
mod classify;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod crawl;
#[cfg(not(any(debug_assertions, test)))]
mod crawl;

#[cfg(any(debug_assertions, test))]
pub mod extractors;
#[cfg(not(any(debug_assertions, test)))]
mod extractors;

#[cfg(any(debug_assertions, test))]
pub mod registry;
#[cfg(not(any(debug_assertions, test)))]
mod registry;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

#[cfg(any(debug_assertions, test))]
pub mod values;
#[cfg(not(any(debug_assertions, test)))]
mod values;

pub use crate::commands::{Host, run};
