//! Getting observations off pages: style sources, page discovery, and bounded concurrent collection.
//!
//! # Implementation Model
//!
//! A [`StyleSource`] opens one page and reports the property values its elements use. Sources
//! are created per attempt by a [`StyleSourceFactory`], so a retried page always starts from a
//! clean slate. Two sources exist: [`RecordedStyleSource`] replays a JSON recording and
//! [`HttpStyleSource`] fetches markup over HTTP and reads declared styles from it.
//!
//! The [`PageCollector`] spawns one task per page. Each task waits on the shared [`Throttler`]
//! for a slot, runs its attempts under the [`RetryPolicy`], and hands the resulting
//! [`PageObservations`] to the extractors. A page that still fails becomes a [`ProblemPage`];
//! it never stops the crawl.

mod collector;
mod discovery;
mod http_source;
mod observation;
mod page_fetch_error;
mod problem_page;
mod progress;
mod recorded_source;
mod retry_policy;
mod run_cache;
mod style_source;
mod throttler;

pub use collector::{CollectionOutcome, PageCollector};
pub use discovery::{UrlFilter, discover_pages};
pub use http_source::{HttpStyleSource, HttpStyleSourceFactory};
pub use observation::{AnnotationMap, Observation, PageObservations};
pub use page_fetch_error::{PageFetchError, PageFetchErrorKind};
pub use problem_page::{ProblemPage, SkippedValue};
pub use progress::{Progress, SilentProgress};
pub use recorded_source::{RecordedFailure, RecordedFailureKind, RecordedPage, RecordedStyleSource, RecordedStyleSourceFactory, Recording};
pub use retry_policy::{Backoff, RetryOutcome, RetryPolicy};
pub use run_cache::{SUMMARY_FILE, compute_cache_key, find_reusable_run};
pub use style_source::{StyleSource, StyleSourceFactory};
pub use throttler::Throttler;
