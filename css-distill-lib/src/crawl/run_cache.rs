//! Reuse of a previous run's output when nothing that shapes it has changed.

use crate::Result;
use crate::reports::RunSummary;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::IntoAppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

const LOG_TARGET: &str = " run_cache";

/// Name of the file that records a run and its cache key.
pub const SUMMARY_FILE: &str = "summary.json";

/// Hash everything that determines a run's output: the configuration, the target, and the
/// contents of the recording being replayed, if any.
pub fn compute_cache_key(config: &impl Serialize, url: &str, recording: Option<&Path>) -> Result<String> {
    let config_json = serde_json::to_string(config).into_app_err("unable to serialize configuration")?;

    let mut hasher = Xxh3::new();
    hasher.update(config_json.as_bytes());
    hasher.update(b"\0");
    hasher.update(url.as_bytes());
    if let Some(recording) = recording {
        let contents = fs::read(recording).into_app_err_with(|| format!("unable to read recording '{}'", recording.display()))?;
        hasher.update(b"\0");
        hasher.update(&contents);
    }

    Ok(format!("{:016x}", hasher.digest()))
}

/// Find a previous run in `output_dir` with the same key that finished within `ttl`.
#[must_use]
pub fn find_reusable_run(output_dir: &Path, cache_key: &str, ttl: Duration, now: DateTime<Utc>) -> Option<RunSummary> {
    let summary: RunSummary = load_with_ttl(output_dir.join(SUMMARY_FILE), ttl, |s: &RunSummary| s.finished_at, now, "previous run")?;

    if summary.cache_key != cache_key {
        log::debug!(target: LOG_TARGET, "Previous run used a different configuration or target");
        return None;
    }

    Some(summary)
}

/// Load a JSON document, or `None` when it is missing, unreadable, or older than `ttl`.
pub fn load_with_ttl<T, F>(path: impl AsRef<Path>, ttl: Duration, get_timestamp: F, now: DateTime<Utc>, context: impl AsRef<str>) -> Option<T>
where
    T: DeserializeOwned,
    F: FnOnce(&T) -> DateTime<Utc>,
{
    let path = path.as_ref();
    let ctx = context.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Cache miss for {ctx}: {e:#}");
            return None;
        }
    };

    let data = match serde_json::from_reader(BufReader::new(file)) {
        Ok(data) => data,
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Cache miss for {ctx}: {e:#}");
            return None;
        }
    };

    let age = now.signed_duration_since(get_timestamp(&data));

    // clock skew
    if age.num_seconds() < 0 {
        log::debug!(target: LOG_TARGET, "Timestamp of {ctx} is in the future, treating as fresh");
        return Some(data);
    }

    let age = age.to_std().unwrap_or(Duration::MAX);
    if age < ttl {
        log::debug!(target: LOG_TARGET, "Cache hit for {ctx} (age: {:.1} hours)", age.as_secs_f64() / 3600.0);
        Some(data)
    } else {
        log::debug!(
            target: LOG_TARGET,
            "Cache expired for {ctx} (age: {:.1} hours, TTL: {:.1} hours)",
            age.as_secs_f64() / 3600.0,
            ttl.as_secs_f64() / 3600.0
        );
        None
    }
}
