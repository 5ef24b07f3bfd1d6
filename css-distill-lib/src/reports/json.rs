use super::{RunSummary, SerializationError};
use crate::crawl::SUMMARY_FILE;
use crate::extractors::DomainReport;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "   reports";

/// Write one `<domain>.json` file per report into `output_dir`, creating the directory if needed.
///
/// Returns the paths written, in report order.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_domain_reports(output_dir: &Path, reports: &[DomainReport]) -> Result<Vec<PathBuf>, SerializationError> {
    create_dir(output_dir)?;

    reports
        .iter()
        .map(|report| write_pretty(output_dir.join(report.domain.file_name()), report))
        .collect()
}

/// Write `summary.json` into `output_dir`.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be written.
pub fn write_summary(output_dir: &Path, summary: &RunSummary) -> Result<PathBuf, SerializationError> {
    create_dir(output_dir)?;
    write_pretty(output_dir.join(SUMMARY_FILE), summary)
}

fn create_dir(dir: &Path) -> Result<(), SerializationError> {
    fs::create_dir_all(dir).map_err(|source| SerializationError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_pretty(path: PathBuf, value: &impl Serialize) -> Result<PathBuf, SerializationError> {
    let mut text = match serde_json::to_string_pretty(value) {
        Ok(text) => text,
        Err(source) => return Err(SerializationError::Json { path, source }),
    };
    text.push('\n');

    if let Err(source) = fs::write(&path, text) {
        return Err(SerializationError::Io { path, source });
    }

    log::debug!(target: LOG_TARGET, "Wrote '{}'", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::{CollectionOutcome, Observation, PageObservations};
    use crate::extractors::{Domain, ExtractionSettings, ExtractorSet};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn reports() -> Vec<DomainReport> {
        let extractors = ExtractorSet::new(&ExtractionSettings::default());
        let _ = extractors.extract_page(&PageObservations {
            url: "https://x.test/".to_string(),
            title: String::new(),
            observations: vec![
                Observation::new("h1", "color", "#FF0000", "h1"),
                Observation::new("p", "margin-top", "16px", "p"),
            ],
            annotations: BTreeMap::new(),
        });
        extractors.finalize(1)
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_one_file_per_domain() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("tokens");
        let reports = reports();

        let written = write_domain_reports(&output_dir, &reports).unwrap();
        assert_eq!(written.len(), reports.len());

        let colors: serde_json::Value = serde_json::from_str(&fs::read_to_string(output_dir.join("colors.json")).unwrap()).unwrap();
        let tokens = colors["tokens"].as_array().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0]["type"], "color");
        assert_eq!(tokens[0]["usageCount"], 1);
        assert_eq!(colors["stats"]["uniqueColors"], 1);

        let spacing: serde_json::Value = serde_json::from_str(&fs::read_to_string(output_dir.join("spacing.json")).unwrap()).unwrap();
        assert_eq!(spacing["tokens"].as_array().unwrap().len(), 1);
        assert!(colors.get("domain").is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_summary_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let reports = reports();
        let now = Utc::now();
        let summary = RunSummary::new("https://x.test/", "feedface00000000", now, now, CollectionOutcome::default(), &reports);

        let path = write_summary(dir.path(), &summary).unwrap();
        assert!(path.ends_with(SUMMARY_FILE));

        let loaded: RunSummary = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(loaded, summary);
        assert_eq!(loaded.domains[&Domain::Colors.to_string()], 1);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_domain_reports(&blocker, &reports()).unwrap_err();
        assert!(matches!(err, SerializationError::Io { .. }));
    }
}
