use super::{AnnotationMap, Observation, PageFetchError, PageObservations, StyleSource, StyleSourceFactory};
use crate::Result;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

const LOG_TARGET: &str = " recording";

/// How a recorded page fails when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordedFailureKind {
    Navigation,
    Timeout,
    HttpStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedFailure {
    pub kind: RecordedFailureKind,

    #[serde(default)]
    pub status: Option<u16>,

    /// Fail only the first `times` attempts; fail every attempt when absent.
    #[serde(default)]
    pub times: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPage {
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub observations: Vec<Observation>,

    #[serde(default)]
    pub annotations: AnnotationMap,

    #[serde(default)]
    pub links: Vec<String>,

    #[serde(default)]
    pub failure: Option<RecordedFailure>,
}

/// A captured set of page observations, replayed instead of visiting live pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub pages: Vec<RecordedPage>,
}

impl Recording {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).into_app_err_with(|| format!("unable to read recording '{}'", path.display()))?;
        let recording: Self = serde_json::from_str(&text).into_app_err_with(|| format!("unable to parse recording '{}'", path.display()))?;

        log::info!(target: LOG_TARGET, "Loaded recording '{}' with {} page(s)", path.display(), recording.pages.len());
        Ok(recording)
    }

    /// Page URLs in recorded order.
    #[must_use]
    pub fn page_urls(&self) -> Vec<String> {
        self.pages.iter().map(|page| page.url.clone()).collect()
    }

    fn page(&self, url: &str) -> Option<&RecordedPage> {
        self.pages.iter().find(|page| page.url == url)
    }
}

/// Hands out [`RecordedStyleSource`]s that share one recording and one attempt ledger.
#[derive(Debug, Clone)]
pub struct RecordedStyleSourceFactory {
    recording: Arc<Recording>,
    attempts: Arc<Mutex<HashMap<String, u32>>>,
}

impl RecordedStyleSourceFactory {
    #[must_use]
    pub fn new(recording: Recording) -> Self {
        Self {
            recording: Arc::new(recording),
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }
}

impl StyleSourceFactory for RecordedStyleSourceFactory {
    type Source = RecordedStyleSource;

    fn create(&self) -> Self::Source {
        RecordedStyleSource {
            recording: Arc::clone(&self.recording),
            attempts: Arc::clone(&self.attempts),
        }
    }
}

#[derive(Debug)]
pub struct RecordedStyleSource {
    recording: Arc<Recording>,
    attempts: Arc<Mutex<HashMap<String, u32>>>,
}

impl RecordedStyleSource {
    fn page(&self, url: &str) -> Result<&RecordedPage, PageFetchError> {
        self.recording.page(url).ok_or_else(|| PageFetchError::Recording {
            url: url.to_string(),
            message: "page not in recording".to_string(),
        })
    }

    fn check_failure(&self, page: &RecordedPage) -> Result<(), PageFetchError> {
        let Some(failure) = &page.failure else {
            return Ok(());
        };

        let attempt = {
            let mut attempts = self.attempts.lock().expect("lock not poisoned");
            let count = attempts.entry(page.url.clone()).or_insert(0);
            *count += 1;
            *count
        };

        if failure.times.is_some_and(|times| attempt > times) {
            return Ok(());
        }

        let url = page.url.clone();
        Err(match failure.kind {
            RecordedFailureKind::Navigation => PageFetchError::Navigation {
                url,
                message: "recorded navigation failure".to_string(),
            },
            RecordedFailureKind::Timeout => PageFetchError::Timeout { url },
            RecordedFailureKind::HttpStatus => PageFetchError::HttpStatus {
                url,
                status: failure.status.unwrap_or(500),
                retry_after: None,
            },
        })
    }
}

impl StyleSource for RecordedStyleSource {
    async fn get_computed_style_observations(&self, url: &str, properties: &[String]) -> Result<PageObservations, PageFetchError> {
        let page = self.page(url)?;
        self.check_failure(page)?;

        Ok(PageObservations {
            url: page.url.clone(),
            title: page.title.clone(),
            observations: page
                .observations
                .iter()
                .filter(|observation| properties.iter().any(|p| *p == observation.property))
                .cloned()
                .collect(),
            annotations: BTreeMap::new(),
        })
    }

    async fn get_html_annotation_context(&self, url: &str) -> Result<AnnotationMap, PageFetchError> {
        Ok(self.page(url)?.annotations.clone())
    }

    async fn get_page_links(&self, url: &str) -> Result<Vec<String>, PageFetchError> {
        Ok(self.page(url)?.links.clone())
    }
}
