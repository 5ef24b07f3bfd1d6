use super::{PageFetchError, PageObservations, ProblemPage, Progress, RetryPolicy, SkippedValue, StyleSource, StyleSourceFactory, Throttler};
use crate::extractors::ExtractorSet;
use core::sync::atomic::{AtomicU64, Ordering};
use futures_util::future::join_all;
use std::sync::Arc;

const LOG_TARGET: &str = " collector";

/// What happened across the whole page set.
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    pub pages_processed: usize,
    pub problem_pages: Vec<ProblemPage>,
    pub skipped_values: Vec<SkippedValue>,

    /// Pages never started because the crawl was stopped.
    pub pages_not_started: usize,
}

enum PageOutcome {
    Processed(Vec<SkippedValue>),
    Failed(ProblemPage),
    NotStarted,
}

/// Runs every page of a crawl through the extractors, a bounded number at a time.
pub struct PageCollector<F: StyleSourceFactory> {
    factory: Arc<F>,
    throttler: Arc<Throttler>,
    retry: RetryPolicy,
    progress: Arc<dyn Progress>,
}

impl<F: StyleSourceFactory> core::fmt::Debug for PageCollector<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageCollector")
            .field("throttler", &self.throttler)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<F: StyleSourceFactory> PageCollector<F> {
    #[must_use]
    pub fn new(factory: Arc<F>, throttler: Arc<Throttler>, retry: RetryPolicy, progress: Arc<dyn Progress>) -> Self {
        Self {
            factory,
            throttler,
            retry,
            progress,
        }
    }

    /// Fetch and extract every page in `urls`.
    ///
    /// Page failures never stop the crawl; they are retried per the retry policy and then
    /// reported as problem pages.
    pub async fn collect(&self, urls: Vec<String>, extractors: &Arc<ExtractorSet>) -> CollectionOutcome {
        let total = u64::try_from(urls.len()).unwrap_or(u64::MAX);
        let completed = Arc::new(AtomicU64::new(0));
        let properties: Arc<[String]> = extractors.properties().into();

        self.progress.set_phase("Extracting");
        {
            let completed = Arc::clone(&completed);
            self.progress.set_determinate(Box::new(move || {
                let done = completed.load(Ordering::Relaxed);
                (total, done, format!("{done}/{total} pages"))
            }));
        }

        let outcomes = join_all(urls.into_iter().map(|url| {
            let factory = Arc::clone(&self.factory);
            let throttler = Arc::clone(&self.throttler);
            let retry = self.retry;
            let properties = Arc::clone(&properties);
            let extractors = Arc::clone(extractors);
            let completed = Arc::clone(&completed);

            tokio::spawn(async move {
                let outcome = process_page(&*factory, &throttler, retry, &properties, &extractors, url).await;
                _ = completed.fetch_add(1, Ordering::Relaxed);
                outcome
            })
        }))
        .await;

        self.progress.done();

        let mut result = CollectionOutcome::default();
        for outcome in outcomes.into_iter().map(|task_result| task_result.expect("tasks must not panic")) {
            match outcome {
                PageOutcome::Processed(skipped) => {
                    result.pages_processed += 1;
                    result.skipped_values.extend(skipped);
                }
                PageOutcome::Failed(problem) => result.problem_pages.push(problem),
                PageOutcome::NotStarted => result.pages_not_started += 1,
            }
        }

        result.problem_pages.sort_by(|a, b| a.url.cmp(&b.url));
        result.skipped_values.sort();

        if result.pages_not_started > 0 {
            log::warn!(target: LOG_TARGET, "{} page(s) were not processed because the crawl was stopped", result.pages_not_started);
        }

        log::info!(
            target: LOG_TARGET,
            "Processed {} page(s), {} problem page(s), {} skipped value(s)",
            result.pages_processed,
            result.problem_pages.len(),
            result.skipped_values.len()
        );

        result
    }
}

async fn process_page<F: StyleSourceFactory>(
    factory: &F,
    throttler: &Arc<Throttler>,
    retry: RetryPolicy,
    properties: &[String],
    extractors: &ExtractorSet,
    url: String,
) -> PageOutcome {
    let Some(_permit) = throttler.acquire().await else {
        return PageOutcome::NotStarted;
    };

    let page_url = url.as_str();
    let outcome = retry
        .execute(
            move |attempt| {
                let source = factory.create();
                async move {
                    log::debug!(target: LOG_TARGET, "Opening '{page_url}' (attempt {attempt})");
                    fetch_page(&source, page_url, properties).await
                }
            },
            |delay| {
                if throttler.pause_for(delay) {
                    log::info!(target: LOG_TARGET, "Server asked to slow down; pausing new pages for {}ms", delay.as_millis());
                }
            },
        )
        .await;

    match outcome.result {
        Ok(page) => PageOutcome::Processed(extractors.extract_page(&page)),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Giving up on '{url}' after {} attempt(s): {e}", outcome.attempts);
            PageOutcome::Failed(ProblemPage::from_error(&url, &e, outcome.attempts))
        }
    }
}

async fn fetch_page(source: &impl StyleSource, url: &str, properties: &[String]) -> Result<PageObservations, PageFetchError> {
    let mut page = source.get_computed_style_observations(url, properties).await?;

    // annotations are optional
    match source.get_html_annotation_context(url).await {
        Ok(annotations) => page.annotations = annotations,
        Err(e) => log::debug!(target: LOG_TARGET, "No annotations for '{url}': {e}"),
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::{Backoff, RecordedStyleSourceFactory, Recording, SilentProgress};
    use crate::extractors::ExtractionSettings;
    use core::time::Duration;

    fn recording() -> Recording {
        serde_json::from_str(
            r##"{
                "pages": [
                    {
                        "url": "https://site.test/",
                        "observations": [
                            { "selector": "p", "property": "color", "rawValue": "#333333", "elementTag": "p" },
                            { "selector": "div", "property": "color", "rawValue": "bogus", "elementTag": "div" }
                        ]
                    },
                    {
                        "url": "https://site.test/flaky",
                        "observations": [
                            { "selector": "p", "property": "color", "rawValue": "#333333", "elementTag": "p" }
                        ],
                        "failure": { "kind": "timeout", "times": 1 }
                    },
                    {
                        "url": "https://site.test/gone",
                        "failure": { "kind": "http-status", "status": 404 }
                    }
                ]
            }"##,
        )
        .unwrap()
    }

    fn collector(factory: RecordedStyleSourceFactory, throttler: Arc<Throttler>) -> PageCollector<RecordedStyleSourceFactory> {
        PageCollector::new(
            Arc::new(factory),
            throttler,
            RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
                backoff: Backoff::Fixed,
            },
            Arc::new(SilentProgress),
        )
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn test_problem_pages_do_not_abort() {
        let recording = recording();
        let urls = recording.page_urls();
        let collector = collector(RecordedStyleSourceFactory::new(recording), Throttler::new(2));
        let extractors = Arc::new(ExtractorSet::new(&ExtractionSettings::default()));

        let outcome = collector.collect(urls, &extractors).await;

        assert_eq!(outcome.pages_processed, 2);
        assert_eq!(outcome.problem_pages.len(), 1);

        let problem = &outcome.problem_pages[0];
        assert_eq!(problem.url, "https://site.test/gone");
        assert_eq!(problem.error_kind, "http-status");
        assert_eq!(problem.attempts, 1);

        assert_eq!(outcome.skipped_values.len(), 1);
        assert_eq!(outcome.skipped_values[0].raw_value, "bogus");

        let reports = extractors.finalize(1);
        let colors = reports.iter().find(|r| r.domain == crate::extractors::Domain::Colors).unwrap();
        assert_eq!(colors.tokens.len(), 1);
        assert_eq!(colors.tokens[0].usage_count, 2);
        assert_eq!(colors.tokens[0].source_urls.len(), 2);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort on Windows")]
    async fn test_aborted_crawl_starts_nothing() {
        let recording = recording();
        let urls = recording.page_urls();
        let throttler = Throttler::new(1);
        throttler.abort();

        let collector = collector(RecordedStyleSourceFactory::new(recording), throttler);
        let extractors = Arc::new(ExtractorSet::new(&ExtractionSettings::default()));
        let outcome = collector.collect(urls, &extractors).await;

        assert_eq!(outcome.pages_processed, 0);
        assert_eq!(outcome.pages_not_started, 3);
        assert!(outcome.problem_pages.is_empty());
    }
}
