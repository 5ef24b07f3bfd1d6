use super::common::{ColorMode, LogLevel, init_logging};
use super::config::Config;
use super::{Host, ProgressReporter};
use crate::Result;
use crate::crawl::{
    CollectionOutcome, HttpStyleSourceFactory, PageCollector, Progress, RecordedStyleSourceFactory, Recording, SilentProgress,
    StyleSourceFactory, Throttler, UrlFilter, compute_cache_key, discover_pages, find_reusable_run,
};
use crate::extractors::{DomainReport, ExtractorSet};
use crate::reports::{RunSummary, generate_console, write_domain_reports, write_summary};
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::Parser;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::io::Write;
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "   extract";

/// How long a single page request may take.
const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Starting URL of the site to extract tokens from (optional with --recording)
    #[arg(value_name = "URL", required_unless_present = "recording")]
    pub url: Option<String>,

    /// Path to configuration file (default is `css-distill.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory where the token files and run summary are written
    #[arg(long, short = 'o', value_name = "PATH", default_value = "design-tokens")]
    pub output_dir: Utf8PathBuf,

    /// Replay page observations from a recording file instead of fetching pages
    #[arg(long, value_name = "PATH")]
    pub recording: Option<Utf8PathBuf>,

    /// Maximum number of pages to process (overrides the configuration)
    #[arg(long, value_name = "COUNT")]
    pub max_pages: Option<usize>,

    /// Number of pages processed at the same time (overrides the configuration)
    #[arg(long, value_name = "COUNT")]
    pub concurrency: Option<usize>,

    /// Run the extraction even if a recent run with the same inputs exists
    #[arg(long)]
    pub ignore_cached: bool,

    /// Suppress the console summary and progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

/// Crawl a site (or replay a recording), extract its design tokens, and write the reports.
///
/// # Errors
///
/// Returns an error if the configuration or recording cannot be loaded or the reports cannot be
/// written. Individual page failures are not errors; they are listed in the run summary.
pub async fn extract<H: Host>(host: &mut H, args: &ExtractArgs) -> Result<()> {
    init_logging(args.log_level);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(max_pages) = args.max_pages {
        config.max_pages = max_pages;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    config.validate()?;

    let recording = args.recording.as_ref().map(Recording::load).transpose()?;

    let url = match (&args.url, &recording) {
        (Some(url), _) => url.clone(),
        (None, Some(recording)) => match recording.pages.first() {
            Some(page) => page.url.clone(),
            None => bail!("the recording contains no pages"),
        },
        (None, None) => bail!("a URL is required unless --recording is given"),
    };

    let pages = match recording {
        Some(recording) => Pages::Recorded(recording),
        None => Pages::Live {
            seed: Url::parse(&url).into_app_err_with(|| format!("'{url}' is not a valid URL"))?,
            factory: HttpStyleSourceFactory::new(PAGE_TIMEOUT)?,
        },
    };

    let output_dir = args.output_dir.as_std_path();
    let cache_key = compute_cache_key(&config, &url, args.recording.as_deref().map(camino::Utf8Path::as_std_path))?;
    let use_colors = args.color.use_colors(&std::io::stdout());

    if !args.ignore_cached
        && let Some(summary) = find_reusable_run(output_dir, &cache_key, config.cache_ttl(), Utc::now())
    {
        log::info!(target: LOG_TARGET, "Reusing output in '{}' from the run finished at {}", args.output_dir, summary.finished_at);
        if !args.quiet {
            let _ = writeln!(
                host.output(),
                "Output in '{}' is up to date (run finished at {}); use --ignore-cached to extract again",
                args.output_dir,
                summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            print_summary(host, &summary, &[], use_colors);
        }
        return Ok(());
    }

    let started_at = Utc::now();
    let progress: Arc<dyn Progress> = if args.quiet {
        Arc::new(SilentProgress)
    } else {
        let delay = if args.log_level == LogLevel::None {
            Duration::from_millis(300)
        } else {
            Duration::from_hours(365 * 24)
        };
        Arc::new(ProgressReporter::new(delay, args.color.use_colors(&std::io::stderr())))
    };

    let throttler = Throttler::new(config.concurrency);
    let ctrl_c = {
        let throttler = Arc::clone(&throttler);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!(target: LOG_TARGET, "Interrupted; finishing pages already started");
                throttler.abort();
            }
        })
    };

    let extractors = Arc::new(ExtractorSet::new(&config.extraction_settings()));
    let collection = Collection {
        config: &config,
        throttler,
        progress: Arc::clone(&progress),
        extractors: &extractors,
    };

    let outcome = match pages {
        Pages::Recorded(recording) => {
            let mut urls = recording.page_urls();
            urls.truncate(config.max_pages);
            collection.run(RecordedStyleSourceFactory::new(recording), urls).await
        }
        Pages::Live { seed, factory } => {
            let urls = discover(&factory, &seed, &config, &*progress).await;
            collection.run(factory, urls).await
        }
    };

    ctrl_c.abort();

    let reports = extractors.finalize(config.minimum_occurrences);
    let written = write_domain_reports(output_dir, &reports).into_app_err_with(|| format!("writing token files to '{}'", args.output_dir))?;

    let summary = RunSummary::new(url, cache_key, started_at, Utc::now(), outcome, &reports);
    let _ = write_summary(output_dir, &summary).into_app_err_with(|| format!("writing run summary to '{}'", args.output_dir))?;

    log::info!(target: LOG_TARGET, "Wrote {} token file(s) to '{}'", written.len(), args.output_dir);

    if !args.quiet {
        print_summary(host, &summary, &reports, use_colors);
    }

    Ok(())
}

/// Where the pages of a run come from.
enum Pages {
    Recorded(Recording),
    Live { seed: Url, factory: HttpStyleSourceFactory },
}

/// The pieces shared by both page sources.
struct Collection<'a> {
    config: &'a Config,
    throttler: Arc<Throttler>,
    progress: Arc<dyn Progress>,
    extractors: &'a Arc<ExtractorSet>,
}

impl Collection<'_> {
    async fn run<F: StyleSourceFactory>(self, factory: F, urls: Vec<String>) -> CollectionOutcome {
        let collector = PageCollector::new(Arc::new(factory), self.throttler, self.config.retry_policy(), self.progress);
        collector.collect(urls, self.extractors).await
    }
}

async fn discover(factory: &HttpStyleSourceFactory, seed: &Url, config: &Config, progress: &dyn Progress) -> Vec<String> {
    progress.set_phase("Discovering");
    progress.set_indeterminate(Box::new(|| "following links".to_string()));

    let filter = UrlFilter::new(Vec::new(), config.exclude_url_patterns.iter().cloned());
    let urls = discover_pages(&factory.create(), seed, config.max_pages, &filter).await;

    log::info!(target: LOG_TARGET, "Discovered {} page(s) from '{seed}'", urls.len());
    urls
}

fn print_summary<H: Host>(host: &mut H, summary: &RunSummary, reports: &[DomainReport], use_colors: bool) {
    let mut console_output = String::new();
    _ = generate_console(summary, reports, use_colors, &mut console_output);
    let _ = write!(host.output(), "{console_output}");
}
