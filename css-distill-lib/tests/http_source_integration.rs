//! Integration tests for the HTTP style source using wiremock

use core::time::Duration;
use css_distill_lib::crawl::{
    Backoff, HttpStyleSourceFactory, PageCollector, RetryPolicy, SilentProgress, StyleSource, StyleSourceFactory, Throttler, UrlFilter,
    discover_pages,
};
use css_distill_lib::extractors::{Domain, ExtractionSettings, ExtractorSet};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME: &str = r#"
<html>
<head>
    <title>Home</title>
    <style>
        .title { color: #ff0000; font-family: Inter, sans-serif; font-size: 32px; }
        .lead { color: rgb(255, 0, 0); margin-bottom: 16px; }
    </style>
</head>
<body>
    <h1 class="title">Welcome</h1>
    <p class="lead">Intro</p>
    <!-- component: card -->
    <div class="card" style="border-radius: 8px; background-color: #ffffff">Card</div>
    <a href="/about">About</a>
    <a href="/admin/settings">Admin</a>
</body>
</html>
"#;

const ABOUT: &str = r#"
<html>
<body>
    <span style="color: red">Tag</span>
    <a href="/">Home</a>
</body>
</html>
"#;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        backoff: Backoff::Fixed,
    }
}

async fn site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/")).respond_with(html(HOME)).mount(&server).await;
    Mock::given(method("GET")).and(path("/about")).respond_with(html(ABOUT)).mount(&server).await;
    server
}

#[tokio::test]
async fn test_discover_and_extract() {
    let server = site().await;
    let seed = Url::parse(&server.uri()).expect("valid URL");
    let factory = HttpStyleSourceFactory::new(Duration::from_secs(5)).expect("client");

    let filter = UrlFilter::new(Vec::new(), vec!["/admin".to_string()]);
    let urls = discover_pages(&factory.create(), &seed, 10, &filter).await;
    assert_eq!(urls.len(), 2, "{urls:?}");
    assert!(urls[1].ends_with("/about"));

    let extractors = Arc::new(ExtractorSet::new(&ExtractionSettings::default()));
    let collector = PageCollector::new(Arc::new(factory), Throttler::new(2), policy(), Arc::new(SilentProgress));
    let outcome = collector.collect(urls, &extractors).await;

    assert_eq!(outcome.pages_processed, 2);
    assert!(outcome.problem_pages.is_empty());

    let reports = extractors.finalize(1);
    let colors = reports.iter().find(|r| r.domain == Domain::Colors).expect("colors");
    let red = colors.tokens.iter().find(|t| t.usage_count == 3).expect("merged red");
    assert_eq!(red.source_urls.len(), 2);

    let components = reports.iter().find(|r| r.domain == Domain::Components).expect("components");
    assert!(components.tokens.iter().any(|t| t.category == "card"));
}

#[tokio::test]
async fn test_annotations_read_from_markup() {
    let server = site().await;
    let factory = HttpStyleSourceFactory::new(Duration::from_secs(5)).expect("client");

    let annotations = factory
        .create()
        .get_html_annotation_context(&server.uri())
        .await
        .expect("annotations");
    assert_eq!(annotations.get("div.card").map(String::as_str), Some("card"));
}

#[tokio::test]
async fn test_transient_failure_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET")).and(path("/")).respond_with(html(ABOUT)).with_priority(2).mount(&server).await;

    let factory = HttpStyleSourceFactory::new(Duration::from_secs(5)).expect("client");
    let extractors = Arc::new(ExtractorSet::new(&ExtractionSettings::default()));
    let collector = PageCollector::new(Arc::new(factory), Throttler::new(1), policy(), Arc::new(SilentProgress));

    let outcome = collector.collect(vec![format!("{}/", server.uri())], &extractors).await;
    assert_eq!(outcome.pages_processed, 1);
    assert!(outcome.problem_pages.is_empty());
}

#[tokio::test]
async fn test_missing_page_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/gone")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let factory = HttpStyleSourceFactory::new(Duration::from_secs(5)).expect("client");
    let extractors = Arc::new(ExtractorSet::new(&ExtractionSettings::default()));
    let collector = PageCollector::new(Arc::new(factory), Throttler::new(1), policy(), Arc::new(SilentProgress));

    let outcome = collector.collect(vec![format!("{}/gone", server.uri())], &extractors).await;
    assert_eq!(outcome.pages_processed, 0);
    assert_eq!(outcome.problem_pages.len(), 1);
    assert_eq!(outcome.problem_pages[0].error_kind, "http-status");
    assert_eq!(outcome.problem_pages[0].attempts, 1);
}
