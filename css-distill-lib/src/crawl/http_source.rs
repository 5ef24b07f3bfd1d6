//! A [`StyleSource`] that reads declared styles straight from fetched HTML.
//!
//! Without a rendering engine there are no computed styles, so this source reports what the
//! markup declares: inline `style` attributes and the rules of embedded `<style>` blocks. That is
//! enough for sites that ship their design system inline and for smoke-testing a crawl.

use super::{AnnotationMap, Observation, PageFetchError, PageObservations, StyleSource, StyleSourceFactory};
use crate::Result;
use crate::classify::SelectorParts;
use core::time::Duration;
use ohno::IntoAppError;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, Mutex};
use url::Url;

const LOG_TARGET: &str = "      http";

const USER_AGENT: &str = concat!("css-distill/", env!("CARGO_PKG_VERSION"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)(\s[^<>]*)?>").expect("valid regex"));
static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("valid regex"));
static CSS_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static CSS_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([^{}@;]+)\{([^{}]*)\}").expect("valid regex"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<!--\s*(?:component|theme hook)\s*:\s*['"]?([a-z0-9_.-]+)['"]?\s*-->"#).expect("valid regex"));
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)<a\s[^>]*href\s*=\s*["']([^"'#]+)"#).expect("valid regex"));

/// At-rules whose blocks hold no element rules.
const SKIPPED_AT_RULES: [&str; 3] = ["@keyframes", "@-webkit-keyframes", "@font-face"];

/// Hands out [`HttpStyleSource`]s that share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpStyleSourceFactory {
    client: reqwest::Client,
}

impl HttpStyleSourceFactory {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self { client })
    }
}

impl StyleSourceFactory for HttpStyleSourceFactory {
    type Source = HttpStyleSource;

    fn create(&self) -> Self::Source {
        HttpStyleSource {
            client: self.client.clone(),
            pages: Mutex::new(HashMap::new()),
        }
    }
}

#[derive(Debug)]
pub struct HttpStyleSource {
    client: reqwest::Client,
    pages: Mutex<HashMap<String, Arc<str>>>,
}

impl HttpStyleSource {
    async fn fetch_html(&self, url: &str) -> Result<Arc<str>, PageFetchError> {
        if let Some(html) = self.pages.lock().expect("lock not poisoned").get(url) {
            return Ok(Arc::clone(html));
        }

        log::debug!(target: LOG_TARGET, "Fetching '{url}'");
        let response = self.client.get(url).send().await.map_err(|e| request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);

            return Err(PageFetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                retry_after,
            });
        }

        let html: Arc<str> = response.text().await.map_err(|e| request_error(url, &e))?.into();
        let _ = self
            .pages
            .lock()
            .expect("lock not poisoned")
            .insert(url.to_string(), Arc::clone(&html));

        Ok(html)
    }
}

fn request_error(url: &str, error: &reqwest::Error) -> PageFetchError {
    if error.is_timeout() {
        PageFetchError::Timeout { url: url.to_string() }
    } else {
        PageFetchError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

impl StyleSource for HttpStyleSource {
    async fn get_computed_style_observations(&self, url: &str, properties: &[String]) -> Result<PageObservations, PageFetchError> {
        let html = self.fetch_html(url).await?;

        let mut observations = extract_inline_observations(&html, properties);

        // rules are numbered after the inline elements
        let offset = observations.iter().filter_map(|o| o.element_index).max().map_or(0, |last| last + 1);
        observations.extend(extract_stylesheet_observations(&html, properties).into_iter().map(|o| {
            let index = o.element_index.unwrap_or_default() + offset;
            o.with_element_index(index)
        }));

        Ok(PageObservations {
            url: url.to_string(),
            title: extract_title(&html),
            observations,
            annotations: AnnotationMap::new(),
        })
    }

    async fn get_html_annotation_context(&self, url: &str) -> Result<AnnotationMap, PageFetchError> {
        let html = self.fetch_html(url).await?;
        Ok(extract_annotations(&html))
    }

    async fn get_page_links(&self, url: &str) -> Result<Vec<String>, PageFetchError> {
        let base = Url::parse(url).map_err(|e| PageFetchError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let html = self.fetch_html(url).await?;
        Ok(extract_links(&html, &base))
    }
}

/// Split a declaration block into lowercase property names and trimmed values.
fn parse_declarations(block: &str) -> Vec<(String, String)> {
    crate::values::split_top_level(block, ';')
        .into_iter()
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map_or(value, str::trim_end);
            (!value.is_empty()).then(|| (property.trim().to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

/// The selector that identifies an element from its tag and attributes, e.g. `div.card.primary`.
fn element_selector(tag: &str, attributes: &HashMap<String, String>) -> String {
    let mut selector = tag.to_string();

    if let Some(classes) = attributes.get("class") {
        for class in classes.split_whitespace() {
            selector.push('.');
            selector.push_str(class);
        }
    }

    if let Some(component) = attributes.get("data-component") {
        selector.push_str(&format!("[data-component=\"{component}\"]"));
    }

    selector
}

fn parse_attributes(text: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(text)
        .filter_map(|captures| {
            let name = captures.get(1)?.as_str().to_ascii_lowercase();
            let value = captures.get(2).or_else(|| captures.get(3))?.as_str().to_string();
            Some((name, value))
        })
        .collect()
}

pub(crate) fn extract_title(html: &str) -> String {
    TITLE
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|title| title.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

pub(crate) fn extract_inline_observations(html: &str, properties: &[String]) -> Vec<Observation> {
    let mut observations = Vec::new();

    for (index, captures) in TAG.captures_iter(html).enumerate() {
        let Some(attributes) = captures.get(2) else {
            continue;
        };

        let attributes = parse_attributes(attributes.as_str());
        let Some(style) = attributes.get("style") else {
            continue;
        };

        let tag = captures[1].to_ascii_lowercase();
        let selector = element_selector(&tag, &attributes);

        for (property, value) in parse_declarations(style) {
            if properties.contains(&property) {
                observations.push(Observation::new(selector.clone(), property, value, tag.clone()).with_element_index(index));
            }
        }
    }

    observations
}

/// Remove the blocks of at-rules that contain no element rules, braces balanced.
fn strip_at_blocks(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;

    loop {
        let lower = rest.to_ascii_lowercase();
        let Some(start) = SKIPPED_AT_RULES.iter().filter_map(|rule| lower.find(rule)).min() else {
            out.push_str(rest);
            return out;
        };

        out.push_str(&rest[..start]);
        let Some(open) = rest[start..].find('{').map(|i| start + i) else {
            return out;
        };

        let mut depth = 0usize;
        let mut end = rest.len();
        for (index, ch) in rest[open..].char_indices() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = open + index + 1;
                        break;
                    }
                }
                _ => {}
            }
        }

        rest = &rest[end..];
    }
}

pub(crate) fn extract_stylesheet_observations(html: &str, properties: &[String]) -> Vec<Observation> {
    let mut observations = Vec::new();
    let mut index = 0;

    for block in STYLE_BLOCK.captures_iter(html) {
        let css = CSS_COMMENT.replace_all(&block[1], "");
        let css = strip_at_blocks(&css);

        for rule in CSS_RULE.captures_iter(&css) {
            // the name of an at-rule such as `@page` is not a selector
            if rule.get(0).is_some_and(|m| css[..m.start()].ends_with('@')) {
                continue;
            }

            let declarations = parse_declarations(&rule[2]);
            for selector in crate::values::split_top_level(&rule[1], ',') {
                let tag = SelectorParts::parse(selector).tag.unwrap_or_else(|| "*".to_string());
                for (property, value) in &declarations {
                    if properties.contains(property) {
                        observations.push(Observation::new(selector, property.clone(), value.clone(), tag.clone()).with_element_index(index));
                    }
                }
                index += 1;
            }
        }
    }

    observations
}

/// Map the element following each template-debug comment to the component the comment names.
pub(crate) fn extract_annotations(html: &str) -> AnnotationMap {
    let mut annotations = AnnotationMap::new();

    for captures in ANNOTATION.captures_iter(html) {
        let (Some(comment), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let Some(element) = TAG.captures_at(html, comment.end()) else {
            continue;
        };

        let attributes = element.get(2).map(|a| parse_attributes(a.as_str())).unwrap_or_default();
        let selector = element_selector(&element[1].to_ascii_lowercase(), &attributes);
        let _ = annotations.entry(selector).or_insert_with(|| name.as_str().to_string());
    }

    annotations
}

pub(crate) fn extract_links(html: &str, base: &Url) -> Vec<String> {
    let mut links: Vec<String> = LINK
        .captures_iter(html)
        .filter_map(|captures| base.join(captures[1].trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
        .collect();

    let mut seen = HashSet::new();
    links.retain(|link| seen.insert(link.clone()));
    links
}
