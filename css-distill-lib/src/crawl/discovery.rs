use super::StyleSource;
use std::collections::{HashSet, VecDeque};
use url::Url;

const LOG_TARGET: &str = " discovery";

/// Decides which discovered URLs are worth visiting.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl UrlFilter {
    /// A URL passes when it contains one of `include` (or `include` is empty) and none of `exclude`.
    #[must_use]
    pub fn new(include: impl IntoIterator<Item = String>, exclude: impl IntoIterator<Item = String>) -> Self {
        Self {
            include: include.into_iter().collect(),
            exclude: exclude.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn accepts(&self, url: &str) -> bool {
        (self.include.is_empty() || self.include.iter().any(|pattern| url.contains(pattern.as_str())))
            && !self.exclude.iter().any(|pattern| url.contains(pattern.as_str()))
    }
}

/// Drop the fragment so `/a` and `/a#top` are the same page.
fn normalize(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// Breadth-first walk of same-host links starting at `seed`.
///
/// The seed is always included. Pages whose links cannot be read are still returned; they simply
/// contribute no further links.
pub async fn discover_pages(source: &impl StyleSource, seed: &Url, max_pages: usize, filter: &UrlFilter) -> Vec<String> {
    let seed = normalize(seed);
    let mut seen = HashSet::from([seed.to_string()]);
    let mut queue = VecDeque::from([seed.clone()]);
    let mut pages = Vec::new();

    while let Some(url) = queue.pop_front() {
        if pages.len() >= max_pages {
            break;
        }

        pages.push(url.to_string());

        let links = match source.get_page_links(url.as_str()).await {
            Ok(links) => links,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "No links read from '{url}': {e}");
                continue;
            }
        };

        for link in links {
            let Ok(link) = Url::parse(&link).map(|l| normalize(&l)) else {
                continue;
            };

            if link.host_str() != seed.host_str() || !filter.accepts(link.as_str()) {
                continue;
            }

            if seen.insert(link.to_string()) {
                queue.push_back(link);
            }
        }
    }

    log::info!(target: LOG_TARGET, "Discovered {} page(s) from '{seed}'", pages.len());
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::{RecordedPage, RecordedStyleSourceFactory, Recording, StyleSourceFactory};

    fn page(url: &str, links: &[&str]) -> RecordedPage {
        RecordedPage {
            url: url.to_string(),
            title: String::new(),
            observations: Vec::new(),
            annotations: Default::default(),
            links: links.iter().map(ToString::to_string).collect(),
            failure: None,
        }
    }

    fn site() -> RecordedStyleSourceFactory {
        RecordedStyleSourceFactory::new(Recording {
            pages: vec![
                page("https://site.test/", &["https://site.test/a", "https://site.test/b#x", "https://elsewhere.test/"]),
                page("https://site.test/a", &["https://site.test/", "https://site.test/c", "https://site.test/logout"]),
                page("https://site.test/b", &["https://site.test/d"]),
            ],
        })
    }

    #[tokio::test]
    async fn test_breadth_first_same_host() {
        let seed = Url::parse("https://site.test/").unwrap();
        let pages = discover_pages(&site().create(), &seed, 10, &UrlFilter::default()).await;

        assert_eq!(
            pages,
            vec![
                "https://site.test/",
                "https://site.test/a",
                "https://site.test/b",
                "https://site.test/c",
                "https://site.test/logout",
                "https://site.test/d",
            ]
        );
    }

    #[tokio::test]
    async fn test_max_pages_and_filter() {
        let seed = Url::parse("https://site.test/").unwrap();
        let filter = UrlFilter::new(Vec::new(), vec!["logout".to_string()]);
        let pages = discover_pages(&site().create(), &seed, 4, &filter).await;

        assert_eq!(pages.len(), 4);
        assert!(!pages.iter().any(|p| p.contains("logout")));
    }

    #[test]
    fn test_filter_include() {
        let filter = UrlFilter::new(vec!["/docs/".to_string()], Vec::new());
        assert!(filter.accepts("https://site.test/docs/intro"));
        assert!(!filter.accepts("https://site.test/blog"));
    }
}
