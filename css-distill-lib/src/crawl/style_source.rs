use super::{AnnotationMap, PageFetchError, PageObservations};

/// Something that can open a page and report the styles its elements use.
pub trait StyleSource: Send + Sync {
    /// Read the values of `properties` from every element on the page at `url`.
    fn get_computed_style_observations(
        &self,
        url: &str,
        properties: &[String],
    ) -> impl Future<Output = Result<PageObservations, PageFetchError>> + Send;

    /// Collect component annotations left in the page's markup by template debugging.
    fn get_html_annotation_context(&self, url: &str) -> impl Future<Output = Result<AnnotationMap, PageFetchError>> + Send;

    /// Absolute URLs of the links on the page at `url`.
    fn get_page_links(&self, url: &str) -> impl Future<Output = Result<Vec<String>, PageFetchError>> + Send;
}

/// Creates a fresh [`StyleSource`] for each page attempt so a failed attempt leaves no state behind.
pub trait StyleSourceFactory: Send + Sync + 'static {
    type Source: StyleSource;

    fn create(&self) -> Self::Source;
}
