use core::time::Duration;
use strum::Display;

/// The broad class of a page failure, as reported in `problemPages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PageFetchErrorKind {
    Navigation,
    Timeout,
    HttpStatus,
    Recording,
}

/// A page could not be opened or read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageFetchError {
    #[error("could not load '{url}': {message}")]
    Navigation { url: String, message: String },

    #[error("timed out loading '{url}'")]
    Timeout { url: String },

    #[error("'{url}' returned HTTP status {status}")]
    HttpStatus {
        url: String,
        status: u16,
        retry_after: Option<Duration>,
    },

    #[error("recording has no usable data for '{url}': {message}")]
    Recording { url: String, message: String },
}

impl PageFetchError {
    #[must_use]
    pub const fn kind(&self) -> PageFetchErrorKind {
        match self {
            Self::Navigation { .. } => PageFetchErrorKind::Navigation,
            Self::Timeout { .. } => PageFetchErrorKind::Timeout,
            Self::HttpStatus { .. } => PageFetchErrorKind::HttpStatus,
            Self::Recording { .. } => PageFetchErrorKind::Recording,
        }
    }

    /// Network trouble, timeouts, 5xx and 429 may go away on a retry; everything else will not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Navigation { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::Recording { .. } => false,
        }
    }

    /// How long the server asked us to back off, if it did.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
