//! Pagination cursor for the crawl loop

use std::fmt;
use url::Url;

/// Where the crawl loop fetches next
///
/// Starts `Active` and becomes `Exhausted` exactly once, when a page carries
/// no usable "Next" control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Address of the next listing page
    Active(Url),

    /// Pagination has run out
    Exhausted,
}

/// Observable state of the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Running,
    Done,
}

impl Cursor {
    /// Creates the cursor pointing at the first listing page
    pub fn start(url: Url) -> Self {
        Self::Active(url)
    }

    /// Builds the cursor that follows `current`
    ///
    /// `next_href` is the "Next" target exactly as it appeared on the page.
    /// Relative references are resolved against the page they came from.
    pub fn following(current: &Url, next_href: Option<&str>) -> Result<Self, url::ParseError> {
        match next_href {
            Some(href) => Ok(Self::Active(current.join(href)?)),
            None => Ok(Self::Exhausted),
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Active(url) => Some(url),
            Self::Exhausted => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    pub fn state(&self) -> CrawlState {
        match self {
            Self::Active(_) => CrawlState::Running,
            Self::Exhausted => CrawlState::Done,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active(url) => write!(f, "{}", url),
            Self::Exhausted => write!(f, "<end of pagination>"),
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Done => write!(f, "DONE"),
        }
    }
}
