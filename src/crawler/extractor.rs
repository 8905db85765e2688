//! Dependents page extractor
//!
//! This module turns one dependents listing page into:
//! - the repositories listed on it, in document order
//! - the "Next" pagination target, if the page has one
//!
//! The selectors are pinned to a single hosting site's markup. A layout change
//! shows up as an [`ExtractionError`], never as a silently skipped row.

use crate::record::Repository;
use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// One listing row per dependent repository
const ROW_SELECTOR: &str = ".Box-row";
/// Owner and repository links inside a row
const METADATA_SELECTOR: &str = ".f5.color-fg-muted";
const ORGANIZATION_SELECTOR: &str = r#"a[data-hovercard-type="organization"]"#;
const USER_SELECTOR: &str = r#"a[data-hovercard-type="user"]"#;
const REPOSITORY_SELECTOR: &str = r#"a[data-hovercard-type="repository"]"#;
/// Star and fork counters, in that order
const BADGE_SELECTOR: &str = ".color-fg-muted.text-bold.pl-3";
const PAGINATION_SELECTOR: &str = "a.btn.btn-outline.BtnGroup-item";

const NEXT_LABEL: &str = "Next";
const THOUSANDS_SEPARATOR: char = ',';

/// The page did not have the expected structure
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("row {row}: metadata block not found")]
    MissingMetadata { row: usize },

    #[error("row {row}: neither an organization nor a user link is present")]
    MissingAuthority { row: usize },

    #[error("row {row}: repository link not found")]
    MissingRepository { row: usize },

    #[error("row {row}: expected 2 count badges (stars, forks), found {found}")]
    BadgeCount { row: usize, found: usize },

    #[error("row {row}: invalid count {text:?}")]
    InvalidCount { row: usize, text: String },

    #[error("invalid next page reference {href:?}: {source}")]
    InvalidNextPage {
        href: String,
        source: url::ParseError,
    },

    #[error("invalid selector {selector:?}: {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

/// Compiled selectors for the dependents listing layout
#[derive(Debug)]
pub struct Extractor {
    row: Selector,
    metadata: Selector,
    organization: Selector,
    user: Selector,
    repository: Selector,
    badge: Selector,
    pagination: Selector,
}

impl Extractor {
    /// Compiles the listing selectors
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            row: compile(ROW_SELECTOR)?,
            metadata: compile(METADATA_SELECTOR)?,
            organization: compile(ORGANIZATION_SELECTOR)?,
            user: compile(USER_SELECTOR)?,
            repository: compile(REPOSITORY_SELECTOR)?,
            badge: compile(BADGE_SELECTOR)?,
            pagination: compile(PAGINATION_SELECTOR)?,
        })
    }

    /// Parses a page body
    ///
    /// Parsing itself never fails; structural problems surface while walking
    /// [`ListingPage::records`].
    ///
    /// # Example
    ///
    /// ```
    /// use dependents_crawler::crawler::Extractor;
    ///
    /// let extractor = Extractor::new().unwrap();
    /// let page = extractor.extract("<html><body></body></html>");
    /// assert_eq!(page.records().count(), 0);
    /// assert_eq!(page.next_page(), None);
    /// ```
    pub fn extract(&self, html: &str) -> ListingPage<'_> {
        ListingPage {
            document: Html::parse_document(html),
            extractor: self,
        }
    }

    fn extract_row(&self, row: ElementRef<'_>, index: usize) -> Result<Repository, ExtractionError> {
        let metadata = row
            .select(&self.metadata)
            .next()
            .ok_or(ExtractionError::MissingMetadata { row: index })?;

        // Organization takes precedence over user
        let authority = metadata
            .select(&self.organization)
            .next()
            .or_else(|| metadata.select(&self.user).next())
            .map(element_text)
            .ok_or(ExtractionError::MissingAuthority { row: index })?;

        let name = metadata
            .select(&self.repository)
            .next()
            .map(element_text)
            .ok_or(ExtractionError::MissingRepository { row: index })?;

        let badges: Vec<String> = row.select(&self.badge).map(element_text).collect();
        let [stars, forks] = badges.as_slice() else {
            return Err(ExtractionError::BadgeCount {
                row: index,
                found: badges.len(),
            });
        };

        let num_stars = parse_count(stars).ok_or_else(|| ExtractionError::InvalidCount {
            row: index,
            text: stars.clone(),
        })?;
        let num_forks = parse_count(forks).ok_or_else(|| ExtractionError::InvalidCount {
            row: index,
            text: forks.clone(),
        })?;

        Ok(Repository {
            authority,
            name,
            num_stars,
            num_forks,
        })
    }
}

/// A parsed listing page
pub struct ListingPage<'e> {
    document: Html,
    extractor: &'e Extractor,
}

impl<'e> ListingPage<'e> {
    /// Returns the page's rows as records, lazily and in document order
    ///
    /// The iterator stops after the first error, so no record past a
    /// malformed row is produced.
    pub fn records(&self) -> Records<'_> {
        Records {
            rows: self.document.select(&self.extractor.row),
            extractor: self.extractor,
            index: 0,
            failed: false,
        }
    }

    /// Returns the "Next" link target verbatim, or None at the end of pagination
    ///
    /// A "Next" control without an `href` also ends pagination.
    pub fn next_page(&self) -> Option<String> {
        self.document
            .select(&self.extractor.pagination)
            .find(|element| element_text(*element) == NEXT_LABEL)
            .and_then(|element| element.value().attr("href"))
            .map(str::to_string)
    }
}

/// Iterator over the records of one [`ListingPage`]
pub struct Records<'a> {
    rows: Select<'a, 'a>,
    extractor: &'a Extractor,
    index: usize,
    failed: bool,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Repository, ExtractionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let row = self.rows.next()?;
        self.index += 1;

        let result = self.extractor.extract_row(row, self.index);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Parses a non-negative count that may use `,` as thousands separator
///
/// Grouping is checked: every group after the first must have exactly three
/// digits, and the first group at most three once separators are used.
///
/// # Example
///
/// ```
/// use dependents_crawler::crawler::parse_count;
///
/// assert_eq!(parse_count("1,234"), Some(1234));
/// assert_eq!(parse_count("0"), Some(0));
/// assert_eq!(parse_count("1,23"), None);
/// ```
pub fn parse_count(text: &str) -> Option<u64> {
    let text = text.trim();
    let mut groups = text.split(THOUSANDS_SEPARATOR);

    let first = groups.next()?;
    if !is_digits(first) {
        return None;
    }

    let mut digits = first.to_string();
    let mut grouped = false;
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        grouped = true;
        digits.push_str(group);
    }

    if grouped && first.len() > 3 {
        return None;
    }

    digits.parse().ok()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn compile(selector: &'static str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::Selector {
        selector,
        message: format!("{:?}", e),
    })
}
