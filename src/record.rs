//! The repository record extracted from one listing row

use std::fmt;

/// One dependent repository as listed on a dependents page
///
/// A record only exists once all four fields have been resolved; the
/// extractor never hands out a partially filled one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Organization or user owning the repository
    pub authority: String,

    /// Repository name
    pub name: String,

    pub num_stars: u64,

    pub num_forks: u64,
}

impl Repository {
    pub fn new(
        authority: impl Into<String>,
        name: impl Into<String>,
        num_stars: u64,
        num_forks: u64,
    ) -> Self {
        Self {
            authority: authority.into(),
            name: name.into(),
            num_stars,
            num_forks,
        }
    }

    /// Returns the `authority/name` form used on the hosting site
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.authority, self.name)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (stars: {}, forks: {})",
            self.full_name(),
            self.num_stars,
            self.num_forks
        )
    }
}
