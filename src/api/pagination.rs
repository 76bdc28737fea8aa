//! Page-number pagination for list endpoints.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// The `?page=` query parameter, kept raw so bad input maps to "Invalid page.".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Requested page, 1-based
    pub page: Option<String>,
}

impl PageQuery {
    /// The requested page number; page 1 when absent.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPage`] for anything but a positive integer.
    pub fn number(&self) -> Result<u64> {
        match self.page.as_deref().map(str::trim) {
            None => Ok(1),
            Some(raw) => match raw.parse::<u64>() {
                Ok(page) if page >= 1 => Ok(page),
                _ => Err(Error::InvalidPage),
            },
        }
    }
}

/// A page of results with links to its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of items across all pages
    pub count: u64,
    /// Link to the next page, if any
    pub next: Option<String>,
    /// Link to the previous page, if any
    pub previous: Option<String>,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wraps `results` as page `page` of `num_pages`, linking under `base_path`.
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, page: u64, num_pages: u64, base_path: &str) -> Self {
        let link = |n: u64| format!("{base_path}?page={n}");
        Self {
            count,
            next: (page < num_pages).then(|| link(page + 1)),
            previous: (page > 1).then(|| link(page - 1)),
            results,
        }
    }
}
