//! Pagination window for list operations.

use std::fmt;

/// Default number of records returned when the caller does not ask.
pub const DEFAULT_LIMIT: i64 = 50;
/// Hard ceiling on the number of records returned per page.
pub const MAX_LIMIT: i64 = 200;

/// Validation failure raised by [`Page::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The requested limit is zero or negative.
    NonPositiveLimit,
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveLimit => write!(f, "page limit must be at least 1"),
        }
    }
}

impl std::error::Error for PageError {}

/// Offset/limit window applied to list queries.
///
/// Limits above [`MAX_LIMIT`] are clamped rather than rejected so a
/// generous client still gets a bounded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: i64,
    offset: u64,
}

impl Page {
    /// Build a page from caller-supplied values.
    ///
    /// `limit` defaults to [`DEFAULT_LIMIT`] and is clamped to
    /// [`MAX_LIMIT`]; zero and negative limits are rejected.
    pub const fn new(limit: Option<i64>, offset: Option<u64>) -> Result<Self, PageError> {
        let limit = match limit {
            Some(value) if value < 1 => return Err(PageError::NonPositiveLimit),
            Some(value) if value > MAX_LIMIT => MAX_LIMIT,
            Some(value) => value,
            None => DEFAULT_LIMIT,
        };
        let offset = match offset {
            Some(value) => value,
            None => 0,
        };
        Ok(Self { limit, offset })
    }

    /// Maximum number of records this page yields.
    #[must_use]
    pub const fn limit(self) -> i64 {
        self.limit
    }

    /// Number of records skipped before the page starts.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
