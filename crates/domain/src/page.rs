use serde::{Deserialize, Serialize};

/// Page size used when neither the consumer nor the backend chooses one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Pagination metadata for one listing.
///
/// Numbered (`page/limit/total`) and cursor (`count/next/previous`) backends
/// both normalize into this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    page: u32,
    limit: u32,
    total: u64,
    total_pages: u32,
    next: Option<String>,
    previous: Option<String>,
}

impl PageInfo {
    /// Creates numbered pagination, deriving `total_pages` when absent.
    #[must_use]
    pub fn numbered(page: u32, limit: u32, total: u64, total_pages: Option<u32>) -> Self {
        Self {
            page: page.max(1),
            limit,
            total,
            total_pages: total_pages.unwrap_or_else(|| Self::total_pages_for(total, limit)),
            next: None,
            previous: None,
        }
    }

    /// Creates pagination from a cursor-style listing.
    #[must_use]
    pub fn cursor(
        page: u32,
        limit: u32,
        count: u64,
        next: Option<String>,
        previous: Option<String>,
    ) -> Self {
        Self {
            next,
            previous,
            ..Self::numbered(page, limit, count, None)
        }
    }

    /// Returns `ceil(total / limit)`; a zero limit counts everything as one page.
    #[must_use]
    pub fn total_pages_for(total: u64, limit: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        if limit == 0 {
            return 1;
        }

        u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
    }

    /// Returns the one-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the total number of matching records.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Returns the next-page URL of cursor backends.
    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// Returns the previous-page URL of cursor backends.
    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Returns whether another page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next.is_some() || self.page < self.total_pages
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self::numbered(1, DEFAULT_PAGE_SIZE, 0, None)
    }
}
