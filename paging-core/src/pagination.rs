use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

const fn default_page() -> u64 {
    DEFAULT_PAGE
}

const fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// The page being requested and how many items a page holds.
///
/// Both values usually come straight from query parameters, so missing
/// values fall back to page 1 with 10 items per page.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq, Copy, Clone)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub const fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    pub const fn with_default_limit(page: u64) -> Self {
        Self::new(page, DEFAULT_LIMIT)
    }

    /// Number of records that come before this page.
    pub const fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Index one past the last record of this page.
    pub const fn end(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }
}
