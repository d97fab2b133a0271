//! Page arithmetic for the skip/limit list endpoints

use serde::{Deserialize, Serialize};

/// Rows per page in list views
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A 1-based page of a list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Page numbers below 1 are treated as page 1; a zero size becomes 1.
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    pub fn first(size: u32) -> Self {
        Self::new(1, size)
    }

    /// Rows to skip: `(number - 1) * size`
    pub fn skip(&self) -> u64 {
        u64::from(self.number.saturating_sub(1)) * u64::from(self.size)
    }

    pub fn limit(&self) -> u32 {
        self.size
    }

    /// `skip`/`limit` query parameters
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("skip", self.skip().to_string()),
            ("limit", self.limit().to_string()),
        ]
    }

    pub fn next(&self) -> Self {
        Self::new(self.number.saturating_add(1), self.size)
    }

    pub fn prev(&self) -> Self {
        Self::new(self.number.saturating_sub(1), self.size)
    }

    /// Whether a page exists after this one given the total row count
    pub fn has_next(&self, count: u64) -> bool {
        u64::from(self.number) < total_pages(count, self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Number of pages needed for `count` rows
pub fn total_pages(count: u64, size: u32) -> u64 {
    let size = u64::from(size.max(1));
    count.div_ceil(size)
}
