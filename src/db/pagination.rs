//! Result windows selected by `page` and `per_page` parameters

use serde::{Deserialize, Serialize};

/// Raw query parameters. Kept as strings so that garbage values fall back to
/// the defaults instead of failing the request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub offset: u64,
    pub total_entries: u64,
    pub total_pages: u32,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl Pagination {
    /// Build the window from request parameters; totals are filled in later
    pub fn from_params(params: &PageParams, default_per_page: u32) -> Self {
        let page = parse_positive(params.page.as_deref()).unwrap_or(1);
        let per_page = parse_positive(params.per_page.as_deref())
            .unwrap_or(default_per_page)
            .max(1);

        Self {
            page,
            per_page,
            offset: u64::from(page - 1) * u64::from(per_page),
            total_entries: 0,
            total_pages: 0,
            previous_page: None,
            next_page: None,
        }
    }

    /// Record the total number of rows and derive page links
    pub fn with_total(mut self, total_entries: u64) -> Self {
        let per_page = u64::from(self.per_page);
        let pages = total_entries.div_ceil(per_page);
        self.total_entries = total_entries;
        self.total_pages = u32::try_from(pages).unwrap_or(u32::MAX);
        self.previous_page = (self.page > 1).then(|| self.page - 1);
        self.next_page = (self.page < self.total_pages).then(|| self.page + 1);
        self
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

fn parse_positive(value: Option<&str>) -> Option<u32> {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}
