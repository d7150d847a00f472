//! Page arithmetic over a flat result list

use serde::Serialize;
use std::ops::Range;

use crate::config::PaginationConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub limit: usize,
    pub page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<usize>,
}

/// A validated `(limit, page)` pair; both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
    page: usize,
}

impl PageRequest {
    pub fn new(limit: usize, page: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::Validation("limit must be greater than zero".to_string()));
        }
        if page == 0 {
            return Err(Error::Validation("page must be greater than zero".to_string()));
        }
        Ok(Self { limit, page })
    }

    /// Apply defaults and the configured ceiling to raw query values.
    pub fn resolve(
        limit: Option<usize>,
        page: Option<usize>,
        config: &PaginationConfig,
    ) -> Result<Self> {
        let limit = limit.unwrap_or(config.default_limit);
        if limit > config.max_limit {
            return Err(Error::Validation(format!(
                "limit must not exceed {}",
                config.max_limit
            )));
        }
        Self::new(limit, page.unwrap_or(1))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Slice bounds and metadata for `total` items.
    pub fn window(&self, total: usize) -> (Range<usize>, PaginationInfo) {
        let total_pages = total.div_ceil(self.limit);
        let start = (self.page - 1).saturating_mul(self.limit).min(total);
        let end = start.saturating_add(self.limit).min(total);
        let has_next_page = self.page < total_pages;
        let has_prev_page = self.page > 1;

        let info = PaginationInfo {
            limit: self.limit,
            page: self.page,
            total_items: total,
            total_pages,
            has_next_page,
            has_prev_page,
            next_page: has_next_page.then(|| self.page + 1),
            prev_page: has_prev_page.then(|| self.page - 1),
        };

        (start..end, info)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

pub fn paginate<T>(mut items: Vec<T>, request: PageRequest) -> Page<T> {
    let (range, pagination) = request.window(items.len());
    let items = items.drain(range).collect();
    Page { items, pagination }
}
