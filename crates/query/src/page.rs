//! Pagination: page/size parameters → a concrete window plus metadata.

use serde::Serialize;

use crate::error::QueryError;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Hard cap on page size. Larger requests are capped, never rejected, so the
/// endpoint stays available under abusive inputs.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Validated page request.
///
/// Policy: `page < 1` clamps to 1 and `page_size` clamps to
/// `[1, MAX_PAGE_SIZE]`; only non-numeric input is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Parse and clamp raw `page` / `page_size` parameters.
    pub fn resolve(page: Option<&str>, page_size: Option<&str>) -> Result<Self, QueryError> {
        let page = match page {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| QueryError::InvalidPage(format!("`{raw}` is not a number")))?
                .max(1) as u64,
            None => 1,
        };
        let page_size = match page_size {
            Some(raw) => {
                let size = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| QueryError::InvalidPage(format!("`{raw}` is not a number")))?;
                (size.max(1) as u64).min(MAX_PAGE_SIZE)
            }
            None => DEFAULT_PAGE_SIZE,
        };
        Ok(Self { page, page_size })
    }
}

/// Concrete offset/limit window plus page metadata for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Compute the window for a request given the pre-pagination row count.
///
/// An empty result set is page 1 with zero pages, not an error. A page past
/// the end keeps the requested page number and yields an empty window.
pub fn window(request: PageRequest, total_count: u64) -> PageWindow {
    let page_size = request.page_size;
    let total_pages = total_count.div_ceil(page_size);
    let page = if total_count == 0 { 1 } else { request.page };

    PageWindow {
        // page is client-controlled and can be arbitrarily large; the offset
        // must never wrap.
        offset: page.saturating_sub(1).saturating_mul(page_size),
        limit: page_size,
        page,
        page_size,
        total_count,
        total_pages,
        has_next: page < total_pages,
        has_previous: page > 1,
    }
}

/// The structured list response: items plus pagination metadata.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageEnvelope<T> {
    pub fn from_window(window: &PageWindow, items: Vec<T>) -> Self {
        Self {
            items,
            page: window.page,
            page_size: window.page_size,
            total_count: window.total_count,
            total_pages: window.total_pages,
            has_next: window.has_next,
            has_previous: window.has_previous,
        }
    }

    /// Re-shape the items while keeping the metadata (entity → wire mapping).
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageEnvelope<U> {
        PageEnvelope {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
