//! Pagination
//!
//! Page arithmetic shared by every listing, independent of where the
//! records come from.

use serde::Serialize;

/// Validated page request (1-based page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Returns `None` if `page` or `limit` is zero
    pub fn new(page: u32, limit: u32) -> Option<Self> {
        if page == 0 || limit == 0 {
            return None;
        }
        Some(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results plus navigation metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub payload: Vec<T>,
    pub total_docs: u64,
    pub total_pages: u32,
    pub page: u32,
    pub limit: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub has_prev_page: bool,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    /// Build a page from the already-sliced payload and the total count.
    ///
    /// `total_pages` is never below 1, so an empty collection still reports
    /// a single (empty) first page.
    pub fn new(payload: Vec<T>, total_docs: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit());
        let total_pages = total_docs.div_ceil(limit).max(1);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        let page = request.page();

        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;

        Self {
            payload,
            total_docs,
            total_pages,
            page,
            limit: request.limit(),
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
            has_prev_page,
            has_next_page,
        }
    }

    /// Slice an in-memory collection into the requested page
    pub fn from_vec(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let payload = items
            .into_iter()
            .skip(offset)
            .take(request.limit() as usize)
            .collect();
        Self::new(payload, total, request)
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            payload: self.payload.into_iter().map(f).collect(),
            total_docs: self.total_docs,
            total_pages: self.total_pages,
            page: self.page,
            limit: self.limit,
            prev_page: self.prev_page,
            next_page: self.next_page,
            has_prev_page: self.has_prev_page,
            has_next_page: self.has_next_page,
        }
    }
}
