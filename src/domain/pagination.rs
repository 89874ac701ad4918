//! Pagination and sorting primitives for repository listings.

use super::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

/// Sort direction accepted by listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDir {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Sortable columns shared by phase and task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Entity name.
    Name,
    /// Completion flag.
    Done,
    /// Creation timestamp.
    CreatedOn,
    /// Last mutation timestamp.
    UpdatedOn,
}

impl SortField {
    /// Parses a caller-supplied sort key.
    ///
    /// Both the wire spelling (`createdOn`) and the column spelling
    /// (`created_on`) are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for unknown keys.
    pub fn parse(raw: &str) -> ApiResult<Self> {
        match raw {
            "name" => Ok(Self::Name),
            "done" => Ok(Self::Done),
            "createdOn" | "created_on" => Ok(Self::CreatedOn),
            "updatedOn" | "updated_on" => Ok(Self::UpdatedOn),
            other => Err(ApiError::bad_request(format!("unknown sort field {other}"))),
        }
    }
}

/// Page request with a 0-based page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Sort keys, applied in order.
    pub sort: Vec<String>,
    /// Sort direction shared by all keys; descending when unset.
    pub sort_dir: Option<SortDir>,
}

impl PageRequest {
    /// Page size applied when the caller does not specify one.
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    /// Creates an unsorted request for the given page.
    #[must_use]
    pub const fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            sort: Vec::new(),
            sort_dir: None,
        }
    }

    /// Single-row first page, used for existence probes.
    #[must_use]
    pub const fn single() -> Self {
        Self::new(0, 1)
    }

    /// Adds sort keys and a direction to the request.
    #[must_use]
    pub fn with_sort(mut self, sort: impl IntoIterator<Item = String>, dir: SortDir) -> Self {
        self.sort = sort.into_iter().collect();
        self.sort_dir = Some(dir);
        self
    }

    /// Offset of the first row on this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// Direction applied to the sort keys.
    #[must_use]
    pub fn sort_direction(&self) -> SortDir {
        self.sort_dir.unwrap_or(SortDir::Desc)
    }

    /// Parses the sort keys into typed fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] when any key is unknown.
    pub fn sort_fields(&self) -> ApiResult<Vec<SortField>> {
        self.sort.iter().map(|key| SortField::parse(key)).collect()
    }

    /// Total page count for a result set of `rows` rows.
    #[must_use]
    pub const fn total_pages(&self, rows: usize) -> usize {
        rows.div_ceil(self.page_size_floor())
    }

    const fn page_size_floor(&self) -> usize {
        if self.page_size == 0 { 1 } else { self.page_size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the total page count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataWithPages<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Total number of pages matching the filters.
    pub pages: usize,
}
