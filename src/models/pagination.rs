//! Pagination request and response types

use serde::{Deserialize, Serialize};

/// Pagination metadata returned by list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl Pagination {
    /// Builds pagination metadata from a total record count, clamping the
    /// requested page into range
    pub fn from_total(total_count: usize, request: &PageRequest) -> Self {
        let per_page = request.per_page.max(1) as usize;
        let total_pages = if total_count > 0 {
            total_count.div_ceil(per_page) as u32
        } else {
            1
        };
        Self {
            current_page: request.page.clamp(1, total_pages),
            total_pages,
        }
    }
}

/// Parameters of one list fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
    /// Trimmed search text; `None` means no filter
    pub search: Option<String>,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32, search: Option<&str>) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            search: search.and_then(super::non_blank).map(str::to_string),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.per_page as usize
    }
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub pagination: Pagination,
}

impl<E> Page<E> {
    pub fn total_pages(&self) -> u32 {
        self.pagination.total_pages.max(1)
    }
}
