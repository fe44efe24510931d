//! Paging and sorting contract for task list queries.
//!
//! # Invariants
//! - `PageRequest::page` is 0-based; callers speak 1-based through
//!   [`PageRequest::from_client`].
//! - `PageRequest::size` always lies in `[1, MAX_PAGE_SIZE]`.
//! - Sorting is restricted to the [`SortField`] allow-list.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sortable task columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    DueDate,
    /// Ordered by rank (`low < medium < high`), not by name.
    Priority,
    #[default]
    CreatedAt,
}

impl SortField {
    /// Maps a caller-facing name; anything off the allow-list is `createdAt`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("dueDate") => Self::DueDate,
            Some("priority") => Self::Priority,
            _ => Self::CreatedAt,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DueDate => "dueDate",
            Self::Priority => "priority",
            Self::CreatedAt => "createdAt",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc` in any letter case selects ascending; everything else descends.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Requested slice of a sorted result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 0-based page index.
    pub page: u32,
    pub size: u32,
    pub sort_field: SortField,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_field: SortField::default(),
            direction: SortDirection::default(),
        }
    }
}

impl PageRequest {
    /// Creates a 0-based request sorted by `createdAt desc`.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            ..Self::default()
        }
    }

    /// Normalizes caller-facing paging input.
    ///
    /// - `page` is 1-based; values below 1 become 1.
    /// - `limit` is clamped to `[1, MAX_PAGE_SIZE]`.
    /// - Unknown sort names fall back to `createdAt` / `desc`.
    pub fn from_client(
        page: i64,
        limit: i64,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Self {
        let page = u32::try_from(page.max(1) - 1).unwrap_or(u32::MAX);
        let size = u32::try_from(limit.clamp(1, i64::from(MAX_PAGE_SIZE))).unwrap_or(MAX_PAGE_SIZE);
        Self {
            page,
            size,
            sort_field: SortField::parse_or_default(sort_by),
            direction: SortDirection::parse_or_default(sort_order),
        }
    }

    pub fn with_sort(mut self, sort_field: SortField, direction: SortDirection) -> Self {
        self.sort_field = sort_field;
        self.direction = direction;
        self
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// 1-based page number as shown to callers.
    pub fn client_page(&self) -> u64 {
        u64::from(self.page) + 1
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            request,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.request.size))
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
