use serde::Serialize;
use utoipa::ToSchema;

/// Fixed page size for every listing endpoint
pub const PAGE_SIZE: i64 = 20;

pub fn default_page() -> i64 {
    1
}

/// Highest page whose offset still fits in an `i64`
pub const MAX_PAGE: i64 = i64::MAX / PAGE_SIZE;

/// A 1-indexed page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: i64,
}

impl PageRequest {
    /// Pages below 1 are clamped to the first page, pages past
    /// [`MAX_PAGE`] to the last addressable one
    pub fn new(number: i64) -> Self {
        Self {
            number: number.clamp(1, MAX_PAGE),
        }
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * PAGE_SIZE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(default_page())
    }
}

/// Listing direction. Anything other than `asc` sorts newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
