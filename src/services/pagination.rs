/// The first page number.
const DEFAULT_PAGE: i64 = 1;
/// The smallest accepted page size.
const MIN_PER_PAGE: i64 = 1;
/// The largest accepted page size.
const MAX_PER_PAGE: i64 = 100;

/// A parsed and clamped pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

/// Parses pagination query parameters leniently.
///
/// Non-numeric input falls back to the defaults instead of rejecting the
/// request; out-of-range values are clamped to page >= 1 and
/// 1 <= perPage <= 100.
pub fn parse(page: Option<&str>, per_page: Option<&str>, default_per_page: i64) -> Pagination {
    let page = page
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(DEFAULT_PAGE)
        .max(DEFAULT_PAGE);

    let per_page = per_page
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(default_per_page)
        .clamp(MIN_PER_PAGE, MAX_PER_PAGE);

    Pagination { page, per_page }
}
