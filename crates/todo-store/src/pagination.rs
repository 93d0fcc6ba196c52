//! Page and page-size normalization.
//!
//! Both functions are total: malformed or out-of-range input falls back to
//! the default instead of failing.

/// Page used when the input is missing, malformed, or negative.
pub const DEFAULT_PAGE: i64 = 0;

/// Page size used when the input is missing, malformed, or not positive.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Zero-indexed page number from raw input.
pub fn normalize_page(input: &str) -> i64 {
    input.parse::<i64>().map_or(DEFAULT_PAGE, page_or_default)
}

/// Page size from raw input.
pub fn normalize_per_page(input: &str) -> i64 {
    input.parse::<i64>().map_or(DEFAULT_PER_PAGE, per_page_or_default)
}

/// `page` if it is a valid zero-indexed page, else [`DEFAULT_PAGE`].
pub fn page_or_default(page: i64) -> i64 {
    if page < 0 { DEFAULT_PAGE } else { page }
}

/// `per_page` if it is positive, else [`DEFAULT_PER_PAGE`].
pub fn per_page_or_default(per_page: i64) -> i64 {
    if per_page <= 0 { DEFAULT_PER_PAGE } else { per_page }
}

/// Row offset of `page`, saturating instead of overflowing.
pub fn offset(page: i64, per_page: i64) -> i64 {
    page.saturating_mul(per_page)
}
