//! Limit/offset clamping for list endpoints.

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Negative offsets are treated as zero.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
