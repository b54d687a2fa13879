// API Helper Functions
//
// Error constructors, upstream error mapping and pagination shared by every
// handler module.

use axum::{http::StatusCode, Json};
use tracing::warn;

use super::types::{ApiError, PageQuery};
use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, EXPLORER_TABLE_MAX_ROWS};
use crate::rank::Platform;
use crate::upstream::UpstreamError;

/// Standard error result type for API handlers
pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Helper to create a 404 Not Found error response
pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::NOT_FOUND, Json(ApiError::new(message)))
}

/// Helper to create a 500 Internal Server Error response
pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(message)),
    )
}

/// Helper to create a 400 Bad Request error response
pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(message)))
}

/// 404 when the upstream has no such resource, 500 for anything else
pub fn upstream_failure(resource: &str, e: &UpstreamError) -> (StatusCode, Json<ApiError>) {
    if e.is_not_found() {
        not_found(format!("{} not found", resource))
    } else {
        warn!(resource, error = %e, "Upstream lookup failed");
        internal_error(format!("Failed to fetch {}", resource.to_lowercase()))
    }
}

/// Unwrap a listing result, logging and substituting the default on failure
pub fn or_degraded<T: Default>(what: &str, result: Result<T, UpstreamError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(what, error = %e, "Upstream unavailable, returning empty result");
        T::default()
    })
}

pub fn parse_platform(platform: &str) -> Result<Platform, (StatusCode, Json<ApiError>)> {
    platform
        .parse::<Platform>()
        .map_err(|_| bad_request("Invalid platform"))
}

/// Effective pagination: `page` is 1-indexed, `page_size` within
/// `1..=EXPLORER_TABLE_MAX_ROWS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn from_query(query: &PageQuery) -> Self {
        let page = match parse_int(query.page.as_deref()) {
            Some(page) if page >= 1 => page.min(u32::MAX as i64) as u32,
            Some(_) => 1,
            None => DEFAULT_PAGE,
        };
        let page_size = match parse_int(query.page_size.as_deref()) {
            Some(size) if size >= 1 => size.min(EXPLORER_TABLE_MAX_ROWS as i64) as u32,
            _ => DEFAULT_PAGE_SIZE,
        };
        Pagination { page, page_size }
    }

    /// 0-indexed page for upstreams that count from zero
    pub fn zero_indexed_page(&self) -> u32 {
        self.page - 1
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn parse_int(value: Option<&str>) -> Option<i64> {
    value?.trim().parse::<i64>().ok()
}

pub fn is_hex_hash(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}
