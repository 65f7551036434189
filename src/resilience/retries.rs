//! Retry policy for upstream forwarding.
//!
//! # Design Decisions
//! - Only idempotent methods are retried
//! - Retry on connect errors and on 502/503/504 from the upstream
//! - Other statuses (including 500) are returned to the client as-is

use axum::http::{Method, StatusCode};

/// Whether an attempt that ended with `status` (or a transport error) may be retried.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, transport_error: bool) -> bool {
    if !method.is_idempotent() {
        return false;
    }
    if transport_error {
        return true;
    }
    matches!(
        status,
        Some(StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT)
    )
}
