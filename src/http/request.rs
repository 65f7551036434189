//! Inbound request inspection.
//!
//! # Responsibilities
//! - Extract the routing target (host, path) from a request
//! - Read the request ID set by the request-id layer
//! - Decide which headers survive the hop to an upstream
//!
//! # Design Decisions
//! - `Host` header wins; the URI authority is used for absolute-form requests
//! - Hop-by-hop headers are never forwarded

use axum::http::{header, HeaderMap, HeaderName, Request};

use crate::routing::RequestTarget;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_GATEWAY_ROUTE: &str = "x-gateway-route";

const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Raw host of a request, if any.
pub fn request_host<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
}

/// Host and path as the dispatcher sees them.
pub fn request_target<B>(request: &Request<B>) -> RequestTarget {
    RequestTarget::new(request_host(request), request.uri().path())
}

pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Copy of `headers` without hop-by-hop fields.
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in HOP_BY_HOP.iter() {
        out.remove(name);
    }
    out.remove("keep-alive");
    out.remove(header::UPGRADE);
    out
}
