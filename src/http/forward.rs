//! Upstream forwarding with retries.
//!
//! # Responsibilities
//! - Rewrite the request URI to the chosen upstream
//! - Send it over the shared pooled client
//! - Retry idempotent requests on 502/503/504 or connect errors
//!
//! # Design Decisions
//! - The request body is buffered so every attempt sends the same bytes
//! - The final upstream response is returned as-is, whatever its status
//! - One client for all upstreams (connection pooling per host)

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{uri::PathAndQuery, HeaderMap, Method, Request, Response, Uri},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::RetryConfig;
use crate::resilience::backoff::Backoff;
use crate::resilience::retries::is_retryable;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream address {0}")]
    InvalidUpstream(String),

    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// A request ready to be sent to any upstream.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub method: Method,
    pub path_and_query: PathAndQuery,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Outbound {
    fn to_request(&self, upstream: &str) -> Result<Request<Body>, ForwardError> {
        let uri = Uri::builder()
            .scheme("http")
            .authority(upstream)
            .path_and_query(self.path_and_query.clone())
            .build()
            .map_err(|_| ForwardError::InvalidUpstream(upstream.to_string()))?;

        let mut builder = Request::builder().method(self.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers.clone());
        }
        Ok(builder.body(Body::from(self.body.clone()))?)
    }
}

/// Pooled HTTP client shared by every forwarding path.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
}

impl Forwarder {
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
        }
    }

    /// Send `outbound` to `upstream` ("host:port"), retrying per `retries`.
    pub async fn send(
        &self,
        upstream: &str,
        outbound: &Outbound,
        retries: &RetryConfig,
        request_id: &str,
    ) -> Result<Response<Body>, ForwardError> {
        let max_attempts = if retries.enabled && outbound.method.is_idempotent() {
            retries.max_attempts.max(1)
        } else {
            1
        };
        let backoff = Backoff::from(retries);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = outbound.to_request(upstream)?;

            match self.client.request(request).await {
                Ok(response) => {
                    let status = response.status();
                    if attempt < max_attempts && is_retryable(&outbound.method, Some(status), false) {
                        let delay = backoff.delay(attempt);
                        tracing::info!(
                            request_id = %request_id,
                            upstream = %upstream,
                            attempt,
                            status = %status,
                            delay = ?delay,
                            "Retrying request"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    let (parts, body) = response.into_parts();
                    return Ok(Response::from_parts(parts, Body::new(body)));
                }
                Err(e) => {
                    tracing::warn!(
                        request_id = %request_id,
                        upstream = %upstream,
                        attempt,
                        error = %e,
                        "Upstream error"
                    );
                    if attempt < max_attempts && is_retryable(&outbound.method, None, true) {
                        let delay = backoff.delay(attempt);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(ForwardError::Upstream(e));
                }
            }
        }
    }
}
