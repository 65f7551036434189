//! Resilience subsystem.
//!
//! # Components
//! - retries.rs: which upstream failures may be retried
//! - backoff.rs: exponential backoff with jitter between attempts
//!
//! # Design Decisions
//! - Retries bounded by `retries.max_attempts`
//! - Non-idempotent requests are forwarded exactly once

pub mod backoff;
pub mod retries;
