//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Path policy sanity (leading slashes, reachable viewer gate)
//! - Upstream and listener addresses are well-formed
//! - Timeouts are non-zero
//! - Every plan carries usable price ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: path {value:?} must start with '/'")]
    RelativePath { field: &'static str, value: String },

    #[error("routing.viewer_prefix {0:?} is not covered by routing.public_prefixes")]
    UnreachableViewerGate(String),

    #[error("{field}: {value:?} is not a valid host:port")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("billing plan {plan:?}: {reason}")]
    InvalidPlan { plan: String, reason: &'static str },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let routing = &config.routing;

    for path in &routing.public_paths {
        check_path("routing.public_paths", path, &mut errors);
    }
    for prefix in &routing.public_prefixes {
        check_path("routing.public_prefixes", prefix, &mut errors);
    }
    for prefix in &routing.bypass_prefixes {
        check_path("routing.bypass_prefixes", prefix, &mut errors);
    }
    check_path("routing.viewer_prefix", &routing.viewer_prefix, &mut errors);
    check_path("routing.not_found_path", &routing.not_found_path, &mut errors);

    // Viewer paths must survive the application rule to ever reach the gate.
    if routing.viewer_prefix.starts_with('/')
        && !routing
            .public_prefixes
            .iter()
            .any(|p| routing.viewer_prefix.starts_with(p.as_str()))
    {
        errors.push(ValidationError::UnreachableViewerGate(routing.viewer_prefix.clone()));
    }

    if config.deployment.base_host.trim().is_empty() {
        errors.push(ValidationError::Empty("deployment.base_host"));
    }
    if config.deployment.dev_marker.trim().is_empty() {
        errors.push(ValidationError::Empty("deployment.dev_marker"));
    }

    for (field, secs) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("billing.checkout_timeout_secs", config.billing.checkout_timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    check_socket("listener.bind_address", &config.listener.bind_address, &mut errors);
    check_authority("upstreams.custom_domain", &config.upstreams.custom_domain, &mut errors);
    check_authority("upstreams.application", &config.upstreams.application, &mut errors);
    if let Some(public) = &config.upstreams.public {
        check_authority("upstreams.public", public, &mut errors);
    }
    if config.admin.enabled {
        check_socket("admin.bind_address", &config.admin.bind_address, &mut errors);
    }

    for plan in &config.billing.plans {
        if plan.name.trim().is_empty() {
            errors.push(ValidationError::Empty("billing.plans.name"));
        }
        for price in [&plan.monthly, &plan.yearly] {
            if price.production_price_id.is_empty() || price.test_price_id.is_empty() {
                errors.push(ValidationError::InvalidPlan {
                    plan: plan.name.clone(),
                    reason: "price ids must not be empty",
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_path(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if !value.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            field,
            value: value.to_string(),
        });
    }
}

fn check_socket(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_authority(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let valid = value
        .parse::<Authority>()
        .map(|a| a.port_u16().is_some())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
