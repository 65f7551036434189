//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Deployment identity: mode and first-party host names.
    pub deployment: DeploymentConfig,

    /// Path allowlists and blocklists used by the dispatcher.
    pub routing: RoutingConfig,

    /// Upstream handlers the dispatcher forwards to.
    pub upstreams: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for upstream forwarding.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Document blob storage.
    pub storage: StorageConfig,

    /// Plans, prices and the checkout provider.
    pub billing: BillingConfig,

    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes (uploads included).
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Deployment mode. Anything that is not development is treated as production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Development,
    #[default]
    Production,
}

impl DeploymentMode {
    pub fn is_development(self) -> bool {
        self == DeploymentMode::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentMode::Development => "development",
            DeploymentMode::Production => "production",
        }
    }
}

impl std::str::FromStr for DeploymentMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("development") {
            Ok(DeploymentMode::Development)
        } else {
            Ok(DeploymentMode::Production)
        }
    }
}

impl<'de> Deserialize<'de> for DeploymentMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // FromStr is infallible.
        Ok(raw.parse().unwrap_or_default())
    }
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Development or production.
    pub mode: DeploymentMode,

    /// Primary production domain (matched as a substring of the host).
    pub base_host: String,

    /// Preview deployment suffix (matched with `ends_with`).
    pub preview_suffix: String,

    /// Local host name treated as first-party outside development.
    pub local_host: String,

    /// Host marker that simulates a custom domain during development.
    pub dev_marker: String,

    /// Public base URL used to build share links.
    pub base_url: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Production,
            base_host: "papermark.io".to_string(),
            preview_suffix: ".vercel.app".to_string(),
            local_host: "localhost".to_string(),
            dev_marker: "papermark-dev.local".to_string(),
            base_url: "https://www.papermark.io".to_string(),
        }
    }
}

/// Path policy for the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Paths served without application auth (exact match).
    pub public_paths: Vec<String>,

    /// Path prefixes served without application auth.
    pub public_prefixes: Vec<String>,

    /// Prefix of the document viewer section.
    pub viewer_prefix: String,

    /// Fragments that block a viewer path when present anywhere in it.
    pub blocked_fragments: Vec<String>,

    /// Extra first-party host names on top of the deployment ones.
    pub extra_first_party_hosts: Vec<String>,

    /// Paths that never go through dispatch (static assets, API, internals).
    pub bypass_prefixes: Vec<String>,

    /// Page served (with status 404) for blocked viewer paths.
    pub not_found_path: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            public_paths: strings(&[
                "/",
                "/v1",
                "/register",
                "/privacy",
                "/oss-friends",
                "/pricing",
                "/docsend-alternatives",
                "/launch-week",
                "/open-source-investors",
                "/investors",
                "/ai",
                "/share-notion-page",
            ]),
            public_prefixes: strings(&["/alternatives", "/investors", "/blog/", "/view/"]),
            viewer_prefix: "/view/".to_string(),
            blocked_fragments: strings(&[
                "/phpmyadmin",
                "/server-status",
                "/wordpress",
                "/_all_dbs",
                "/wp-admin",
                "/wp-login",
                "/_wpeditor",
                "/.env",
                "/.git",
            ]),
            extra_first_party_hosts: Vec::new(),
            bypass_prefixes: strings(&[
                "/api/",
                "/_next/",
                "/_static",
                "/_vercel",
                "/ingest",
                "/favicon.ico",
                "/sitemap.xml",
            ]),
            not_found_path: "/404".to_string(),
        }
    }
}

/// Upstream handler addresses ("host:port").
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Resolves tenant domains to their viewer configuration.
    pub custom_domain: String,

    /// Authenticated application (performs session checks).
    pub application: String,

    /// Public marketing/viewer pages. Falls back to `application` when unset.
    pub public: Option<String>,
}

impl UpstreamConfig {
    pub fn public_or_application(&self) -> &str {
        self.public.as_deref().unwrap_or(&self.application)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            custom_domain: "127.0.0.1:3001".to_string(),
            application: "127.0.0.1:3000".to_string(),
            public: None,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts (first try included).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory under which uploaded blobs are written.
    pub blob_root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_root: "./data/blobs".to_string(),
        }
    }
}

/// Price of a plan for one billing period.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PriceConfig {
    /// Monthly amount in euros.
    pub amount: u32,
    /// Checkout price id used in production.
    pub production_price_id: String,
    /// Checkout price id used everywhere else.
    pub test_price_id: String,
}

/// A purchasable plan.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PlanConfig {
    pub name: String,
    pub monthly: PriceConfig,
    pub yearly: PriceConfig,
}

/// Billing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Checkout session endpoint of the payment provider.
    pub checkout_url: String,

    /// Provider request timeout in seconds.
    pub checkout_timeout_secs: u64,

    /// Purchasable plans.
    pub plans: Vec<PlanConfig>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        let price = |amount: u32, id: &str| PriceConfig {
            amount,
            production_price_id: format!("price_live_{id}"),
            test_price_id: format!("price_test_{id}"),
        };
        Self {
            checkout_url: "http://127.0.0.1:4242/checkout/sessions".to_string(),
            checkout_timeout_secs: 10,
            plans: vec![
                PlanConfig {
                    name: "Pro".to_string(),
                    monthly: price(29, "pro_monthly"),
                    yearly: price(24, "pro_yearly"),
                },
                PlanConfig {
                    name: "Business".to_string(),
                    monthly: price(79, "business_monthly"),
                    yearly: price(66, "business_yearly"),
                },
                PlanConfig {
                    name: "Enterprise".to_string(),
                    monthly: price(199, "enterprise_monthly"),
                    yearly: price(166, "enterprise_yearly"),
                },
            ],
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
