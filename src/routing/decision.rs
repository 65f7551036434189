//! Routing decision and the request data it is computed from.

use serde::Serialize;

/// The handling path chosen for a request.
///
/// Exactly one variant is produced per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingDecision {
    /// Tenant-owned host serving the document viewer.
    CustomDomain,
    /// Authenticated application route.
    Application,
    /// Public marketing, legal or viewer page, passed through unmodified.
    PublicPage,
    /// Viewer path rejected by the safety gate; served as a 404 rewrite.
    Blocked,
}

impl RoutingDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            RoutingDecision::CustomDomain => "custom-domain",
            RoutingDecision::Application => "application",
            RoutingDecision::PublicPage => "public-page",
            RoutingDecision::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host and path of an inbound request.
///
/// The host is lower-cased and trimmed on construction; an empty host is
/// treated as absent. The path is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    host: Option<String>,
    path: String,
}

impl RequestTarget {
    pub fn new(host: Option<&str>, path: impl Into<String>) -> Self {
        let host = host
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty());
        Self {
            host,
            path: path.into(),
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_normalized() {
        let target = RequestTarget::new(Some("  WWW.Papermark.IO:443 "), "/Pricing");
        assert_eq!(target.host(), Some("www.papermark.io:443"));
        // paths are case-sensitive
        assert_eq!(target.path(), "/Pricing");
    }

    #[test]
    fn test_blank_host_is_absent() {
        assert_eq!(RequestTarget::new(Some("   "), "/").host(), None);
        assert_eq!(RequestTarget::new(None, "/").host(), None);
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(RoutingDecision::CustomDomain.to_string(), "custom-domain");
        assert_eq!(
            serde_json::to_string(&RoutingDecision::PublicPage).unwrap(),
            "\"public-page\""
        );
    }
}
