//! Routing policy data.
//!
//! The allowlists and blocklists the dispatcher consults. They are plain data
//! compiled from configuration, so a deployment can swap them without touching
//! the rule order in [`crate::routing::router`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::GatewayConfig;

/// Hosts recognized as belonging to the product itself.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FirstPartyHosts {
    /// Matched anywhere in the host (covers subdomains and ports).
    contains: Vec<String>,
    /// Matched at the end of the host (wildcard preview deployments).
    suffixes: Vec<String>,
}

impl FirstPartyHosts {
    pub fn new<I, J>(contains: I, suffixes: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        let normalize = |s: String| s.trim().to_ascii_lowercase();
        Self {
            contains: contains
                .into_iter()
                .map(|s| normalize(s.into()))
                .filter(|s| !s.is_empty())
                .collect(),
            suffixes: suffixes
                .into_iter()
                .map(|s| normalize(s.into()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Whether a (lower-cased) host is first-party.
    pub fn recognizes(&self, host: &str) -> bool {
        self.contains.iter().any(|h| host.contains(h.as_str()))
            || self.suffixes.iter().any(|s| host.ends_with(s.as_str()))
    }
}

/// Paths served without application auth.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicPaths {
    exact: BTreeSet<String>,
    prefixes: Vec<String>,
}

impl PublicPaths {
    pub fn new<I, J>(exact: I, prefixes: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        Self {
            exact: exact.into_iter().map(Into::into).collect(),
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.exact.contains(path) || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Substrings that are never valid inside a viewer path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BlockedPaths {
    fragments: Vec<String>,
}

impl BlockedPaths {
    pub fn new<I>(fragments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(Into::into)
                .filter(|f: &String| !f.is_empty())
                .collect(),
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

/// Everything the dispatcher needs besides the request and the mode.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoutingPolicy {
    pub dev_marker: String,
    pub first_party: FirstPartyHosts,
    pub public: PublicPaths,
    pub viewer_prefix: String,
    pub blocked: BlockedPaths,
}

impl RoutingPolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let deployment = &config.deployment;
        let routing = &config.routing;

        let contains = [deployment.local_host.clone(), deployment.base_host.clone()]
            .into_iter()
            .chain(routing.extra_first_party_hosts.iter().cloned());

        Self {
            dev_marker: deployment.dev_marker.trim().to_ascii_lowercase(),
            first_party: FirstPartyHosts::new(contains, [deployment.preview_suffix.clone()]),
            public: PublicPaths::new(
                routing.public_paths.iter().cloned(),
                routing.public_prefixes.iter().cloned(),
            ),
            viewer_prefix: routing.viewer_prefix.clone(),
            blocked: BlockedPaths::new(routing.blocked_fragments.iter().cloned()),
        }
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_party_hosts() {
        let hosts = FirstPartyHosts::new(["localhost", "Papermark.io"], [".vercel.app"]);

        assert!(hosts.recognizes("localhost:3000"));
        assert!(hosts.recognizes("www.papermark.io"));
        assert!(hosts.recognizes("papermark-git-main.vercel.app"));
        assert!(!hosts.recognizes("docs.acme.com"));
        // suffix only matches at the end
        assert!(!hosts.recognizes("vercel.app.acme.com"));
    }

    #[test]
    fn test_public_paths() {
        let public = PublicPaths::new(["/", "/pricing"], ["/blog/", "/view/"]);

        assert!(public.is_public("/"));
        assert!(public.is_public("/pricing"));
        assert!(public.is_public("/blog/launch"));
        assert!(!public.is_public("/pricing/extra"));
        assert!(!public.is_public("/blog"));
        assert!(!public.is_public("/documents"));
    }

    #[test]
    fn test_policy_from_config_includes_extra_hosts() {
        let mut config = GatewayConfig::default();
        config.routing.extra_first_party_hosts.push("papermark.com".into());

        let policy = RoutingPolicy::from_config(&config);
        assert!(policy.first_party.recognizes("app.papermark.com"));
        assert!(policy.first_party.recognizes("localhost"));
    }

    #[test]
    fn test_blank_entries_dropped() {
        let hosts = FirstPartyHosts::new(["", "  "], [""]);
        // an empty pattern would otherwise match every host
        assert!(!hosts.recognizes("acme.com"));
        assert!(BlockedPaths::new([""]).fragments().is_empty());
    }
}
