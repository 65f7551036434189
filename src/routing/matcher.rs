//! Rule predicates.
//!
//! # Responsibilities
//! - Classify the host (first-party vs custom domain) under a deployment mode
//! - Match path allowlists, prefixes and substrings
//! - Combine conditions with AND / OR / NOT semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (host lower-cased in `RequestTarget`)
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching
//! - Predicates are pure: no I/O, no interior mutability

use crate::config::DeploymentMode;
use crate::routing::decision::RequestTarget;
use crate::routing::policy::{BlockedPaths, FirstPartyHosts, PublicPaths};

/// Everything a predicate may look at.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub target: &'a RequestTarget,
    pub mode: DeploymentMode,
}

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool;
}

/// Matches hosts that should be served as a tenant's custom domain.
///
/// In development only hosts carrying the dev marker count. Everywhere else
/// any host that is not first-party counts, including a missing host.
#[derive(Debug, Clone)]
pub struct CustomDomainMatcher {
    dev_marker: String,
    first_party: FirstPartyHosts,
}

impl CustomDomainMatcher {
    pub fn new(dev_marker: impl Into<String>, first_party: FirstPartyHosts) -> Self {
        Self {
            dev_marker: dev_marker.into().to_ascii_lowercase(),
            first_party,
        }
    }
}

impl Matcher for CustomDomainMatcher {
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool {
        let host = ctx.target.host();
        if ctx.mode.is_development() {
            !self.dev_marker.is_empty()
                && host.is_some_and(|h| h.contains(self.dev_marker.as_str()))
        } else {
            !host.is_some_and(|h| self.first_party.recognizes(h))
        }
    }
}

/// Matches paths on the public allowlist.
#[derive(Debug, Clone)]
pub struct PublicPathMatcher {
    paths: PublicPaths,
}

impl PublicPathMatcher {
    pub fn new(paths: PublicPaths) -> Self {
        Self { paths }
    }
}

impl Matcher for PublicPathMatcher {
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool {
        self.paths.is_public(ctx.target.path())
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool {
        ctx.target.path().starts_with(&self.prefix)
    }
}

/// Matches when the path contains any of the given fragments.
#[derive(Debug, Clone)]
pub struct PathContainsMatcher {
    fragments: Vec<String>,
}

impl PathContainsMatcher {
    pub fn new<I>(fragments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn blocked(blocked: &BlockedPaths) -> Self {
        Self::new(blocked.fragments().iter().cloned())
    }
}

impl Matcher for PathContainsMatcher {
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool {
        let path = ctx.target.path();
        self.fragments.iter().any(|f| path.contains(f.as_str()))
    }
}

/// Inverts another matcher.
#[derive(Debug)]
pub struct NotMatcher {
    inner: Box<dyn Matcher>,
}

impl NotMatcher {
    pub fn new(inner: Box<dyn Matcher>) -> Self {
        Self { inner }
    }
}

impl Matcher for NotMatcher {
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool {
        !self.inner.matches(ctx)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool {
        self.matchers.iter().all(|m| m.matches(ctx))
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, ctx: &DispatchContext<'_>) -> bool {
        self.matchers.iter().any(|m| m.matches(ctx))
    }
}

/// Matches every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysMatcher;

impl Matcher for AlwaysMatcher {
    fn matches(&self, _ctx: &DispatchContext<'_>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(matcher: &dyn Matcher, host: Option<&str>, path: &str, mode: DeploymentMode) -> bool {
        let target = RequestTarget::new(host, path);
        matcher.matches(&DispatchContext {
            target: &target,
            mode,
        })
    }

    fn custom_domain() -> CustomDomainMatcher {
        CustomDomainMatcher::new(
            "papermark-dev.local",
            FirstPartyHosts::new(["localhost", "papermark.io"], [".vercel.app"]),
        )
    }

    #[test]
    fn test_custom_domain_production() {
        let m = custom_domain();
        let prod = DeploymentMode::Production;

        assert!(check(&m, Some("docs.acme.com"), "/", prod));
        assert!(!check(&m, Some("www.papermark.io"), "/", prod));
        assert!(!check(&m, Some("LOCALHOST:3000"), "/", prod));
        assert!(!check(&m, Some("pr-12.vercel.app"), "/", prod));
        // no host at all is not first-party
        assert!(check(&m, None, "/", prod));
    }

    #[test]
    fn test_custom_domain_development() {
        let m = custom_domain();
        let dev = DeploymentMode::Development;

        assert!(check(&m, Some("acme.papermark-dev.local:3000"), "/", dev));
        assert!(!check(&m, Some("docs.acme.com"), "/", dev));
        assert!(!check(&m, None, "/", dev));
    }

    #[test]
    fn test_path_contains() {
        let m = PathContainsMatcher::new(["/.env", "."]);
        let prod = DeploymentMode::Production;

        assert!(check(&m, None, "/view/abc/.env", prod));
        assert!(check(&m, None, "/view/favicon.ico", prod));
        assert!(!check(&m, None, "/view/abc", prod));
    }

    #[test]
    fn test_combinators() {
        let prod = DeploymentMode::Production;
        let viewer_dot = AndMatcher::new(vec![
            Box::new(PathPrefixMatcher::new("/view/")),
            Box::new(PathContainsMatcher::new(["."])),
        ]);
        assert!(check(&viewer_dot, None, "/view/a.b", prod));
        assert!(!check(&viewer_dot, None, "/blog/a.b", prod));

        let not_public = NotMatcher::new(Box::new(PublicPathMatcher::new(PublicPaths::new(
            ["/pricing"],
            Vec::<String>::new(),
        ))));
        assert!(!check(&not_public, None, "/pricing", prod));
        assert!(check(&not_public, None, "/documents", prod));

        let any = AnyMatcher::new(vec![Box::new(AlwaysMatcher)]);
        assert!(check(&any, None, "/", prod));
        assert!(!check(&AnyMatcher::new(Vec::new()), None, "/", prod));
    }
}
