//! Request dispatch.
//!
//! # Responsibilities
//! - Compile the routing policy into an ordered rule list
//! - Evaluate rules first-match-wins for each request
//! - Report which rule matched (admin explain)
//!
//! # Rule Order
//! ```text
//! 1. custom-domain   host is a tenant domain          → CustomDomain
//! 2. application     path is not on the public list   → Application
//! 3. viewer-blocked  viewer path with blocked fragment
//!                    or a '.' anywhere                 → Blocked
//! 4. public-page     everything else                   → PublicPage
//! ```
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Last rule always matches, so dispatch is total
//! - Deterministic: same input always yields the same decision

use crate::config::{DeploymentMode, GatewayConfig};
use crate::routing::decision::{RequestTarget, RoutingDecision};
use crate::routing::matcher::{
    AlwaysMatcher, AndMatcher, AnyMatcher, CustomDomainMatcher, DispatchContext, Matcher,
    NotMatcher, PathContainsMatcher, PathPrefixMatcher, PublicPathMatcher,
};
use crate::routing::policy::RoutingPolicy;

/// A predicate plus the decision it produces.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    matcher: Box<dyn Matcher>,
    pub decision: RoutingDecision,
}

impl Rule {
    pub fn new(name: &'static str, matcher: Box<dyn Matcher>, decision: RoutingDecision) -> Self {
        Self {
            name,
            matcher,
            decision,
        }
    }
}

/// The rule that decided a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Matched {
    pub rule: &'static str,
    pub decision: RoutingDecision,
}

const FALLBACK: Matched = Matched {
    rule: "public-page",
    decision: RoutingDecision::PublicPage,
};

/// Compiled, immutable dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    rules: Vec<Rule>,
    policy: RoutingPolicy,
}

impl Dispatcher {
    /// Compile the standard rule list for a policy.
    pub fn new(policy: RoutingPolicy) -> Self {
        let viewer_blocked = AndMatcher::new(vec![
            Box::new(PathPrefixMatcher::new(policy.viewer_prefix.clone())),
            Box::new(AnyMatcher::new(vec![
                Box::new(PathContainsMatcher::blocked(&policy.blocked)),
                Box::new(PathContainsMatcher::new(["."])),
            ])),
        ]);

        let rules = vec![
            Rule::new(
                "custom-domain",
                Box::new(CustomDomainMatcher::new(
                    policy.dev_marker.clone(),
                    policy.first_party.clone(),
                )),
                RoutingDecision::CustomDomain,
            ),
            Rule::new(
                "application",
                Box::new(NotMatcher::new(Box::new(PublicPathMatcher::new(
                    policy.public.clone(),
                )))),
                RoutingDecision::Application,
            ),
            Rule::new("viewer-blocked", Box::new(viewer_blocked), RoutingDecision::Blocked),
            Rule::new(FALLBACK.rule, Box::new(AlwaysMatcher), FALLBACK.decision),
        ];

        Self { rules, policy }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(RoutingPolicy::from_config(config))
    }

    /// Decide how a request is handled.
    pub fn dispatch(&self, host: Option<&str>, path: &str, mode: DeploymentMode) -> RoutingDecision {
        self.explain(&RequestTarget::new(host, path), mode).decision
    }

    /// Decide how a request is handled and name the rule that decided.
    pub fn explain(&self, target: &RequestTarget, mode: DeploymentMode) -> Matched {
        let ctx = DispatchContext { target, mode };
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&ctx))
            .map(|rule| Matched {
                rule: rule.name,
                decision: rule.decision,
            })
            .unwrap_or(FALLBACK)
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RoutingPolicy::default())
    }
}
