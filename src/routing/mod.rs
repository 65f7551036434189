//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path) + deployment mode
//!     → decision.rs (RequestTarget, host normalized)
//!     → router.rs (ordered rules, first match wins)
//!     → matcher.rs (evaluate predicates)
//!     → Return: RoutingDecision
//!
//! Rule Compilation (at startup and on reload):
//!     GatewayConfig
//!     → policy.rs (first-party hosts, public paths, blocked fragments)
//!     → compile matchers
//!     → Freeze as immutable Dispatcher
//! ```
//!
//! # Design Decisions
//! - Rules compiled up front, immutable at runtime
//! - No regex in hot path (prefix and substring matching only)
//! - Deterministic: same input always yields the same decision
//! - Total: the final rule always matches

pub mod decision;
pub mod matcher;
pub mod policy;
pub mod router;

pub use decision::{RequestTarget, RoutingDecision};
pub use policy::RoutingPolicy;
pub use router::{Dispatcher, Matched};
