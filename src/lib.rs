//! Edge gateway for a document-sharing product.

pub mod admin;
pub mod billing;
pub mod config;
pub mod documents;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod team;

pub use config::schema::GatewayConfig;
pub use http::{AppState, GatewayServer};
pub use lifecycle::Shutdown;
pub use routing::{Dispatcher, RoutingDecision};
