//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, gateway handler)
//!     → api/ (local document and billing endpoints)
//!     → request.rs (host/path extraction, header filtering)
//!     → [routing layer decides the handling path]
//!     → forward.rs (upstream call with retries)
//!     → response.rs (built-in 404, 502)
//!     → Send to client
//! ```

pub mod api;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use server::{AppState, GatewayServer, GatewaySnapshot};
