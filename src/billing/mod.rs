//! Billing subsystem.
//!
//! # Data Flow
//! ```text
//! GET  /api/pricing                          → pricing.rs (public tiers)
//! GET  /api/billing/plans/{plan}?period=     → plans.rs (upgrade dialog offer)
//! POST /api/teams/{team}/billing/upgrade     → plans.rs (price id for env)
//!                                            → checkout.rs (provider session)
//! ```
//!
//! # Design Decisions
//! - Prices and price ids are configuration, not code
//! - The payment provider is opaque: one call, one session id back

pub mod checkout;
pub mod error;
pub mod plans;
pub mod pricing;

pub use checkout::{BillingService, CheckoutProvider, CheckoutSession, HttpCheckoutProvider};
pub use error::BillingError;
pub use plans::{BillingEnvironment, BillingPeriod, PlanCatalog, PlanOffer};
