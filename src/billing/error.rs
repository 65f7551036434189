//! Billing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Invalid team id.")]
    InvalidTeam,

    #[error("Checkout provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for BillingError {
    fn from(e: reqwest::Error) -> Self {
        BillingError::Provider(e.to_string())
    }
}
