//! Checkout sessions with the external payment provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::billing::error::BillingError;
use crate::billing::plans::{BillingEnvironment, BillingPeriod, PlanCatalog};
use crate::config::BillingConfig;
use crate::team::is_valid_team_id;

/// A checkout session the client is redirected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(&self, team_id: &str, price_id: &str) -> Result<CheckoutSession, BillingError>;
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    team_id: &'a str,
    price_id: &'a str,
}

/// Creates sessions by POSTing JSON to the provider's endpoint.
#[derive(Debug, Clone)]
pub struct HttpCheckoutProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCheckoutProvider {
    pub fn new(config: &BillingConfig) -> Result<Self, BillingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.checkout_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.checkout_url.clone(),
        })
    }
}

#[async_trait]
impl CheckoutProvider for HttpCheckoutProvider {
    async fn create_session(&self, team_id: &str, price_id: &str) -> Result<CheckoutSession, BillingError> {
        let res = self
            .client
            .post(&self.endpoint)
            .json(&SessionRequest { team_id, price_id })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(BillingError::Provider(format!("provider returned {status}")));
        }
        Ok(res.json::<CheckoutSession>().await?)
    }
}

/// Resolves prices and opens checkout sessions for plan upgrades.
///
/// The billing environment is passed per call so it always follows the
/// deployment mode of the live config.
pub struct BillingService {
    catalog: PlanCatalog,
    provider: Arc<dyn CheckoutProvider>,
}

impl BillingService {
    pub fn new(catalog: PlanCatalog, provider: Arc<dyn CheckoutProvider>) -> Self {
        Self { catalog, provider }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub async fn upgrade(
        &self,
        team_id: &str,
        plan: &str,
        period: BillingPeriod,
        environment: BillingEnvironment,
    ) -> Result<CheckoutSession, BillingError> {
        if !is_valid_team_id(team_id) {
            return Err(BillingError::InvalidTeam);
        }
        let price_id = self.catalog.price_id(plan, period, environment)?;

        let session = self.provider.create_session(team_id, price_id).await.map_err(|e| {
            tracing::error!(team_id = %team_id, price_id = %price_id, error = %e, "Checkout session failed");
            e
        })?;

        tracing::info!(
            team_id = %team_id,
            plan = %plan,
            period = ?period,
            environment = ?environment,
            session_id = %session.id,
            "Checkout session created"
        );
        Ok(session)
    }
}
