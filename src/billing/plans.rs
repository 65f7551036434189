//! Plan catalog and price resolution.

use serde::{Deserialize, Serialize};

use crate::billing::error::BillingError;
use crate::config::{BillingConfig, DeploymentMode, PlanConfig, PriceConfig};

/// Billing cadence offered in the upgrade dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn label(self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "Monthly",
            BillingPeriod::Yearly => "Yearly",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            BillingPeriod::Monthly => BillingPeriod::Yearly,
            BillingPeriod::Yearly => BillingPeriod::Monthly,
        }
    }
}

/// Which set of price ids checkout uses. Live prices only in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingEnvironment {
    Production,
    Test,
}

impl From<DeploymentMode> for BillingEnvironment {
    fn from(mode: DeploymentMode) -> Self {
        match mode {
            DeploymentMode::Production => BillingEnvironment::Production,
            DeploymentMode::Development => BillingEnvironment::Test,
        }
    }
}

const BASE_FEATURES: [&str; 7] = [
    "Custom domains",
    "Custom branding",
    "Notion documents",
    "Unlimited link views",
    "Unlimited documents",
    "Team members",
    "AI Document Assistant incl. 1500 credits",
];

/// Features listed for a plan in the upgrade dialog.
pub fn features(plan: &str) -> Vec<&'static str> {
    let mut features = BASE_FEATURES.to_vec();
    if plan.eq_ignore_ascii_case("Enterprise") {
        features.push("Priority Support");
    }
    features
}

/// Everything the upgrade dialog shows for one plan and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanOffer {
    pub plan: String,
    pub period: BillingPeriod,
    /// Price per month in euros, e.g. "€29/month".
    pub price_label: String,
    pub features: Vec<&'static str>,
    pub button_label: String,
    pub toggle_label: &'static str,
}

/// Purchasable plans, looked up by case-insensitive name.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<PlanConfig>,
}

impl PlanCatalog {
    pub fn from_config(config: &BillingConfig) -> Self {
        Self {
            plans: config.plans.clone(),
        }
    }

    pub fn find(&self, name: &str) -> Result<&PlanConfig, BillingError> {
        self.plans
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| BillingError::UnknownPlan(name.to_string()))
    }

    fn price(&self, name: &str, period: BillingPeriod) -> Result<&PriceConfig, BillingError> {
        let plan = self.find(name)?;
        Ok(match period {
            BillingPeriod::Monthly => &plan.monthly,
            BillingPeriod::Yearly => &plan.yearly,
        })
    }

    /// Checkout price id for a plan, period and environment.
    pub fn price_id(
        &self,
        name: &str,
        period: BillingPeriod,
        environment: BillingEnvironment,
    ) -> Result<&str, BillingError> {
        let price = self.price(name, period)?;
        Ok(match environment {
            BillingEnvironment::Production => &price.production_price_id,
            BillingEnvironment::Test => &price.test_price_id,
        })
    }

    pub fn offer(&self, name: &str, period: BillingPeriod) -> Result<PlanOffer, BillingError> {
        let plan = self.find(name)?;
        let price = self.price(name, period)?;
        Ok(PlanOffer {
            plan: plan.name.clone(),
            period,
            price_label: format!("€{}/month", price.amount),
            features: features(&plan.name),
            button_label: format!("Upgrade to {} {}", plan.name, period.label()),
            toggle_label: match period {
                BillingPeriod::Monthly => "Get 2 months free",
                BillingPeriod::Yearly => "Switch to monthly",
            },
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.plans.iter().map(|p| p.name.as_str()).collect()
    }
}
