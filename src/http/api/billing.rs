//! Pricing and plan upgrade endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::billing::{pricing, BillingEnvironment, BillingPeriod, CheckoutSession, PlanOffer};
use crate::http::api::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct UpgradeParams {
    pub plan: String,
    #[serde(default)]
    pub period: BillingPeriod,
}

#[derive(Debug, Deserialize)]
pub struct OfferParams {
    #[serde(default)]
    pub period: BillingPeriod,
}

pub async fn get_pricing() -> Json<pricing::PricingTable> {
    Json(pricing::pricing_table())
}

/// `GET /api/billing/plans/{plan}?period=`
pub async fn get_plan_offer(
    State(state): State<AppState>,
    Path(plan): Path<String>,
    Query(params): Query<OfferParams>,
) -> Result<Json<PlanOffer>, ApiError> {
    Ok(Json(state.billing.catalog().offer(&plan, params.period)?))
}

/// `POST /api/teams/{team_id}/billing/upgrade?plan=&period=`
pub async fn upgrade(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Query(params): Query<UpgradeParams>,
) -> Result<Json<CheckoutSession>, ApiError> {
    let environment = BillingEnvironment::from(state.snapshot.load().mode());
    let session = state
        .billing
        .upgrade(&team_id, &params.plan, params.period, environment)
        .await?;
    Ok(Json(session))
}
