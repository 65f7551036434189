//! Local API served by the gateway itself.
//!
//! Any other `/api/*` path, or another method on one of these paths, falls
//! through to the gateway handler and is forwarded to the application upstream.

pub mod billing;
pub mod documents;
pub mod error;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;

pub use error::ApiError;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pricing", get(billing::get_pricing))
        .route("/api/billing/plans/{plan}", get(billing::get_plan_offer))
        .route("/api/teams/{team_id}/billing/upgrade", post(billing::upgrade))
        .route("/api/teams/{team_id}/documents", post(documents::add_notion_page))
        .route(
            "/api/teams/{team_id}/documents/upload",
            post(documents::upload_document),
        )
        .route(
            "/api/teams/{team_id}/documents/{document_id}",
            get(documents::get_document),
        )
        .route(
            "/api/teams/{team_id}/documents/{document_id}/versions",
            post(documents::upload_version),
        )
}
