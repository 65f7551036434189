//! Mapping of subsystem errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::billing::BillingError;
use crate::documents::DocumentError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Document(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Document(DocumentError::InvalidTeam(_)) => StatusCode::BAD_REQUEST,
            ApiError::Document(DocumentError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Document(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Billing(BillingError::UnknownPlan(_) | BillingError::InvalidTeam) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Billing(BillingError::Provider(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "API request failed");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
