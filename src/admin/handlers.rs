use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::{DeploymentMode, UpstreamConfig};
use crate::http::server::AppState;
use crate::routing::{Matched, RequestTarget, RoutingPolicy};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub mode: DeploymentMode,
}

#[derive(Serialize)]
pub struct RoutingSnapshot {
    pub mode: DeploymentMode,
    pub rules: Vec<&'static str>,
    pub policy: RoutingPolicy,
    pub bypass_prefixes: Vec<String>,
    pub upstreams: UpstreamConfig,
}

#[derive(Debug, Deserialize)]
pub struct ExplainParams {
    pub host: Option<String>,
    pub path: String,
}

#[derive(Serialize)]
pub struct Explanation {
    pub host: Option<String>,
    pub path: String,
    /// Set when the path skips dispatch entirely.
    pub bypassed: bool,
    #[serde(flatten)]
    pub matched: Matched,
}

#[derive(Serialize)]
pub struct DocumentCount {
    pub count: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        mode: state.snapshot.load().mode(),
    })
}

pub async fn get_routing(State(state): State<AppState>) -> Json<RoutingSnapshot> {
    let snapshot = state.snapshot.load_full();
    Json(RoutingSnapshot {
        mode: snapshot.mode(),
        rules: snapshot.dispatcher.rule_names(),
        policy: snapshot.dispatcher.policy().clone(),
        bypass_prefixes: snapshot.config.routing.bypass_prefixes.clone(),
        upstreams: snapshot.config.upstreams.clone(),
    })
}

pub async fn get_explain(
    State(state): State<AppState>,
    Query(params): Query<ExplainParams>,
) -> Json<Explanation> {
    let snapshot = state.snapshot.load_full();
    let target = RequestTarget::new(params.host.as_deref(), params.path.as_str());
    Json(Explanation {
        host: target.host().map(str::to_string),
        path: target.path().to_string(),
        bypassed: snapshot.is_bypassed(target.path()),
        matched: snapshot.dispatcher.explain(&target, snapshot.mode()),
    })
}

pub async fn get_document_count(State(state): State<AppState>) -> Json<DocumentCount> {
    Json(DocumentCount {
        count: state.documents.count().await,
    })
}
