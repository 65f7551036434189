//! HTTP server setup and the gateway handler.
//!
//! # Responsibilities
//! - Create the Axum router (local API + gateway fallback)
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Dispatch every other request and carry out the decision
//! - Swap the routing snapshot when the config file changes
//!
//! # Request Flow
//! ```text
//! request
//!     → bypass prefix?        yes → application upstream
//!     → Dispatcher::explain
//!         CustomDomain        → custom-domain upstream (+ x-forwarded-host)
//!         Application         → application upstream
//!         PublicPage          → public upstream (or application)
//!         Blocked             → GET /404 from public upstream, status 404
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{header, uri::PathAndQuery, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::billing::{BillingError, BillingService, HttpCheckoutProvider, PlanCatalog};
use crate::config::{DeploymentMode, GatewayConfig};
use crate::documents::{FsBlobStore, MemoryDocumentRepository, UploadService};
use crate::http::api::api_routes;
use crate::http::forward::{Forwarder, Outbound};
use crate::http::request::{
    forwardable_headers, request_id, request_target, X_FORWARDED_HOST, X_GATEWAY_ROUTE,
};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{Dispatcher, RoutingDecision};

/// Config plus the dispatcher compiled from it. Replaced wholesale on reload.
#[derive(Debug)]
pub struct GatewaySnapshot {
    pub config: GatewayConfig,
    pub dispatcher: Dispatcher,
}

impl GatewaySnapshot {
    pub fn new(config: GatewayConfig) -> Self {
        let dispatcher = Dispatcher::from_config(&config);
        Self { config, dispatcher }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.config.deployment.mode
    }

    /// Paths that skip dispatch and go straight to the application.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.config
            .routing
            .bypass_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<ArcSwap<GatewaySnapshot>>,
    pub forwarder: Forwarder,
    pub documents: Arc<UploadService>,
    pub billing: Arc<BillingService>,
}

impl AppState {
    pub fn new(config: GatewayConfig, documents: Arc<UploadService>, billing: Arc<BillingService>) -> Self {
        let forwarder = Forwarder::new(Duration::from_secs(config.timeouts.connect_secs));
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(GatewaySnapshot::new(config))),
            forwarder,
            documents,
            billing,
        }
    }

    /// Build state with the filesystem blob store, in-memory records and the HTTP checkout provider.
    pub fn from_config(config: GatewayConfig) -> Result<Self, BillingError> {
        let documents = UploadService::new(
            Arc::new(FsBlobStore::new(&config.storage.blob_root)),
            Arc::new(MemoryDocumentRepository::new()),
            config.deployment.base_url.clone(),
        );
        let billing = BillingService::new(
            PlanCatalog::from_config(&config.billing),
            Arc::new(HttpCheckoutProvider::new(&config.billing)?),
        );
        Ok(Self::new(config, Arc::new(documents), Arc::new(billing)))
    }
}

/// The public-facing gateway server.
pub struct GatewayServer {
    router: Router,
    state: AppState,
}

impl GatewayServer {
    pub fn new(state: AppState) -> Self {
        let config = state.snapshot.load().config.clone();
        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let max_body = config.listener.max_body_bytes;

        // Other methods on local API paths belong to the application.
        api_routes()
            .method_not_allowed_fallback(gateway_handler)
            .fallback(gateway_handler)
            .with_state(state)
            .layer(DefaultBodyLimit::max(max_body))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(max_body))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Serve until `shutdown` fires. Config updates replace the routing snapshot.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway server starting");

        let snapshot = self.state.snapshot.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                apply_config(&snapshot, config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

/// Replace the routing snapshot. Listener, storage and billing settings need a restart.
pub fn apply_config(snapshot: &ArcSwap<GatewaySnapshot>, config: GatewayConfig) {
    let current = snapshot.load();
    if current.config.listener.bind_address != config.listener.bind_address {
        tracing::warn!("listener.bind_address changed; restart required to take effect");
    }
    tracing::info!(
        mode = %config.deployment.mode,
        base_host = %config.deployment.base_host,
        "Routing configuration reloaded"
    );
    snapshot.store(Arc::new(GatewaySnapshot::new(config)));
    metrics::record_config_reload(true);
}

/// Catch-all handler: dispatch, then forward or rewrite.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let snapshot = state.snapshot.load_full();
    let target = request_target(&request);
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, snapshot.config.listener.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => return response::payload_too_large(),
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));
    let mut outbound = Outbound {
        method: method.clone(),
        path_and_query,
        headers: forwardable_headers(&parts.headers),
        body,
    };

    if snapshot.is_bypassed(target.path()) {
        let upstream = snapshot.config.upstreams.application.clone();
        let res = forward(&state, &snapshot, &upstream, &outbound, &request_id).await;
        metrics::record_request(method.as_str(), res.status().as_u16(), "bypass", start);
        return res;
    }

    let matched = snapshot.dispatcher.explain(&target, snapshot.mode());
    metrics::record_dispatch(matched.decision);
    tracing::debug!(
        request_id = %request_id,
        host = ?target.host(),
        path = %target.path(),
        rule = matched.rule,
        decision = %matched.decision,
        "Request dispatched"
    );

    let upstreams = &snapshot.config.upstreams;
    let res = match matched.decision {
        RoutingDecision::CustomDomain => {
            if let Some(host) = target.host().and_then(|h| HeaderValue::from_str(h).ok()) {
                outbound.headers.insert(X_FORWARDED_HOST, host);
            }
            route_header(&mut outbound.headers, matched.decision);
            forward(&state, &snapshot, &upstreams.custom_domain, &outbound, &request_id).await
        }
        RoutingDecision::Application => {
            route_header(&mut outbound.headers, matched.decision);
            forward(&state, &snapshot, &upstreams.application, &outbound, &request_id).await
        }
        RoutingDecision::PublicPage => {
            forward(&state, &snapshot, upstreams.public_or_application(), &outbound, &request_id).await
        }
        RoutingDecision::Blocked => not_found_rewrite(&state, &snapshot, &outbound, &request_id).await,
    };

    metrics::record_request(method.as_str(), res.status().as_u16(), matched.decision.as_str(), start);
    res
}

fn route_header(headers: &mut HeaderMap, decision: RoutingDecision) {
    headers.insert(X_GATEWAY_ROUTE, HeaderValue::from_static(decision.as_str()));
}

async fn forward(
    state: &AppState,
    snapshot: &GatewaySnapshot,
    upstream: &str,
    outbound: &Outbound,
    request_id: &str,
) -> Response {
    match state
        .forwarder
        .send(upstream, outbound, &snapshot.config.retries, request_id)
        .await
    {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Forwarding failed");
            response::bad_gateway()
        }
    }
}

/// Serve the public 404 page in place of a blocked path; the client URL is unchanged.
async fn not_found_rewrite(
    state: &AppState,
    snapshot: &GatewaySnapshot,
    original: &Outbound,
    request_id: &str,
) -> Response {
    let Ok(path_and_query) = snapshot.config.routing.not_found_path.parse::<PathAndQuery>() else {
        return response::not_found_page();
    };
    let mut headers = original.headers.clone();
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::CONTENT_TYPE);
    let outbound = Outbound {
        method: Method::GET,
        path_and_query,
        headers,
        body: Default::default(),
    };

    let upstream = snapshot.config.upstreams.public_or_application();
    match state
        .forwarder
        .send(upstream, &outbound, &snapshot.config.retries, request_id)
        .await
    {
        Ok(mut res) if res.status().is_success() || res.status() == StatusCode::NOT_FOUND => {
            *res.status_mut() = StatusCode::NOT_FOUND;
            res.into_response()
        }
        Ok(res) => {
            tracing::warn!(request_id = %request_id, status = %res.status(), "Upstream 404 page unavailable");
            response::not_found_page()
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Upstream 404 page unavailable");
            response::not_found_page()
        }
    }
}
