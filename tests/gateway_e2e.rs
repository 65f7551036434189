//! End-to-end tests: real listener, mock upstreams, reqwest client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use doc_gateway::billing::{BillingError, CheckoutProvider, CheckoutSession};
use doc_gateway::config::DeploymentMode;
use doc_gateway::http::server::apply_config;

mod common;

use common::{client, spawn_gateway, start_fixed_upstream, start_upstream, test_config, test_state};

const FIRST_PARTY: &str = "www.papermark.io";

struct Upstreams {
    custom: common::MockUpstream,
    app: common::MockUpstream,
    public: common::MockUpstream,
}

async fn upstreams() -> Upstreams {
    Upstreams {
        custom: start_fixed_upstream("custom-domain").await,
        app: start_fixed_upstream("application").await,
        public: start_upstream(|req, _| {
            if req.path == "/404" {
                (200, "<h1>public not found</h1>".to_string())
            } else {
                (200, "public".to_string())
            }
        })
        .await,
    }
}

fn config_for(u: &Upstreams) -> doc_gateway::GatewayConfig {
    test_config(&u.custom.authority(), &u.app.authority(), &u.public.authority())
}

#[tokio::test]
async fn test_custom_domain_forwarded_with_host() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;

    let res = client()
        .get(format!("http://{}/view/abc", addr))
        .header("host", "docs.acme.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-request-id").is_some());
    assert_eq!(res.text().await.unwrap(), "custom-domain");

    let seen = u.custom.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/view/abc");
    assert_eq!(seen[0].header("x-forwarded-host"), Some("docs.acme.com"));
    assert_eq!(seen[0].header("x-gateway-route"), Some("custom-domain"));
    assert!(seen[0].header("x-request-id").is_some());
    assert_eq!(u.app.count() + u.public.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_application_and_public_pages() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;
    let client = client();

    let res = client
        .get(format!("http://{}/documents/123?tab=links", addr))
        .header("host", FIRST_PARTY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "application");
    let app_seen = u.app.requests();
    assert_eq!(app_seen[0].path, "/documents/123?tab=links");
    assert_eq!(app_seen[0].header("x-gateway-route"), Some("application"));

    let res = client
        .get(format!("http://{}/pricing", addr))
        .header("host", FIRST_PARTY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "public");
    // public pages pass through unmodified
    assert_eq!(u.public.requests()[0].header("x-gateway-route"), None);

    shutdown.trigger();
}

#[tokio::test]
async fn test_blocked_viewer_path_rewritten_to_404() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;

    let res = client()
        .get(format!("http://{}/view/secret.env", addr))
        .header("host", FIRST_PARTY)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "<h1>public not found</h1>");
    let seen = u.public.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/404");

    shutdown.trigger();
}

#[tokio::test]
async fn test_blocked_falls_back_to_builtin_page() {
    let u = upstreams().await;
    let mut config = config_for(&u);
    config.upstreams.public = Some(common::closed_address().await);
    let (addr, shutdown) = spawn_gateway(test_state(config)).await;

    let res = client()
        .get(format!("http://{}/view/x/wp-admin", addr))
        .header("host", FIRST_PARTY)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.text().await.unwrap().contains("Page not found"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_bypass_prefix_skips_dispatch() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;

    // a tenant host would otherwise go to the custom-domain upstream
    let res = client()
        .get(format!("http://{}/_next/static/chunk.js", addr))
        .header("host", "docs.acme.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.text().await.unwrap(), "application");
    assert_eq!(u.custom.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_other_methods_on_local_api_paths_reach_application() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;
    let client = client();

    let calls = [
        (Method::GET, "/api/teams/t1/documents"),
        (Method::DELETE, "/api/teams/t1/documents/d1"),
        (Method::PUT, "/api/teams/t1/documents/d1"),
        (Method::GET, "/api/teams/t1/billing/upgrade"),
    ];
    for (method, path) in &calls {
        let res = client
            .request(method.clone(), format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{method} {path}");
        assert_eq!(res.text().await.unwrap(), "application");
    }

    let seen = u.app.requests();
    assert_eq!(seen.len(), calls.len());
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/teams/t1/documents");
    assert_eq!(seen[1].method, "DELETE");
    assert_eq!(seen[1].path, "/api/teams/t1/documents/d1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_retry_on_unavailable_upstream() {
    let u = upstreams().await;
    let flaky = start_upstream(|_, previous| {
        if previous < 2 {
            (503, "Service Unavailable".to_string())
        } else {
            (200, "Success".to_string())
        }
    })
    .await;
    let mut config = config_for(&u);
    config.upstreams.application = flaky.authority();
    let (addr, shutdown) = spawn_gateway(test_state(config)).await;

    let res = client()
        .get(format!("http://{}/settings", addr))
        .header("host", FIRST_PARTY)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK, "Should eventually succeed after retries");
    assert_eq!(flaky.count(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_post_not_retried() {
    let u = upstreams().await;
    let down = start_upstream(|_, _| (503, "Service Unavailable".to_string())).await;
    let mut config = config_for(&u);
    config.upstreams.application = down.authority();
    let (addr, shutdown) = spawn_gateway(test_state(config)).await;

    let res = client()
        .post(format!("http://{}/settings", addr))
        .header("host", FIRST_PARTY)
        .body("x=1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(down.count(), 1);
    assert_eq!(down.requests()[0].body, b"x=1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let u = upstreams().await;
    let mut config = config_for(&u);
    config.upstreams.application = common::closed_address().await;
    let (addr, shutdown) = spawn_gateway(test_state(config)).await;

    let res = client()
        .get(format!("http://{}/documents/1", addr))
        .header("host", FIRST_PARTY)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    shutdown.trigger();
}

#[tokio::test]
async fn test_upload_then_new_version() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;
    let client = client();

    let res = client
        .post(format!("http://{}/api/teams/team_1/documents/upload?name=deck.pdf", addr))
        .header("content-type", "application/pdf")
        .body("%PDF-1.4 /Type /Page /Type /Page")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let document_id = created["document_id"].as_str().unwrap().to_string();
    let link_id = created["link_ids"][0].as_str().unwrap().to_string();
    assert_eq!(created["version"], 1);
    assert_eq!(created["num_pages"], 2);
    assert_eq!(
        created["share_url"],
        format!("https://www.papermark.io/view/{}", link_id)
    );

    let res = client
        .post(format!(
            "http://{}/api/teams/team_1/documents/{}/versions?name=deck-v2.pdf",
            addr, document_id
        ))
        .body("%PDF-1.4 /Type /Page")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let version: Value = res.json().await.unwrap();
    assert_eq!(version["version"], 2);
    assert_eq!(version["link_ids"][0], link_id.as_str());

    let res = client
        .get(format!("http://{}/api/teams/team_1/documents/{}", addr, document_id))
        .send()
        .await
        .unwrap();
    let doc: Value = res.json().await.unwrap();
    let versions = doc["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["is_primary"], false);
    assert_eq!(versions[1]["is_primary"], true);

    // local API routes never reach the application upstream
    assert_eq!(u.app.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_upload_validation_messages() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;
    let client = client();

    let res = client
        .post(format!("http://{}/api/teams/team_1/documents/upload?name=deck.pdf", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Please select a file to upload.");

    let res = client
        .post(format!("http://{}/api/teams/team_1/documents/missing/versions?name=a.pdf", addr))
        .body("%PDF")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_notion_page() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;
    let client = client();
    let url = format!("http://{}/api/teams/team_1/documents", addr);

    let res = client
        .post(&url)
        .json(&serde_json::json!({
            "url": "https://acme.notion.site/Q3-Board-Update-0123456789abcdef0123456789abcdef"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["name"], "Q3 Board Update");
    assert_eq!(created["num_pages"], 1);

    let res = client
        .post(&url)
        .json(&serde_json::json!({ "url": "https://acme.notion.site/Board" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Please enter a valid Notion link to proceed.");

    let res = client.post(&url).json(&serde_json::json!({})).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Please enter a Notion link to proceed.");

    shutdown.trigger();
}

#[tokio::test]
async fn test_upgrade_through_checkout_provider() {
    let u = upstreams().await;
    let checkout = start_upstream(|_, _| (200, r#"{"id":"cs_test_1"}"#.to_string())).await;
    let mut config = config_for(&u);
    config.billing.checkout_url = format!("http://{}/checkout/sessions", checkout.authority());
    let (addr, shutdown) = spawn_gateway(test_state(config)).await;
    let client = client();

    let res = client
        .post(format!(
            "http://{}/api/teams/team_1/billing/upgrade?plan=Pro&period=yearly",
            addr
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session: Value = res.json().await.unwrap();
    assert_eq!(session["id"], "cs_test_1");

    let sent: Value = serde_json::from_slice(&checkout.requests()[0].body).unwrap();
    // default deployment mode is production
    assert_eq!(sent["price_id"], "price_live_pro_yearly");
    assert_eq!(sent["team_id"], "team_1");

    let res = client
        .post(format!("http://{}/api/teams/team_1/billing/upgrade?plan=Gold", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(checkout.count(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_upgrade_follows_reloaded_mode() {
    let u = upstreams().await;
    let checkout = start_upstream(|_, _| (200, r#"{"id":"cs_test_2"}"#.to_string())).await;
    let mut config = config_for(&u);
    config.billing.checkout_url = format!("http://{}/checkout/sessions", checkout.authority());
    let state = test_state(config.clone());
    let (addr, shutdown) = spawn_gateway(state.clone()).await;

    config.deployment.mode = DeploymentMode::Development;
    apply_config(&state.snapshot, config);

    let res = client()
        .post(format!(
            "http://{}/api/teams/team_1/billing/upgrade?plan=Pro&period=yearly",
            addr
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let sent: Value = serde_json::from_slice(&checkout.requests()[0].body).unwrap();
    assert_eq!(sent["price_id"], "price_test_pro_yearly");

    shutdown.trigger();
}

struct DownProvider;

#[async_trait]
impl CheckoutProvider for DownProvider {
    async fn create_session(&self, _team_id: &str, _price_id: &str) -> Result<CheckoutSession, BillingError> {
        Err(BillingError::Provider("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let u = upstreams().await;
    let state = common::test_state_with_provider(config_for(&u), Arc::new(DownProvider));
    let (addr, shutdown) = spawn_gateway(state).await;

    let res = client()
        .post(format!("http://{}/api/teams/team_1/billing/upgrade?plan=Enterprise", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    shutdown.trigger();
}

#[tokio::test]
async fn test_pricing_and_plan_offer() {
    let u = upstreams().await;
    let (addr, shutdown) = spawn_gateway(test_state(config_for(&u))).await;
    let client = client();

    let pricing: Value = client
        .get(format!("http://{}/api/pricing", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = pricing["tiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Free", "Pro", "Business", "Enterprise"]);

    let offer: Value = client
        .get(format!("http://{}/api/billing/plans/enterprise?period=monthly", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(offer["button_label"], "Upgrade to Enterprise Monthly");
    assert_eq!(offer["features"].as_array().unwrap().last().unwrap(), "Priority Support");

    shutdown.trigger();
}
