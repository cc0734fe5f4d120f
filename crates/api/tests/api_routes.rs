#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{harness, Harness, CNAME_TARGET, PLATFORM_DOMAIN, SERVER_IP};
use raya_api::{routes::create_router, AppState, Config};
use serde_json::{json, Value};
use tower::ServiceExt;

fn config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        redis_url: None,
        platform_domain: PLATFORM_DOMAIN.to_string(),
        platform_server_ip: SERVER_IP,
        platform_cname_target: CNAME_TARGET.to_string(),
        tenant_header: "x-tenant-id".to_string(),
        domain_cache_ttl_secs: 3600,
        resolution_timeout_ms: 500,
        dns_lookup_timeout_ms: 1000,
    }
}

fn app(h: &Harness) -> Router {
    create_router(AppState::new(config(), h.service.clone()))
}

async fn send(app: Router, method: &str, uri: &str, tenant: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "api.raya.app");
    if let Some(tenant) = tenant {
        builder = builder.header("x-tenant-id", tenant);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    let (status, body) = send(app(&h), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(app(&h), "GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_domain_routes_require_tenant() {
    let h = harness().await;
    let (status, body) = send(app(&h), "GET", "/api/v1/domains", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_domain_lifecycle() {
    let h = harness().await;

    let (status, body) = send(
        app(&h),
        "POST",
        "/api/v1/domains",
        Some("1"),
        Some(json!({ "domain": "Shop.Example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["domain"]["domain"], "shop.example.com");
    assert_eq!(body["domain"]["status"], "PENDING");
    assert_eq!(
        body["dns_instructions"]["txt"]["name"],
        "_raya-verification.shop.example.com"
    );
    assert_eq!(body["dns_instructions"]["cname"]["value"], CNAME_TARGET);

    let id = body["domain"]["id"].as_str().unwrap().to_string();
    let token = body["domain"]["verification_token"].as_str().unwrap().to_string();

    // Not published yet: a normal 200 answer
    let (status, body) = send(app(&h), "POST", &format!("/api/v1/domains/{}/verify", id), Some("1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], false);
    assert_eq!(body["status"], "PENDING");

    h.dns.add_txt("_raya-verification.shop.example.com", &token);
    let (status, body) = send(app(&h), "POST", &format!("/api/v1/domains/{}/verify", id), Some("1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["status"], "VERIFIED");

    let (status, _) = send(
        app(&h),
        "POST",
        &format!("/api/v1/domains/{}/regenerate-token", id),
        Some("1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(app(&h), "POST", &format!("/api/v1/domains/{}/primary", id), Some("1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_primary"], true);

    let (status, body) = send(app(&h), "GET", "/api/v1/domains", Some("1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domains"].as_array().unwrap().len(), 1);

    // Another tenant can't see it
    let (status, _) = send(app(&h), "GET", &format!("/api/v1/domains/{}", id), Some("2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app(&h), "DELETE", &format!("/api/v1/domains/{}", id), Some("1"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_conflict_and_validation_responses() {
    let h = harness().await;
    let create = |tenant: &'static str, domain: &'static str| {
        send(
            app(&h),
            "POST",
            "/api/v1/domains",
            Some(tenant),
            Some(json!({ "domain": domain })),
        )
    };

    let (status, _) = create("1", "shop.example.com").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create("2", "shop.example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("used by another account"));

    let (status, body) = create("1", "tenant.raya.app").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_dns_check_route() {
    let h = harness().await;
    let domain = h.service.add_domain(common::T1, "shop.example.com", false).await.unwrap();
    h.dns.add_cname("shop.example.com", CNAME_TARGET);

    let (status, body) = send(
        app(&h),
        "POST",
        &format!("/api/v1/domains/{}/dns-check", domain.id),
        Some("1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], true);
    assert_eq!(body["cname_valid"], true);
}

#[tokio::test]
async fn test_unresolvable_custom_domain_is_still_served() {
    let h = harness().await;
    h.verified_domain(common::T1, "shop.example.com").await;
    h.cache.set_down(true);
    h.tenants.remove(common::T1).await;

    let request = Request::builder()
        .uri("/health/live")
        .header("host", "shop.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app(&h).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
