#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{harness, PLATFORM_DOMAIN, T1};
use raya_api::cache::KeyValueCache;
use raya_api::domains::{cache_key, DomainStore};
use raya_api::routing::{RequestContext, TenantResolver, TenantSource};
use raya_shared::{DomainStatus, TenantId};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(500);

// ============================================================================
// find_tenant_by_domain
// ============================================================================

#[tokio::test]
async fn test_unverified_domain_does_not_resolve() {
    let h = harness().await;
    let domain = h.service.add_domain(T1, "shop.example.com", false).await.unwrap();
    assert!(h.service.find_tenant_by_domain("shop.example.com").await.unwrap().is_none());

    // Verified but switched off
    let mut row = domain.clone();
    row.status = DomainStatus::Verified;
    row.is_active = false;
    h.store.update(&row).await.unwrap();
    assert!(h.service.find_tenant_by_domain("shop.example.com").await.unwrap().is_none());

    // Active but not verified
    row.status = DomainStatus::Failed;
    row.is_active = true;
    h.store.update(&row).await.unwrap();
    assert!(h.service.find_tenant_by_domain("shop.example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_hit_skips_registry() {
    let h = harness().await;
    h.verified_domain(T1, "shop.example.com").await;

    let first = h.service.find_tenant_by_domain("shop.example.com").await.unwrap();
    assert_eq!(first.unwrap().id, T1);
    let lookups = h.store.routable_lookups();

    for _ in 0..3 {
        let tenant = h.service.find_tenant_by_domain("Shop.Example.com.").await.unwrap();
        assert_eq!(tenant.unwrap().code, "acme");
    }
    assert_eq!(h.store.routable_lookups(), lookups);
    assert_eq!(
        h.cache.get(&cache_key("shop.example.com")).await.unwrap(),
        Some("1".to_string())
    );
}

#[tokio::test]
async fn test_negative_results_are_not_cached() {
    let h = harness().await;

    assert!(h.service.find_tenant_by_domain("unknown.example.com").await.unwrap().is_none());
    assert!(h.service.find_tenant_by_domain("unknown.example.com").await.unwrap().is_none());

    assert_eq!(h.store.routable_lookups(), 2);
    assert!(h.cache.get(&cache_key("unknown.example.com")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_drops_cached_resolution() {
    let h = harness().await;
    let domain = h.verified_domain(T1, "shop.example.com").await;
    assert!(h.service.find_tenant_by_domain("shop.example.com").await.unwrap().is_some());
    assert!(h.cache.get(&cache_key("shop.example.com")).await.unwrap().is_some());

    h.service.remove_domain(domain.id, T1).await.unwrap();

    assert!(h.cache.get(&cache_key("shop.example.com")).await.unwrap().is_none());
    assert!(h.service.find_tenant_by_domain("shop.example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_verify_invalidates_stale_entry() {
    let h = harness().await;
    let domain = h.service.add_domain(T1, "shop.example.com", false).await.unwrap();

    // A stale mapping left behind by an earlier owner
    h.cache
        .set(&cache_key("shop.example.com"), "99", 3600)
        .await
        .unwrap();

    h.dns.add_txt(&domain.txt_record_name(), &domain.verification_token);
    assert!(h.service.verify(domain.id, T1).await.unwrap().verified);

    assert!(h.cache.get(&cache_key("shop.example.com")).await.unwrap().is_none());
    let tenant = h.service.find_tenant_by_domain("shop.example.com").await.unwrap();
    assert_eq!(tenant.unwrap().id, T1);
}

#[tokio::test]
async fn test_cached_tenant_that_no_longer_exists() {
    let h = harness().await;
    h.cache
        .set(&cache_key("gone.example.com"), "404", 3600)
        .await
        .unwrap();

    assert!(h.service.find_tenant_by_domain("gone.example.com").await.unwrap().is_none());
    assert!(h.cache.get(&cache_key("gone.example.com")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_outage_falls_back_to_registry() {
    let h = harness().await;
    h.verified_domain(T1, "shop.example.com").await;
    h.cache.set_down(true);

    let tenant = h.service.find_tenant_by_domain("shop.example.com").await.unwrap();
    assert_eq!(tenant.unwrap().id, T1);
    assert!(h.cache.gets() > 0);
}

// ============================================================================
// Resolution chain
// ============================================================================

fn resolver(h: &common::Harness) -> TenantResolver {
    TenantResolver::standard(h.service.clone(), "x-tenant-id", TIMEOUT)
}

#[tokio::test]
async fn test_custom_domain_resolution() {
    let h = harness().await;
    h.verified_domain(T1, "shop.example.com").await;

    let tenant = resolver(&h)
        .resolve(&RequestContext::new(Some("Shop.Example.com:443"), None))
        .await;

    assert_eq!(tenant.resolved_tenant_id, Some(T1));
    assert_eq!(tenant.resolved_tenant_code.as_deref(), Some("acme"));
    assert_eq!(tenant.custom_domain.as_deref(), Some("shop.example.com"));
    assert_eq!(tenant.tenant_source, Some(TenantSource::CustomDomain));
    assert!(tenant.tenant_subdomain.is_none());
}

#[tokio::test]
async fn test_chain_order() {
    let h = harness().await;
    h.verified_domain(T1, "shop.example.com").await;
    let resolver = resolver(&h);

    // Header beats a resolvable custom domain
    let tenant = resolver
        .resolve(&RequestContext::new(Some("shop.example.com"), Some("2")))
        .await;
    assert_eq!(tenant.resolved_tenant_id, Some(TenantId(2)));
    assert_eq!(tenant.tenant_source, Some(TenantSource::Header));

    // Platform hosts never reach the registry
    let lookups = h.store.routable_lookups();
    for host in [PLATFORM_DOMAIN, "www.raya.app", "api.raya.app", "admin.raya.app", "localhost", "127.0.0.1:3000"] {
        let tenant = resolver.resolve(&RequestContext::new(Some(host), None)).await;
        assert!(!tenant.is_resolved(), "{}", host);
    }

    // Subdomains are a hint only
    let tenant = resolver
        .resolve(&RequestContext::new(Some("acme.raya.app"), None))
        .await;
    assert_eq!(tenant.tenant_subdomain.as_deref(), Some("acme"));
    assert_eq!(tenant.tenant_source, Some(TenantSource::Subdomain));
    assert_eq!(h.store.routable_lookups(), lookups);
}

#[tokio::test]
async fn test_unknown_host_is_unresolved() {
    let h = harness().await;
    let tenant = resolver(&h)
        .resolve(&RequestContext::new(Some("nobody.example.org"), None))
        .await;
    assert!(!tenant.is_resolved());

    let tenant = resolver(&h).resolve(&RequestContext::new(None, None)).await;
    assert!(!tenant.is_resolved());
}
