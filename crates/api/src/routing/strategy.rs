//! Resolve strategies, tried in order by [`super::TenantResolver`]

use async_trait::async_trait;
use raya_shared::TenantId;
use tracing::debug;

use super::{normalize_host, RequestContext, Resolution, TenantContext, TenantSource};
use crate::domains::{DomainResult, DomainService};

/// Subdomains of the platform domain that serve the platform itself
pub const RESERVED_SUBDOMAINS: &[&str] = &["www", "api", "admin"];

/// Hosts that always serve the platform itself
pub const RESERVED_PLATFORM_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// One step of the resolution chain
///
/// `Ok(None)` passes the request on to the next strategy.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn resolve(&self, ctx: &RequestContext) -> DomainResult<Option<Resolution>>;
}

/// Trusts an explicit numeric tenant id header
pub struct HeaderStrategy;

#[async_trait]
impl ResolveStrategy for HeaderStrategy {
    fn name(&self) -> &'static str {
        "header"
    }

    async fn resolve(&self, ctx: &RequestContext) -> DomainResult<Option<Resolution>> {
        let Some(value) = ctx.tenant_header.as_deref() else {
            return Ok(None);
        };

        match value.parse::<TenantId>() {
            Ok(tenant_id) => Ok(Some(Resolution::Tenant(TenantContext {
                resolved_tenant_id: Some(tenant_id),
                tenant_source: Some(TenantSource::Header),
                ..TenantContext::default()
            }))),
            Err(_) => {
                debug!(value = %value, "Ignoring non-numeric tenant header");
                Ok(None)
            }
        }
    }
}

/// Stops resolution for the platform's own hosts
pub struct PlatformAllowlistStrategy {
    platform_domain: String,
}

impl PlatformAllowlistStrategy {
    pub fn new(platform_domain: &str) -> Self {
        Self {
            platform_domain: normalize_host(platform_domain),
        }
    }

    fn is_platform_host(&self, host: &str) -> bool {
        host == self.platform_domain
            || RESERVED_PLATFORM_HOSTS.contains(&host)
            || RESERVED_SUBDOMAINS
                .iter()
                .any(|sub| host == format!("{}.{}", sub, self.platform_domain))
    }
}

#[async_trait]
impl ResolveStrategy for PlatformAllowlistStrategy {
    fn name(&self) -> &'static str {
        "platform"
    }

    async fn resolve(&self, ctx: &RequestContext) -> DomainResult<Option<Resolution>> {
        match ctx.host.as_deref() {
            Some(host) if self.is_platform_host(host) => Ok(Some(Resolution::Platform)),
            _ => Ok(None),
        }
    }
}

/// Extracts `<label>` from `<label>.<platform domain>`
///
/// Mapping the label to a tenant happens downstream.
pub struct SubdomainStrategy {
    suffix: String,
}

impl SubdomainStrategy {
    pub fn new(platform_domain: &str) -> Self {
        Self {
            suffix: format!(".{}", normalize_host(platform_domain)),
        }
    }
}

#[async_trait]
impl ResolveStrategy for SubdomainStrategy {
    fn name(&self) -> &'static str {
        "subdomain"
    }

    async fn resolve(&self, ctx: &RequestContext) -> DomainResult<Option<Resolution>> {
        let Some(label) = ctx
            .host
            .as_deref()
            .and_then(|host| host.strip_suffix(self.suffix.as_str()))
        else {
            return Ok(None);
        };

        // Deeper names under the platform domain can't be claimed as custom
        // domains either, so they end the chain unresolved
        if label.is_empty() || label.contains('.') {
            return Ok(Some(Resolution::Platform));
        }

        Ok(Some(Resolution::Tenant(TenantContext {
            tenant_subdomain: Some(label.to_string()),
            tenant_source: Some(TenantSource::Subdomain),
            ..TenantContext::default()
        })))
    }
}

/// Looks the host up as a verified custom domain
pub struct CustomDomainStrategy {
    domains: DomainService,
}

impl CustomDomainStrategy {
    pub fn new(domains: DomainService) -> Self {
        Self { domains }
    }
}

#[async_trait]
impl ResolveStrategy for CustomDomainStrategy {
    fn name(&self) -> &'static str {
        "custom-domain"
    }

    async fn resolve(&self, ctx: &RequestContext) -> DomainResult<Option<Resolution>> {
        let Some(host) = ctx.host.as_deref() else {
            return Ok(None);
        };

        let tenant = self.domains.find_tenant_by_domain(host).await?;
        Ok(tenant.map(|tenant| {
            Resolution::Tenant(TenantContext {
                resolved_tenant_id: Some(tenant.id),
                resolved_tenant_code: Some(tenant.code),
                custom_domain: Some(host.to_string()),
                tenant_source: Some(TenantSource::CustomDomain),
                ..TenantContext::default()
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(host: &str) -> RequestContext {
        RequestContext::new(Some(host), None)
    }

    #[tokio::test]
    async fn test_header_strategy() {
        let strategy = HeaderStrategy;

        let resolved = strategy
            .resolve(&RequestContext::new(None, Some("42")))
            .await
            .unwrap();
        match resolved {
            Some(Resolution::Tenant(tenant)) => {
                assert_eq!(tenant.resolved_tenant_id, Some(TenantId(42)));
                assert_eq!(tenant.tenant_source, Some(TenantSource::Header));
            }
            other => panic!("unexpected resolution: {:?}", other),
        }

        let ignored = strategy
            .resolve(&RequestContext::new(None, Some("acme")))
            .await
            .unwrap();
        assert!(ignored.is_none());
    }

    #[tokio::test]
    async fn test_platform_allowlist() {
        let strategy = PlatformAllowlistStrategy::new("raya.app");

        for host in ["raya.app", "www.raya.app", "api.raya.app", "admin.raya.app", "localhost:3000", "127.0.0.1"] {
            assert_eq!(
                strategy.resolve(&ctx(host)).await.unwrap(),
                Some(Resolution::Platform),
                "{} should be a platform host",
                host
            );
        }

        assert!(strategy.resolve(&ctx("acme.raya.app")).await.unwrap().is_none());
        assert!(strategy.resolve(&ctx("shop.example.com")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subdomain_strategy() {
        let strategy = SubdomainStrategy::new("raya.app");

        match strategy.resolve(&ctx("Acme.Raya.App")).await.unwrap() {
            Some(Resolution::Tenant(tenant)) => {
                assert_eq!(tenant.tenant_subdomain.as_deref(), Some("acme"));
                assert_eq!(tenant.tenant_source, Some(TenantSource::Subdomain));
                assert!(tenant.resolved_tenant_id.is_none());
            }
            other => panic!("unexpected resolution: {:?}", other),
        }

        assert_eq!(
            strategy.resolve(&ctx("a.b.raya.app")).await.unwrap(),
            Some(Resolution::Platform)
        );
        assert!(strategy.resolve(&ctx("notraya.app")).await.unwrap().is_none());
        assert!(strategy.resolve(&ctx("shop.example.com")).await.unwrap().is_none());
    }
}
