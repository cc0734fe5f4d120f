//! Ordered, fail-open tenant resolution chain

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::strategy::{
    CustomDomainStrategy, HeaderStrategy, PlatformAllowlistStrategy, ResolveStrategy,
    SubdomainStrategy,
};
use super::{RequestContext, Resolution, TenantContext};
use crate::domains::DomainService;

/// Default bound on resolving one request
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_millis(500);

/// Resolves requests to tenants by trying strategies in order
///
/// The first strategy returning an outcome wins. Errors, and running past
/// the timeout shared by the whole chain, are logged and the request
/// continues unresolved; resolution never fails a request.
#[derive(Clone)]
pub struct TenantResolver {
    strategies: Arc<Vec<Box<dyn ResolveStrategy>>>,
    tenant_header: String,
    timeout: Duration,
}

impl TenantResolver {
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>, tenant_header: &str, timeout: Duration) -> Self {
        Self {
            strategies: Arc::new(strategies),
            tenant_header: tenant_header.to_lowercase(),
            timeout,
        }
    }

    /// The standard chain: header, platform hosts, subdomain, custom domain
    pub fn standard(domains: DomainService, tenant_header: &str, timeout: Duration) -> Self {
        let platform_domain = domains.config().platform_domain.clone();
        Self::new(
            vec![
                Box::new(HeaderStrategy),
                Box::new(PlatformAllowlistStrategy::new(&platform_domain)),
                Box::new(SubdomainStrategy::new(&platform_domain)),
                Box::new(CustomDomainStrategy::new(domains)),
            ],
            tenant_header,
            timeout,
        )
    }

    /// Header carrying an explicit tenant id
    pub fn tenant_header(&self) -> &str {
        &self.tenant_header
    }

    /// Run the chain; the whole chain shares one timeout
    pub async fn resolve(&self, ctx: &RequestContext) -> TenantContext {
        match tokio::time::timeout(self.timeout, self.run_chain(ctx)).await {
            Ok(tenant) => tenant,
            Err(_) => {
                warn!(
                    host = ?ctx.host,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Tenant resolution timed out, continuing unresolved"
                );
                TenantContext::unresolved()
            }
        }
    }

    async fn run_chain(&self, ctx: &RequestContext) -> TenantContext {
        for strategy in self.strategies.iter() {
            match strategy.resolve(ctx).await {
                Ok(None) => continue,
                Ok(Some(Resolution::Platform)) => {
                    debug!(host = ?ctx.host, strategy = strategy.name(), "Platform request");
                    return TenantContext::unresolved();
                }
                Ok(Some(Resolution::Tenant(tenant))) => {
                    debug!(
                        host = ?ctx.host,
                        strategy = strategy.name(),
                        tenant_id = ?tenant.resolved_tenant_id,
                        "Tenant resolved"
                    );
                    return tenant;
                }
                Err(e) => {
                    warn!(host = ?ctx.host, strategy = strategy.name(), error = %e, "Tenant resolution failed, continuing unresolved");
                    return TenantContext::unresolved();
                }
            }
        }

        TenantContext::unresolved()
    }
}
