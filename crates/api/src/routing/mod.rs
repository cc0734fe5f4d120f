//! Host-based tenant resolution
//!
//! Every inbound request is mapped to a tenant before route dispatch:
//! - Tenant header: `x-tenant-id: 42` (internal callers)
//! - Platform hosts: raya.app, www.raya.app, api.raya.app -> no tenant
//! - Subdomains: acme.raya.app -> subdomain hint `acme`
//! - Custom domains: shop.example.com -> tenant owning the verified domain

mod middleware;
mod resolver;
mod strategy;

use raya_shared::TenantId;
use serde::Serialize;

pub use middleware::resolve_tenant;
pub use resolver::{TenantResolver, DEFAULT_RESOLUTION_TIMEOUT};
pub use strategy::{
    CustomDomainStrategy, HeaderStrategy, PlatformAllowlistStrategy, ResolveStrategy,
    SubdomainStrategy, RESERVED_PLATFORM_HOSTS, RESERVED_SUBDOMAINS,
};

/// The parts of an inbound request tenant resolution looks at
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Normalized Host (no port, lowercase, no trailing dot)
    pub host: Option<String>,
    /// Raw value of the tenant header, if present
    pub tenant_header: Option<String>,
}

impl RequestContext {
    pub fn new(host: Option<&str>, tenant_header: Option<&str>) -> Self {
        Self {
            host: host.map(normalize_host).filter(|h| !h.is_empty()),
            tenant_header: tenant_header
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }
}

/// How the tenant of a request was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TenantSource {
    Header,
    Subdomain,
    CustomDomain,
}

/// Tenant context attached to every request as an extension
///
/// All fields empty means the request is unresolved (platform-level or
/// unknown host).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    pub resolved_tenant_id: Option<TenantId>,
    pub resolved_tenant_code: Option<String>,
    pub tenant_subdomain: Option<String>,
    pub custom_domain: Option<String>,
    pub tenant_source: Option<TenantSource>,
}

impl TenantContext {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.tenant_source.is_some()
    }
}

/// Outcome of a single resolve strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Platform-level request; stop without attaching a tenant
    Platform,
    /// Tenant determined; stop and attach it
    Tenant(TenantContext),
}

/// Normalize a host header value
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    // Bracketed IPv6 literal, with or without a port
    let host = if let Some(rest) = host.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    host.trim_end_matches('.').to_lowercase()
}
