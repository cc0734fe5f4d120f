//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::domains::DomainService;
use crate::routing::TenantResolver;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub domains: DomainService,
    pub resolver: TenantResolver,
}

impl AppState {
    /// Build the state, wiring the standard resolution chain to `domains`
    pub fn new(config: Config, domains: DomainService) -> Self {
        let resolver = TenantResolver::standard(
            domains.clone(),
            &config.tenant_header,
            config.resolution_timeout(),
        );
        Self {
            config: Arc::new(config),
            domains,
            resolver,
        }
    }
}
