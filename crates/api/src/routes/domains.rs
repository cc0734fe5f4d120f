//! Custom domain routes
//!
//! These routes let a tenant claim domains (e.g., shop.company.com), prove
//! ownership through a DNS TXT challenge and point traffic at the platform.
//! The tenant comes from the resolution middleware.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use raya_shared::TenantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domains::{
        CustomDomain, DnsCheckResult, DnsInstructions, UpdateDomain, VerificationOutcome,
    },
    error::ApiError,
    routing::TenantContext,
    state::AppState,
};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateDomainRequest {
    /// The custom domain (e.g., "shop.company.com")
    pub domain: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateDomainResponse {
    pub domain: CustomDomain,
    /// Instructions for setting up DNS records
    pub dns_instructions: DnsInstructions,
}

#[derive(Debug, Serialize)]
pub struct ListDomainsResponse {
    pub domains: Vec<CustomDomain>,
}

#[derive(Debug, Serialize)]
pub struct DomainDetailResponse {
    pub domain: CustomDomain,
    pub dns_instructions: DnsInstructions,
}

fn require_tenant(tenant: &TenantContext) -> Result<TenantId, ApiError> {
    tenant.resolved_tenant_id.ok_or(ApiError::Unauthorized)
}

// ============================================================================
// Route handlers
// ============================================================================

/// List all custom domains for the tenant
pub async fn list_domains(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> Result<Json<ListDomainsResponse>, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    let domains = state.domains.list_domains(tenant_id).await?;
    Ok(Json(ListDomainsResponse { domains }))
}

/// Add a new custom domain
pub async fn create_domain(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Json(req): Json<CreateDomainRequest>,
) -> Result<(StatusCode, Json<CreateDomainResponse>), ApiError> {
    let tenant_id = require_tenant(&tenant)?;

    let domain = state
        .domains
        .add_domain(tenant_id, &req.domain, req.is_primary)
        .await?;
    let dns_instructions = state.domains.dns_instructions(&domain);

    Ok((
        StatusCode::CREATED,
        Json(CreateDomainResponse {
            domain,
            dns_instructions,
        }),
    ))
}

/// Get a custom domain with the records it needs
pub async fn get_domain(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(domain_id): Path<Uuid>,
) -> Result<Json<DomainDetailResponse>, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    let domain = state.domains.get_domain(domain_id, tenant_id).await?;
    let dns_instructions = state.domains.dns_instructions(&domain);
    Ok(Json(DomainDetailResponse {
        domain,
        dns_instructions,
    }))
}

/// Update domain settings (enable/disable)
pub async fn update_domain(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(domain_id): Path<Uuid>,
    Json(req): Json<UpdateDomain>,
) -> Result<Json<CustomDomain>, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    let domain = state.domains.update_domain(domain_id, tenant_id, req).await?;
    Ok(Json(domain))
}

/// Delete a custom domain
pub async fn delete_domain(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(domain_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    state.domains.remove_domain(domain_id, tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check the TXT ownership record
///
/// "Not verified yet" is a 200 with `verified: false`.
pub async fn verify_domain(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(domain_id): Path<Uuid>,
) -> Result<Json<VerificationOutcome>, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    let outcome = state.domains.verify(domain_id, tenant_id).await?;
    Ok(Json(outcome))
}

/// Issue a fresh verification token
pub async fn regenerate_token(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(domain_id): Path<Uuid>,
) -> Result<Json<DomainDetailResponse>, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    let domain = state
        .domains
        .regenerate_verification_token(domain_id, tenant_id)
        .await?;
    let dns_instructions = state.domains.dns_instructions(&domain);
    Ok(Json(DomainDetailResponse {
        domain,
        dns_instructions,
    }))
}

/// Check that traffic for the domain reaches the platform
pub async fn check_dns(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(domain_id): Path<Uuid>,
) -> Result<Json<DnsCheckResult>, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    let result = state
        .domains
        .check_dns_configuration(domain_id, tenant_id)
        .await?;
    Ok(Json(result))
}

/// Make the domain the tenant's primary domain
pub async fn set_primary(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(domain_id): Path<Uuid>,
) -> Result<Json<CustomDomain>, ApiError> {
    let tenant_id = require_tenant(&tenant)?;
    let domain = state.domains.set_primary(domain_id, tenant_id).await?;
    Ok(Json(domain))
}
