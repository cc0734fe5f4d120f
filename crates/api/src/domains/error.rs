//! Domain service error types

use super::store::StoreError;
use crate::cache::CacheError;
use crate::tenants::TenantDirectoryError;

/// Failures surfaced synchronously by the domain service
///
/// DNS outcomes of a verification attempt are not errors; they come back as
/// a [`super::VerificationOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Malformed domain or a name under the platform domain
    #[error("{0}")]
    Validation(String),

    /// Domain already claimed
    #[error("{0}")]
    Conflict(String),

    /// Unknown domain id for this tenant
    #[error("Custom domain not found")]
    NotFound,

    /// Transition not allowed from the domain's current state
    #[error("{0}")]
    InvalidState(String),

    #[error("Domain registry error: {0}")]
    Store(#[from] StoreError),

    #[error("Domain cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Tenant directory error: {0}")]
    Tenants(#[from] TenantDirectoryError),
}

pub type DomainResult<T> = Result<T, DomainError>;
