//! Domain registry: persistence for claimed domains
//!
//! Global uniqueness of `domain` is enforced by the store itself (a unique
//! index in Postgres, the write lock in memory). Callers insert and map
//! [`StoreError::UniqueViolation`] instead of checking first.

mod memory;
mod postgres;

use async_trait::async_trait;
use raya_shared::TenantId;
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{CustomDomain, DnsRecordsSnapshot};

pub use memory::MemoryDomainStore;
pub use postgres::PgDomainStore;

#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Insert a new row; fails with `UniqueViolation` if the domain is taken
    async fn insert(&self, domain: &CustomDomain) -> Result<(), StoreError>;

    /// Row by id, scoped to its owning tenant
    async fn find(&self, id: Uuid, tenant_id: TenantId) -> Result<Option<CustomDomain>, StoreError>;

    /// Row by exact domain, regardless of owner or state
    async fn find_by_domain(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError>;

    /// Row by exact domain that currently routes traffic (verified and active)
    async fn find_routable(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError>;

    async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<CustomDomain>, StoreError>;

    /// Overwrite the mutable columns of a row. Returns false if the row is gone.
    async fn update(&self, domain: &CustomDomain) -> Result<bool, StoreError>;

    /// Overwrite only the DNS snapshot. Returns false if the row is gone.
    async fn update_dns_records(
        &self,
        id: Uuid,
        tenant_id: TenantId,
        records: &DnsRecordsSnapshot,
    ) -> Result<bool, StoreError>;

    /// Make `id` the tenant's only primary domain.
    /// Returns every domain whose primary flag changed.
    async fn set_primary(&self, id: Uuid, tenant_id: TenantId) -> Result<Vec<String>, StoreError>;

    /// Returns false if nothing was deleted
    async fn delete(&self, id: Uuid, tenant_id: TenantId) -> Result<bool, StoreError>;

    /// Mark unverified rows whose window closed before `now` as EXPIRED.
    /// Returns the number of rows changed.
    async fn expire_stale(&self, now: OffsetDateTime) -> Result<u64, StoreError>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Errors returned by a domain store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Row not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if raya_shared::is_unique_violation(&err) {
            let constraint = match &err {
                sqlx::Error::Database(db_err) => db_err.constraint().unwrap_or("unknown").to_string(),
                _ => "unknown".to_string(),
            };
            return StoreError::UniqueViolation(constraint);
        }
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}
