//! Read-only tenant directory
//!
//! Tenants are owned by the account service. The domain subsystem only
//! looks them up by id to attach tenant context to requests.

use async_trait::async_trait;
use raya_shared::{Tenant, TenantId};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantDirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TenantDirectoryError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for TenantDirectoryError {
    fn from(err: sqlx::Error) -> Self {
        TenantDirectoryError::Database(err.to_string())
    }
}

/// Tenant directory reading the `tenants` table
#[derive(Clone)]
pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for PgTenantDirectory {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantDirectoryError> {
        let tenant: Option<Tenant> = sqlx::query_as("SELECT id, code, name FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tenant)
    }
}

/// Tenant directory holding a fixed set of tenants
#[derive(Default)]
pub struct MemoryTenantDirectory {
    tenants: RwLock<HashMap<TenantId, Tenant>>,
}

impl MemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    pub async fn remove(&self, id: TenantId) {
        self.tenants.write().await.remove(&id);
    }
}

#[async_trait]
impl TenantDirectory for MemoryTenantDirectory {
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, TenantDirectoryError> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }
}
