//! PostgreSQL domain store

use async_trait::async_trait;
use raya_shared::{DomainStatus, TenantId};
use sqlx::types::Json;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{DomainStore, StoreError};
use crate::domains::model::{CustomDomain, DnsRecordsSnapshot};

const DOMAIN_COLUMNS: &str = r#"
    id,
    tenant_id,
    domain,
    domain_type,
    status,
    verification_token,
    verification_method,
    verification_expires_at,
    verified_at,
    ssl_enabled,
    ssl_expires_at,
    ssl_provider,
    is_primary,
    is_active,
    last_error,
    verification_attempts,
    last_verification_attempt,
    dns_records,
    created_at,
    updated_at
"#;

/// Database row for custom domain (status/type stored as TEXT to avoid SQLx enum issues)
#[derive(Debug, sqlx::FromRow)]
struct CustomDomainRow {
    id: Uuid,
    tenant_id: i64,
    domain: String,
    domain_type: String,
    status: String,
    verification_token: String,
    verification_method: String,
    verification_expires_at: OffsetDateTime,
    verified_at: Option<OffsetDateTime>,
    ssl_enabled: bool,
    ssl_expires_at: Option<OffsetDateTime>,
    ssl_provider: Option<String>,
    is_primary: bool,
    is_active: bool,
    last_error: Option<String>,
    verification_attempts: i32,
    last_verification_attempt: Option<OffsetDateTime>,
    dns_records: Option<Json<DnsRecordsSnapshot>>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CustomDomainRow> for CustomDomain {
    fn from(row: CustomDomainRow) -> Self {
        Self {
            id: row.id,
            tenant_id: TenantId(row.tenant_id),
            domain: row.domain,
            domain_type: row.domain_type.parse().unwrap_or_default(),
            status: row.status.parse().unwrap_or_default(),
            verification_token: row.verification_token,
            verification_method: row.verification_method,
            verification_expires_at: row.verification_expires_at,
            verified_at: row.verified_at,
            ssl_enabled: row.ssl_enabled,
            ssl_expires_at: row.ssl_expires_at,
            ssl_provider: row.ssl_provider,
            is_primary: row.is_primary,
            is_active: row.is_active,
            last_error: row.last_error,
            verification_attempts: row.verification_attempts,
            last_verification_attempt: row.last_verification_attempt,
            dns_records: row.dns_records.map(|json| json.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Domain store backed by the `custom_domains` table
#[derive(Clone)]
pub struct PgDomainStore {
    pool: PgPool,
}

impl PgDomainStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DomainStore for PgDomainStore {
    async fn insert(&self, domain: &CustomDomain) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO custom_domains (
                id, tenant_id, domain, domain_type, status,
                verification_token, verification_method, verification_expires_at,
                ssl_enabled, is_primary, is_active, verification_attempts,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(domain.id)
        .bind(domain.tenant_id)
        .bind(&domain.domain)
        .bind(domain.domain_type.as_str())
        .bind(domain.status.as_str())
        .bind(&domain.verification_token)
        .bind(&domain.verification_method)
        .bind(domain.verification_expires_at)
        .bind(domain.ssl_enabled)
        .bind(domain.is_primary)
        .bind(domain.is_active)
        .bind(domain.verification_attempts)
        .bind(domain.created_at)
        .bind(domain.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, id: Uuid, tenant_id: TenantId) -> Result<Option<CustomDomain>, StoreError> {
        let row: Option<CustomDomainRow> = sqlx::query_as(&format!(
            "SELECT {} FROM custom_domains WHERE id = $1 AND tenant_id = $2",
            DOMAIN_COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError> {
        let row: Option<CustomDomainRow> = sqlx::query_as(&format!(
            "SELECT {} FROM custom_domains WHERE domain = $1",
            DOMAIN_COLUMNS
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_routable(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError> {
        let row: Option<CustomDomainRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM custom_domains
            WHERE domain = $1
              AND is_active = TRUE
              AND status IN ($2, $3)
            "#,
            DOMAIN_COLUMNS
        ))
        .bind(domain)
        .bind(DomainStatus::Verified.as_str())
        .bind(DomainStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<CustomDomain>, StoreError> {
        let rows: Vec<CustomDomainRow> = sqlx::query_as(&format!(
            "SELECT {} FROM custom_domains WHERE tenant_id = $1 ORDER BY created_at DESC",
            DOMAIN_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, domain: &CustomDomain) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE custom_domains
            SET
                status = $3,
                verification_token = $4,
                verification_expires_at = $5,
                verified_at = $6,
                ssl_enabled = $7,
                ssl_expires_at = $8,
                ssl_provider = $9,
                is_active = $10,
                last_error = $11,
                verification_attempts = $12,
                last_verification_attempt = $13,
                updated_at = $14
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(domain.id)
        .bind(domain.tenant_id)
        .bind(domain.status.as_str())
        .bind(&domain.verification_token)
        .bind(domain.verification_expires_at)
        .bind(domain.verified_at)
        .bind(domain.ssl_enabled)
        .bind(domain.ssl_expires_at)
        .bind(&domain.ssl_provider)
        .bind(domain.is_active)
        .bind(&domain.last_error)
        .bind(domain.verification_attempts)
        .bind(domain.last_verification_attempt)
        .bind(domain.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_dns_records(
        &self,
        id: Uuid,
        tenant_id: TenantId,
        records: &DnsRecordsSnapshot,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE custom_domains
            SET dns_records = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(Json(records))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_primary(&self, id: Uuid, tenant_id: TenantId) -> Result<Vec<String>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let target: Option<(String, bool)> = sqlx::query_as(
            "SELECT domain, is_primary FROM custom_domains WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((domain, was_primary)) = target else {
            tx.rollback().await?;
            return Err(StoreError::NotFound);
        };

        // Clear first so the partial unique index on (tenant_id) WHERE is_primary holds
        let mut changed: Vec<String> = sqlx::query_scalar(
            r#"
            UPDATE custom_domains
            SET is_primary = FALSE, updated_at = NOW()
            WHERE tenant_id = $1 AND is_primary = TRUE AND id <> $2
            RETURNING domain
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        if !was_primary {
            sqlx::query("UPDATE custom_domains SET is_primary = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            changed.push(domain);
        }

        tx.commit().await?;
        Ok(changed)
    }

    async fn delete(&self, id: Uuid, tenant_id: TenantId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM custom_domains WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn expire_stale(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE custom_domains
            SET status = $1, updated_at = NOW()
            WHERE status IN ($2, $3, $4)
              AND verification_expires_at < $5
            "#,
        )
        .bind(DomainStatus::Expired.as_str())
        .bind(DomainStatus::Pending.as_str())
        .bind(DomainStatus::Verifying.as_str())
        .bind(DomainStatus::Failed.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
