//! In-memory domain store for tests and local development

use async_trait::async_trait;
use raya_shared::{DomainStatus, TenantId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DomainStore, StoreError};
use crate::domains::model::{CustomDomain, DnsRecordsSnapshot};

/// Store keeping rows in a map; the write lock serializes uniqueness checks
#[derive(Default)]
pub struct MemoryDomainStore {
    rows: RwLock<HashMap<Uuid, CustomDomain>>,
    routable_lookups: AtomicUsize,
}

impl MemoryDomainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the request path queried the registry
    pub fn routable_lookups(&self) -> usize {
        self.routable_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainStore for MemoryDomainStore {
    async fn insert(&self, domain: &CustomDomain) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.values().any(|row| row.domain == domain.domain) {
            return Err(StoreError::UniqueViolation(
                "custom_domains_domain_key".to_string(),
            ));
        }
        if domain.is_primary
            && rows
                .values()
                .any(|row| row.tenant_id == domain.tenant_id && row.is_primary)
        {
            return Err(StoreError::UniqueViolation(
                "custom_domains_one_primary_per_tenant".to_string(),
            ));
        }
        rows.insert(domain.id, domain.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid, tenant_id: TenantId) -> Result<Option<CustomDomain>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|row| row.tenant_id == tenant_id).cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|row| row.domain == domain).cloned())
    }

    async fn find_routable(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError> {
        self.routable_lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|row| row.domain == domain && row.is_routable())
            .cloned())
    }

    async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<CustomDomain>, StoreError> {
        let rows = self.rows.read().await;
        let mut domains: Vec<CustomDomain> = rows
            .values()
            .filter(|row| row.tenant_id == tenant_id)
            .cloned()
            .collect();
        domains.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(domains)
    }

    async fn update(&self, domain: &CustomDomain) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&domain.id) {
            Some(row) if row.tenant_id == domain.tenant_id => {
                // The primary flag and DNS snapshot have their own writers
                let is_primary = row.is_primary;
                let dns_records = row.dns_records.take();
                *row = domain.clone();
                row.is_primary = is_primary;
                row.dns_records = dns_records;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_dns_records(
        &self,
        id: Uuid,
        tenant_id: TenantId,
        records: &DnsRecordsSnapshot,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(row) if row.tenant_id == tenant_id => {
                row.dns_records = Some(records.clone());
                row.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_primary(&self, id: Uuid, tenant_id: TenantId) -> Result<Vec<String>, StoreError> {
        let mut rows = self.rows.write().await;
        if !rows
            .get(&id)
            .map(|row| row.tenant_id == tenant_id)
            .unwrap_or(false)
        {
            return Err(StoreError::NotFound);
        }

        let now = OffsetDateTime::now_utc();
        let mut changed = Vec::new();
        for row in rows.values_mut().filter(|row| row.tenant_id == tenant_id) {
            let should_be_primary = row.id == id;
            if row.is_primary != should_be_primary {
                row.is_primary = should_be_primary;
                row.updated_at = now;
                changed.push(row.domain.clone());
            }
        }
        Ok(changed)
    }

    async fn delete(&self, id: Uuid, tenant_id: TenantId) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        if rows
            .get(&id)
            .map(|row| row.tenant_id == tenant_id)
            .unwrap_or(false)
        {
            rows.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn expire_stale(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let mut rows = self.rows.write().await;
        let mut expired = 0;
        for row in rows.values_mut() {
            if row.status.awaiting_verification() && row.verification_expired(now) {
                row.status = DomainStatus::Expired;
                row.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
