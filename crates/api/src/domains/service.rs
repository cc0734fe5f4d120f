//! Custom domain verification engine
//!
//! Owns the verification state machine:
//!
//! ```text
//! PENDING --verify--> VERIFYING --TXT matches----> VERIFIED (active)
//!                         |----no TXT / mismatch-> PENDING
//!                         '----DNS failure-------> FAILED
//! any state past its window --verify------------> EXPIRED
//! EXPIRED/FAILED/PENDING --regenerate-----------> PENDING (new token)
//! ```
//!
//! Every mutation that can change how a domain routes invalidates its
//! `domain:<name>` cache key before returning.

use raya_shared::{DomainStatus, Tenant, TenantId};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::challenge::{is_well_formed_token, Challenge};
use super::error::{DomainError, DomainResult};
use super::model::{
    CustomDomain, DnsCheckResult, DnsInstructions, DnsRecord, DnsRecordsSnapshot, UpdateDomain,
    VerificationOutcome, SUGGESTED_RECORD_TTL,
};
use super::names::{is_platform_name, is_valid_domain, normalize_domain};
use super::store::{DomainStore, StoreError};
use crate::cache::KeyValueCache;
use crate::dns::{DnsLookupError, DnsResolver};
use crate::tenants::TenantDirectory;

/// Default TTL of a cached domain -> tenant mapping (1 hour)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Platform routing targets, fixed at construction
#[derive(Debug, Clone)]
pub struct DomainConfig {
    /// The platform's own domain; names under it can't be claimed
    pub platform_domain: String,
    /// A record target for apex domains
    pub server_ip: Ipv4Addr,
    /// CNAME target for subdomains
    pub cname_target: String,
    /// TTL of cached domain -> tenant mappings
    pub cache_ttl: Duration,
}

/// Cache key holding the tenant id a domain resolves to
pub fn cache_key(domain: &str) -> String {
    format!("domain:{}", domain)
}

/// Custom domain service
#[derive(Clone)]
pub struct DomainService {
    store: Arc<dyn DomainStore>,
    dns: Arc<dyn DnsResolver>,
    cache: Arc<dyn KeyValueCache>,
    tenants: Arc<dyn TenantDirectory>,
    config: Arc<DomainConfig>,
}

impl DomainService {
    pub fn new(
        store: Arc<dyn DomainStore>,
        dns: Arc<dyn DnsResolver>,
        cache: Arc<dyn KeyValueCache>,
        tenants: Arc<dyn TenantDirectory>,
        config: DomainConfig,
    ) -> Self {
        Self {
            store,
            dns,
            cache,
            tenants,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list_domains(&self, tenant_id: TenantId) -> DomainResult<Vec<CustomDomain>> {
        Ok(self.store.list_for_tenant(tenant_id).await?)
    }

    pub async fn get_domain(&self, domain_id: Uuid, tenant_id: TenantId) -> DomainResult<CustomDomain> {
        self.store
            .find(domain_id, tenant_id)
            .await?
            .ok_or(DomainError::NotFound)
    }

    /// Records the tenant has to publish for `domain`
    pub fn dns_instructions(&self, domain: &CustomDomain) -> DnsInstructions {
        DnsInstructions {
            txt: DnsRecord {
                record_type: "TXT".to_string(),
                name: domain.txt_record_name(),
                value: domain.verification_token.clone(),
                ttl: SUGGESTED_RECORD_TTL,
            },
            cname: DnsRecord {
                record_type: "CNAME".to_string(),
                name: domain.domain.clone(),
                value: self.config.cname_target.clone(),
                ttl: SUGGESTED_RECORD_TTL,
            },
            a: DnsRecord {
                record_type: "A".to_string(),
                name: domain.domain.clone(),
                value: self.config.server_ip.to_string(),
                ttl: SUGGESTED_RECORD_TTL,
            },
        }
    }

    /// Readiness check of the registry
    pub async fn ping(&self) -> DomainResult<()> {
        Ok(self.store.ping().await?)
    }

    // =========================================================================
    // Verification engine
    // =========================================================================

    /// Claim `domain` for `tenant_id`
    pub async fn add_domain(
        &self,
        tenant_id: TenantId,
        domain: &str,
        is_primary: bool,
    ) -> DomainResult<CustomDomain> {
        let domain = normalize_domain(domain);
        if !is_valid_domain(&domain) {
            return Err(DomainError::Validation(
                "Invalid domain format. Please enter a valid domain like 'shop.yourcompany.com'"
                    .to_string(),
            ));
        }
        if is_platform_name(&domain, &self.config.platform_domain) {
            return Err(DomainError::Validation(format!(
                "Domains under {} are managed by the platform and cannot be added as custom domains",
                self.config.platform_domain
            )));
        }

        let now = OffsetDateTime::now_utc();
        let mut record = CustomDomain::new_pending(tenant_id, domain, Challenge::issue(now), now);

        // The unique index decides races between concurrent claims
        match self.store.insert(&record).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(_)) => {
                return Err(self.claim_conflict(tenant_id, &record.domain).await);
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            domain = %record.domain,
            domain_id = %record.id,
            tenant_id = %tenant_id,
            "Custom domain added"
        );

        if is_primary {
            match self.assign_primary(record.id, tenant_id).await {
                Ok(changed) => {
                    self.invalidate_all(&changed).await;
                    record.is_primary = true;
                }
                Err(e) => {
                    // Don't leave a half-created claim holding the name
                    warn!(domain = %record.domain, error = %e, "Primary assignment failed, removing new domain");
                    if let Err(delete_err) = self.store.delete(record.id, tenant_id).await {
                        error!(
                            domain = %record.domain,
                            domain_id = %record.id,
                            error = %delete_err,
                            "Failed to remove domain after primary assignment failed"
                        );
                    }
                    return Err(e);
                }
            }
        }

        Ok(record)
    }

    /// Check the TXT challenge for a domain
    ///
    /// Pull-based and repeatable: callers poll until DNS propagates, bounded
    /// by the verification window.
    pub async fn verify(&self, domain_id: Uuid, tenant_id: TenantId) -> DomainResult<VerificationOutcome> {
        let mut record = self.get_domain(domain_id, tenant_id).await?;
        let now = OffsetDateTime::now_utc();
        let previous_status = record.status;
        let was_routable = record.is_routable();

        // An expired token is never checked against DNS, whatever the status
        if record.verification_expired(now) {
            record.status = DomainStatus::Expired;
            record.last_error = Some("Verification window expired".to_string());
            record.updated_at = now;
            self.save(&record).await?;

            if was_routable {
                self.invalidate(&record.domain).await;
            }

            info!(
                domain = %record.domain,
                domain_id = %record.id,
                was_routable,
                "Verification token expired"
            );
            return Ok(VerificationOutcome {
                verified: false,
                status: DomainStatus::Expired,
                message: "Verification token has expired. Generate a new token and update your TXT record."
                    .to_string(),
                domain: record,
            });
        }

        record.verification_attempts += 1;
        record.last_verification_attempt = Some(now);
        record.status = DomainStatus::Verifying;
        record.updated_at = now;
        self.save(&record).await?;

        let txt_name = record.txt_record_name();
        let lookup = self.dns.lookup_txt(&txt_name).await;
        let now = OffsetDateTime::now_utc();
        record.updated_at = now;

        let (verified, message) = match lookup {
            Ok(values) if values.iter().any(|v| v.trim() == record.verification_token) => {
                record.status = if previous_status == DomainStatus::Active {
                    DomainStatus::Active
                } else {
                    DomainStatus::Verified
                };
                record.verified_at = record.verified_at.or(Some(now));
                record.is_active = true;
                record.last_error = None;
                (true, "Domain ownership verified.".to_string())
            }
            Ok(values) if !values.iter().any(|v| is_well_formed_token(v.trim())) => {
                // Some other provider's record sits at the challenge name
                record.status = DomainStatus::Pending;
                record.last_error = Some(format!(
                    "TXT record at {} is not a Raya verification token (found: {})",
                    txt_name,
                    values.join(", ")
                ));
                (
                    false,
                    format!(
                        "TXT record at {} is not a Raya verification token. Set its value to {}",
                        txt_name, record.verification_token
                    ),
                )
            }
            Ok(values) => {
                record.status = DomainStatus::Pending;
                record.last_error = Some(format!(
                    "TXT record at {} does not match the expected token (found: {})",
                    txt_name,
                    values.join(", ")
                ));
                (
                    false,
                    format!(
                        "TXT record found at {} but its value does not match. Expected {}",
                        txt_name, record.verification_token
                    ),
                )
            }
            Err(err) if err.is_no_records() => {
                record.status = DomainStatus::Pending;
                record.last_error = Some(format!("No TXT record found at {}", txt_name));
                (
                    false,
                    format!(
                        "TXT record not found. Add a TXT record at {} with value {}. DNS changes can take a few minutes to propagate.",
                        txt_name, record.verification_token
                    ),
                )
            }
            Err(err) => {
                warn!(domain = %record.domain, error = %err, "DNS lookup failed during verification");
                record.status = DomainStatus::Failed;
                record.last_error = Some(err.to_string());
                (false, format!("DNS lookup failed: {}. Please try again later.", err))
            }
        };

        self.save(&record).await?;

        // Routing changes whenever the domain gains or loses its verified state
        if verified || was_routable {
            self.invalidate(&record.domain).await;
        }

        info!(
            domain = %record.domain,
            domain_id = %record.id,
            verified,
            status = %record.status,
            attempts = record.verification_attempts,
            "Domain verification attempted"
        );

        Ok(VerificationOutcome {
            verified,
            status: record.status,
            message,
            domain: record,
        })
    }

    /// Issue a new challenge for a domain that hasn't been verified
    pub async fn regenerate_verification_token(
        &self,
        domain_id: Uuid,
        tenant_id: TenantId,
    ) -> DomainResult<CustomDomain> {
        let mut record = self.get_domain(domain_id, tenant_id).await?;
        if record.status.is_verified() {
            return Err(DomainError::InvalidState(
                "Domain is already verified; its verification token cannot be regenerated".to_string(),
            ));
        }

        let now = OffsetDateTime::now_utc();
        let challenge = Challenge::issue(now);
        record.verification_token = challenge.token;
        record.verification_expires_at = challenge.expires_at;
        record.verification_attempts = 0;
        record.status = DomainStatus::Pending;
        record.last_error = None;
        record.updated_at = now;
        self.save(&record).await?;

        info!(domain = %record.domain, domain_id = %record.id, "Verification token regenerated");
        Ok(record)
    }

    /// Make a verified, active domain the tenant's primary domain
    pub async fn set_primary(&self, domain_id: Uuid, tenant_id: TenantId) -> DomainResult<CustomDomain> {
        let mut record = self.get_domain(domain_id, tenant_id).await?;
        if !record.is_routable() {
            return Err(DomainError::InvalidState(
                "Only verified, active domains can be set as primary".to_string(),
            ));
        }

        let changed = self.assign_primary(record.id, tenant_id).await?;
        self.invalidate_all(&changed).await;

        info!(domain = %record.domain, tenant_id = %tenant_id, "Primary domain changed");
        record.is_primary = true;
        Ok(record)
    }

    /// Apply tenant-controlled changes (currently the active flag)
    pub async fn update_domain(
        &self,
        domain_id: Uuid,
        tenant_id: TenantId,
        update: UpdateDomain,
    ) -> DomainResult<CustomDomain> {
        let mut record = self.get_domain(domain_id, tenant_id).await?;

        if let Some(is_active) = update.is_active {
            record.is_active = is_active;
        }
        record.updated_at = OffsetDateTime::now_utc();
        self.save(&record).await?;
        self.invalidate(&record.domain).await;

        Ok(record)
    }

    /// Delete a domain; its cached resolution is dropped first
    pub async fn remove_domain(&self, domain_id: Uuid, tenant_id: TenantId) -> DomainResult<()> {
        let record = self.get_domain(domain_id, tenant_id).await?;

        self.cache.del(&cache_key(&record.domain)).await?;

        if !self.store.delete(domain_id, tenant_id).await? {
            return Err(DomainError::NotFound);
        }

        info!(domain = %record.domain, domain_id = %domain_id, "Custom domain removed");
        Ok(())
    }

    /// Mark unverified domains whose window has closed as EXPIRED
    pub async fn expire_stale_verifications(&self) -> DomainResult<u64> {
        Ok(self.store.expire_stale(OffsetDateTime::now_utc()).await?)
    }

    // =========================================================================
    // DNS configuration checker
    // =========================================================================

    /// Check that the domain's traffic is routed to the platform
    ///
    /// Independent of ownership verification: this never changes `status`.
    pub async fn check_dns_configuration(
        &self,
        domain_id: Uuid,
        tenant_id: TenantId,
    ) -> DomainResult<DnsCheckResult> {
        let record = self.get_domain(domain_id, tenant_id).await?;

        let (cname_lookup, a_lookup) = tokio::join!(
            self.dns.lookup_cname(&record.domain),
            self.dns.lookup_a(&record.domain)
        );
        let cnames = best_effort(&record.domain, "CNAME", cname_lookup);
        let addrs = best_effort(&record.domain, "A", a_lookup);

        let cname_valid = cnames.iter().any(|cname| *cname == self.config.cname_target);
        let a_record_valid = addrs.contains(&self.config.server_ip);

        // Apex domains can't hold a CNAME; ALIAS/ANAME providers flatten it
        // into the target's A records instead
        let alias_valid = if !cname_valid && !a_record_valid && !addrs.is_empty() {
            let target_addrs: HashSet<Ipv4Addr> = best_effort(
                &self.config.cname_target,
                "A",
                self.dns.lookup_a(&self.config.cname_target).await,
            )
            .into_iter()
            .collect();
            addrs.iter().any(|addr| target_addrs.contains(addr))
        } else {
            false
        };

        let configured = cname_valid || a_record_valid || alias_valid;
        let snapshot = DnsRecordsSnapshot {
            a: addrs,
            cname: cnames,
            checked_at: OffsetDateTime::now_utc(),
        };

        if !self
            .store
            .update_dns_records(record.id, tenant_id, &snapshot)
            .await?
        {
            return Err(DomainError::NotFound);
        }

        let message = if configured {
            "DNS is configured correctly.".to_string()
        } else {
            format!(
                "DNS is not pointing to the platform. Add a CNAME record {} -> {}, or an A record {} -> {}.",
                record.domain, self.config.cname_target, record.domain, self.config.server_ip
            )
        };

        debug!(domain = %record.domain, configured, cname_valid, a_record_valid, alias_valid, "DNS configuration checked");

        Ok(DnsCheckResult {
            configured,
            cname_valid,
            a_record_valid,
            alias_valid,
            expected_cname: self.config.cname_target.clone(),
            expected_ip: self.config.server_ip,
            records: snapshot,
            message,
        })
    }

    // =========================================================================
    // Tenant resolution
    // =========================================================================

    /// Resolve a domain to the tenant it routes to
    ///
    /// Cache first (`domain:<name>`), then the registry. Only positive answers
    /// are cached. A cache outage degrades to registry lookups.
    pub async fn find_tenant_by_domain(&self, domain: &str) -> DomainResult<Option<Tenant>> {
        let domain = normalize_domain(domain);
        let key = cache_key(&domain);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match cached.parse::<TenantId>() {
                Ok(tenant_id) => {
                    if let Some(tenant) = self.tenants.find_by_id(tenant_id).await? {
                        return Ok(Some(tenant));
                    }
                    // Tenant is gone; drop the stale mapping and re-check the registry
                    self.invalidate(&domain).await;
                }
                Err(_) => {
                    warn!(domain = %domain, value = %cached, "Discarding malformed domain cache entry");
                    self.invalidate(&domain).await;
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(domain = %domain, error = %e, "Domain cache unavailable, falling back to registry");
            }
        }

        let Some(row) = self.store.find_routable(&domain).await? else {
            return Ok(None);
        };
        let Some(tenant) = self.tenants.find_by_id(row.tenant_id).await? else {
            return Ok(None);
        };

        if let Err(e) = self
            .cache
            .set(&key, &tenant.id.to_string(), self.config.cache_ttl.as_secs())
            .await
        {
            warn!(domain = %domain, error = %e, "Failed to cache domain resolution");
        }

        Ok(Some(tenant))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn save(&self, record: &CustomDomain) -> DomainResult<()> {
        if self.store.update(record).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    async fn assign_primary(&self, domain_id: Uuid, tenant_id: TenantId) -> DomainResult<Vec<String>> {
        match self.store.set_primary(domain_id, tenant_id).await {
            Ok(changed) => Ok(changed),
            Err(StoreError::NotFound) => Err(DomainError::NotFound),
            Err(StoreError::UniqueViolation(_)) => Err(DomainError::Conflict(
                "Another primary domain change is in progress. Please try again.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Map a unique violation on insert to the message for the caller
    async fn claim_conflict(&self, tenant_id: TenantId, domain: &str) -> DomainError {
        match self.store.find_by_domain(domain).await {
            Ok(Some(existing)) if existing.tenant_id == tenant_id => DomainError::Conflict(
                "This domain is already configured for your account".to_string(),
            ),
            Ok(_) => DomainError::Conflict(
                "This domain is already used by another account".to_string(),
            ),
            Err(e) => {
                error!(domain = %domain, error = %e, "Failed to look up conflicting domain");
                DomainError::Conflict("This domain is already registered".to_string())
            }
        }
    }

    /// Drop a domain's cached resolution; failures leave the entry to its TTL
    async fn invalidate(&self, domain: &str) {
        if let Err(e) = self.cache.del(&cache_key(domain)).await {
            error!(domain = %domain, error = %e, "Failed to invalidate domain cache entry");
        }
    }

    async fn invalidate_all(&self, domains: &[String]) {
        for domain in domains {
            self.invalidate(domain).await;
        }
    }
}

/// Records from a lookup where absence (or failure) just means "none seen"
fn best_effort<T>(name: &str, record_type: &str, lookup: Result<Vec<T>, DnsLookupError>) -> Vec<T> {
    match lookup {
        Ok(records) => records,
        Err(err) if err.is_no_records() => Vec::new(),
        Err(err) => {
            warn!(domain = %name, record_type, error = %err, "DNS lookup failed during configuration check");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::dns::StaticDnsResolver;
    use crate::domains::store::MemoryDomainStore;
    use crate::tenants::MemoryTenantDirectory;

    fn config() -> DomainConfig {
        DomainConfig {
            platform_domain: "raya.app".to_string(),
            server_ip: Ipv4Addr::new(203, 0, 113, 10),
            cname_target: "edge.raya.app".to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    fn service() -> (DomainService, Arc<StaticDnsResolver>) {
        let dns = Arc::new(StaticDnsResolver::new());
        let service = DomainService::new(
            Arc::new(MemoryDomainStore::new()),
            dns.clone(),
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryTenantDirectory::new()),
            config(),
        );
        (service, dns)
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("shop.example.com"), "domain:shop.example.com");
    }

    #[tokio::test]
    async fn test_add_domain_normalizes() {
        let (service, _) = service();
        let domain = service
            .add_domain(TenantId(1), "  Shop.Example.COM. ", false)
            .await
            .unwrap();
        assert_eq!(domain.domain, "shop.example.com");
        assert_eq!(domain.status, DomainStatus::Pending);
    }

    #[tokio::test]
    async fn test_add_domain_rejects_malformed() {
        let (service, _) = service();
        let err = service.add_domain(TenantId(1), "not a domain", false).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_dns_instructions() {
        let (service, _) = service();
        let domain = service.add_domain(TenantId(1), "shop.example.com", false).await.unwrap();
        let instructions = service.dns_instructions(&domain);

        assert_eq!(instructions.txt.name, "_raya-verification.shop.example.com");
        assert_eq!(instructions.txt.value, domain.verification_token);
        assert_eq!(instructions.cname.value, "edge.raya.app");
        assert_eq!(instructions.a.value, "203.0.113.10");
    }

    #[tokio::test]
    async fn test_dns_failure_marks_failed() {
        let (service, dns) = service();
        let domain = service.add_domain(TenantId(1), "shop.example.com", false).await.unwrap();
        dns.fail(
            &domain.txt_record_name(),
            DnsLookupError::Failed("SERVFAIL".to_string()),
        );

        let outcome = service.verify(domain.id, TenantId(1)).await.unwrap();
        assert!(!outcome.verified);
        assert_eq!(outcome.status, DomainStatus::Failed);
        assert!(outcome.domain.last_error.unwrap().contains("SERVFAIL"));
    }

    #[tokio::test]
    async fn test_mismatched_token_stays_pending() {
        let (service, dns) = service();
        let domain = service.add_domain(TenantId(1), "shop.example.com", false).await.unwrap();
        dns.add_txt(&domain.txt_record_name(), "raya-verify=00000000000000000000000000000000");

        let outcome = service.verify(domain.id, TenantId(1)).await.unwrap();
        assert!(!outcome.verified);
        assert_eq!(outcome.status, DomainStatus::Pending);
        assert!(outcome.domain.last_error.unwrap().contains("does not match"));
        assert_eq!(outcome.domain.verification_attempts, 1);
    }

    #[tokio::test]
    async fn test_unknown_domain_is_not_found() {
        let (service, _) = service();
        let err = service.verify(Uuid::new_v4(), TenantId(1)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    /// Memory store whose primary assignment always fails
    #[derive(Default)]
    struct BrokenPrimaryStore {
        inner: MemoryDomainStore,
    }

    #[async_trait::async_trait]
    impl DomainStore for BrokenPrimaryStore {
        async fn insert(&self, domain: &CustomDomain) -> Result<(), StoreError> {
            self.inner.insert(domain).await
        }

        async fn find(&self, id: Uuid, tenant_id: TenantId) -> Result<Option<CustomDomain>, StoreError> {
            self.inner.find(id, tenant_id).await
        }

        async fn find_by_domain(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError> {
            self.inner.find_by_domain(domain).await
        }

        async fn find_routable(&self, domain: &str) -> Result<Option<CustomDomain>, StoreError> {
            self.inner.find_routable(domain).await
        }

        async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<CustomDomain>, StoreError> {
            self.inner.list_for_tenant(tenant_id).await
        }

        async fn update(&self, domain: &CustomDomain) -> Result<bool, StoreError> {
            self.inner.update(domain).await
        }

        async fn update_dns_records(
            &self,
            id: Uuid,
            tenant_id: TenantId,
            records: &DnsRecordsSnapshot,
        ) -> Result<bool, StoreError> {
            self.inner.update_dns_records(id, tenant_id, records).await
        }

        async fn set_primary(&self, _id: Uuid, _tenant_id: TenantId) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Database("connection reset".to_string()))
        }

        async fn delete(&self, id: Uuid, tenant_id: TenantId) -> Result<bool, StoreError> {
            self.inner.delete(id, tenant_id).await
        }

        async fn expire_stale(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
            self.inner.expire_stale(now).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_failed_primary_assignment_releases_claim() {
        let store = Arc::new(BrokenPrimaryStore::default());
        let service = DomainService::new(
            store.clone(),
            Arc::new(StaticDnsResolver::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryTenantDirectory::new()),
            config(),
        );

        let err = service
            .add_domain(TenantId(1), "shop.example.com", true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Store(_)));
        assert!(store.find_by_domain("shop.example.com").await.unwrap().is_none());

        // The name isn't stuck behind the failed attempt
        let domain = service
            .add_domain(TenantId(1), "shop.example.com", false)
            .await
            .unwrap();
        assert!(!domain.is_primary);
    }
}
