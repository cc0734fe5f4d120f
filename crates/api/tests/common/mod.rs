#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use raya_api::cache::{CacheError, KeyValueCache, MemoryCache};
use raya_api::dns::StaticDnsResolver;
use raya_api::domains::{DomainConfig, DomainService, MemoryDomainStore, DEFAULT_CACHE_TTL};
use raya_api::tenants::MemoryTenantDirectory;
use raya_shared::{Tenant, TenantId};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const PLATFORM_DOMAIN: &str = "raya.app";
pub const CNAME_TARGET: &str = "edge.raya.app";
pub const SERVER_IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 10);

pub const T1: TenantId = TenantId(1);
pub const T2: TenantId = TenantId(2);

/// Memory cache that counts calls and can be switched into an outage
#[derive(Default)]
pub struct FlakyCache {
    inner: MemoryCache,
    down: AtomicBool,
    gets: AtomicUsize,
}

impl FlakyCache {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.down.load(Ordering::SeqCst) {
            Err(CacheError::Backend("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueCache for FlakyCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        self.check()?;
        self.inner.set(key, value, ttl_secs).await
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.inner.del(key).await
    }
}

pub struct Harness {
    pub service: DomainService,
    pub store: Arc<MemoryDomainStore>,
    pub dns: Arc<StaticDnsResolver>,
    pub cache: Arc<FlakyCache>,
    pub tenants: Arc<MemoryTenantDirectory>,
}

pub fn domain_config() -> DomainConfig {
    DomainConfig {
        platform_domain: PLATFORM_DOMAIN.to_string(),
        server_ip: SERVER_IP,
        cname_target: CNAME_TARGET.to_string(),
        cache_ttl: DEFAULT_CACHE_TTL,
    }
}

pub async fn harness() -> Harness {
    let store = Arc::new(MemoryDomainStore::new());
    let dns = Arc::new(StaticDnsResolver::new());
    let cache = Arc::new(FlakyCache::default());
    let tenants = Arc::new(MemoryTenantDirectory::new());

    for (id, code) in [(T1, "acme"), (T2, "globex")] {
        tenants
            .insert(Tenant {
                id,
                code: code.to_string(),
                name: code.to_uppercase(),
            })
            .await;
    }

    let service = DomainService::new(
        store.clone(),
        dns.clone(),
        cache.clone(),
        tenants.clone(),
        domain_config(),
    );

    Harness {
        service,
        store,
        dns,
        cache,
        tenants,
    }
}

impl Harness {
    /// Add a domain for `tenant` and publish its TXT challenge
    pub async fn verified_domain(&self, tenant: TenantId, name: &str) -> raya_api::domains::CustomDomain {
        let domain = self.service.add_domain(tenant, name, false).await.unwrap();
        self.dns
            .add_txt(&domain.txt_record_name(), &domain.verification_token);
        let outcome = self.service.verify(domain.id, tenant).await.unwrap();
        assert!(outcome.verified, "{}", outcome.message);
        outcome.domain
    }
}
