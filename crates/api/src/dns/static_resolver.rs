//! In-memory resolver serving a fixed record set
//!
//! Used by tests and local development, where tenants' DNS can't be published.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::{normalize_name, DnsLookupError, DnsResolver};

#[derive(Default)]
struct Records {
    txt: HashMap<String, Vec<String>>,
    a: HashMap<String, Vec<Ipv4Addr>>,
    cname: HashMap<String, Vec<String>>,
    failures: HashMap<String, DnsLookupError>,
}

/// Resolver answering from records registered at runtime
#[derive(Default)]
pub struct StaticDnsResolver {
    records: RwLock<Records>,
    lookups: AtomicUsize,
}

impl StaticDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a TXT record
    pub fn add_txt(&self, name: &str, value: &str) {
        if let Ok(mut records) = self.records.write() {
            records
                .txt
                .entry(normalize_name(name))
                .or_default()
                .push(value.to_string());
        }
    }

    /// Publish an A record
    pub fn add_a(&self, name: &str, addr: Ipv4Addr) {
        if let Ok(mut records) = self.records.write() {
            records.a.entry(normalize_name(name)).or_default().push(addr);
        }
    }

    /// Publish a CNAME record
    pub fn add_cname(&self, name: &str, target: &str) {
        if let Ok(mut records) = self.records.write() {
            records
                .cname
                .entry(normalize_name(name))
                .or_default()
                .push(normalize_name(target));
        }
    }

    /// Make every lookup of `name` fail with `error`
    pub fn fail(&self, name: &str, error: DnsLookupError) {
        if let Ok(mut records) = self.records.write() {
            records.failures.insert(normalize_name(name), error);
        }
    }

    /// Remove all records and failures for `name`
    pub fn clear(&self, name: &str) {
        let name = normalize_name(name);
        if let Ok(mut records) = self.records.write() {
            records.txt.remove(&name);
            records.a.remove(&name);
            records.cname.remove(&name);
            records.failures.remove(&name);
        }
    }

    /// Number of lookups served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn answer<T: Clone>(
        &self,
        name: &str,
        record_type: &'static str,
        select: impl Fn(&Records) -> &HashMap<String, Vec<T>>,
    ) -> Result<Vec<T>, DnsLookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let name = normalize_name(name);

        let records = self
            .records
            .read()
            .map_err(|_| DnsLookupError::Failed("record set poisoned".to_string()))?;

        if let Some(err) = records.failures.get(&name) {
            return Err(err.clone());
        }

        match select(&records).get(&name) {
            Some(values) if !values.is_empty() => Ok(values.clone()),
            _ => Err(DnsLookupError::NoRecords { name, record_type }),
        }
    }
}

#[async_trait]
impl DnsResolver for StaticDnsResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
        self.answer(name, "TXT", |records| &records.txt)
    }

    async fn lookup_a(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsLookupError> {
        self.answer(name, "A", |records| &records.a)
    }

    async fn lookup_cname(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
        self.answer(name, "CNAME", |records| &records.cname)
    }
}
