//! trust-dns backed resolver

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::lookup::Lookup;
use trust_dns_resolver::proto::rr::RecordType;
use trust_dns_resolver::TokioAsyncResolver;

use super::{normalize_name, DnsLookupError, DnsResolver};

/// Resolver that queries public DNS through trust-dns
#[derive(Clone)]
pub struct TrustDnsResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl TrustDnsResolver {
    /// Create a resolver using Cloudflare's public resolvers
    ///
    /// Tenants usually publish records at their registrar and then poll,
    /// so we query a public upstream rather than the host's resolver.
    pub fn new(timeout: Duration) -> Self {
        Self::with_config(ResolverConfig::cloudflare(), timeout)
    }

    pub fn with_config(config: ResolverConfig, timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }

    async fn lookup(&self, name: &str, record_type: RecordType) -> Result<Lookup, DnsLookupError> {
        match tokio::time::timeout(self.timeout, self.resolver.lookup(name, record_type)).await {
            Ok(Ok(lookup)) => Ok(lookup),
            Ok(Err(err)) => Err(map_resolve_error(name, record_type, err)),
            Err(_) => Err(DnsLookupError::Timeout(name.to_string())),
        }
    }
}

#[async_trait]
impl DnsResolver for TrustDnsResolver {
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
        let lookup = self.lookup(name, RecordType::TXT).await?;

        // A single TXT record may be split into several character-strings
        let records: Vec<String> = lookup
            .iter()
            .filter_map(|rdata| rdata.as_txt())
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<String>()
            })
            .collect();

        non_empty(records, name, "TXT")
    }

    async fn lookup_a(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsLookupError> {
        let lookup = self.lookup(name, RecordType::A).await?;
        let addrs: Vec<Ipv4Addr> = lookup
            .iter()
            .filter_map(|rdata| rdata.as_a())
            .map(|a| a.0)
            .collect();

        non_empty(addrs, name, "A")
    }

    async fn lookup_cname(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
        let lookup = self.lookup(name, RecordType::CNAME).await?;
        let targets: Vec<String> = lookup
            .iter()
            .filter_map(|rdata| rdata.as_cname())
            .map(|cname| normalize_name(&cname.to_string()))
            .collect();

        non_empty(targets, name, "CNAME")
    }
}

fn non_empty<T>(
    records: Vec<T>,
    name: &str,
    record_type: &'static str,
) -> Result<Vec<T>, DnsLookupError> {
    if records.is_empty() {
        Err(DnsLookupError::NoRecords {
            name: name.to_string(),
            record_type,
        })
    } else {
        Ok(records)
    }
}

fn map_resolve_error(name: &str, record_type: RecordType, err: ResolveError) -> DnsLookupError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => DnsLookupError::NoRecords {
            name: name.to_string(),
            record_type: record_type_label(record_type),
        },
        ResolveErrorKind::Timeout => DnsLookupError::Timeout(name.to_string()),
        _ => DnsLookupError::Failed(err.to_string()),
    }
}

fn record_type_label(record_type: RecordType) -> &'static str {
    match record_type {
        RecordType::TXT => "TXT",
        RecordType::A => "A",
        RecordType::CNAME => "CNAME",
        _ => "DNS",
    }
}
