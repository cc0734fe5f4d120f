//! DNS lookups used by custom domain verification
//!
//! The domain service never talks to a resolver library directly; it goes
//! through [`DnsResolver`] so verification can be driven by a static record
//! set in tests and by trust-dns in production.

mod static_resolver;
mod system;

use async_trait::async_trait;
use std::net::Ipv4Addr;

pub use static_resolver::StaticDnsResolver;
pub use system::TrustDnsResolver;

/// Async DNS lookups needed by the domain subsystem
///
/// Every lookup is bounded by the implementation's per-lookup timeout.
/// Dropping the returned future cancels the lookup.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// TXT records at `name`, one string per record (character-strings joined)
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsLookupError>;

    /// IPv4 addresses at `name`
    async fn lookup_a(&self, name: &str) -> Result<Vec<Ipv4Addr>, DnsLookupError>;

    /// CNAME targets at `name`, lowercase without the trailing dot
    async fn lookup_cname(&self, name: &str) -> Result<Vec<String>, DnsLookupError>;
}

/// Errors that can occur during a DNS lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnsLookupError {
    /// NXDOMAIN or NOERROR with an empty answer
    #[error("No {record_type} records found for {name}")]
    NoRecords {
        name: String,
        record_type: &'static str,
    },

    #[error("DNS lookup for {0} timed out")]
    Timeout(String),

    #[error("DNS lookup failed: {0}")]
    Failed(String),
}

impl DnsLookupError {
    /// "No data" and "not found" are expected answers rather than failures
    pub fn is_no_records(&self) -> bool {
        matches!(self, Self::NoRecords { .. })
    }
}

/// Normalize a DNS name for comparison (lowercase, no trailing dot)
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}
