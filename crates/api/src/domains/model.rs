//! Custom domain entity and the values returned by the domain service

use raya_shared::{DomainStatus, DomainType, TenantId};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use time::OffsetDateTime;
use uuid::Uuid;

use super::challenge::Challenge;

/// Label prepended to a domain to form the TXT challenge name
pub const VERIFICATION_RECORD_LABEL: &str = "_raya-verification";

/// Ownership proof method; only TXT challenges are supported
pub const VERIFICATION_METHOD: &str = "TXT";

/// TTL suggested to tenants for the records they publish
pub const SUGGESTED_RECORD_TTL: u32 = 3600;

/// A DNS name claimed by a tenant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomDomain {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub domain: String,
    pub domain_type: DomainType,
    pub status: DomainStatus,
    pub verification_token: String,
    pub verification_method: String,
    #[serde(with = "time::serde::rfc3339")]
    pub verification_expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub verified_at: Option<OffsetDateTime>,
    pub ssl_enabled: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ssl_expires_at: Option<OffsetDateTime>,
    pub ssl_provider: Option<String>,
    pub is_primary: bool,
    pub is_active: bool,
    pub last_error: Option<String>,
    pub verification_attempts: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_verification_attempt: Option<OffsetDateTime>,
    pub dns_records: Option<DnsRecordsSnapshot>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CustomDomain {
    /// A freshly claimed, unverified domain
    pub fn new_pending(tenant_id: TenantId, domain: String, challenge: Challenge, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            domain,
            domain_type: DomainType::Custom,
            status: DomainStatus::Pending,
            verification_token: challenge.token,
            verification_method: VERIFICATION_METHOD.to_string(),
            verification_expires_at: challenge.expires_at,
            verified_at: None,
            ssl_enabled: false,
            ssl_expires_at: None,
            ssl_provider: None,
            is_primary: false,
            is_active: false,
            last_error: None,
            verification_attempts: 0,
            last_verification_attempt: None,
            dns_records: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name the TXT challenge must be published at
    pub fn txt_record_name(&self) -> String {
        format!("{}.{}", VERIFICATION_RECORD_LABEL, self.domain)
    }

    /// Whether requests for this domain should be routed to its tenant
    pub fn is_routable(&self) -> bool {
        self.is_active && self.status.is_verified()
    }

    pub fn verification_expired(&self, now: OffsetDateTime) -> bool {
        now > self.verification_expires_at
    }
}

/// Routing records observed by the last DNS configuration check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordsSnapshot {
    pub a: Vec<Ipv4Addr>,
    pub cname: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub checked_at: OffsetDateTime,
}

/// Result of an ownership verification attempt
///
/// "Not verified yet" is an expected answer while DNS propagates, so it is
/// returned as a value rather than an error.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub status: DomainStatus,
    pub message: String,
    pub domain: CustomDomain,
}

/// Result of a traffic-routing (A / CNAME) check
#[derive(Debug, Clone, Serialize)]
pub struct DnsCheckResult {
    pub configured: bool,
    pub cname_valid: bool,
    pub a_record_valid: bool,
    /// Apex ALIAS/ANAME records flattened to the CNAME target's addresses
    pub alias_valid: bool,
    pub expected_cname: String,
    pub expected_ip: Ipv4Addr,
    pub records: DnsRecordsSnapshot,
    pub message: String,
}

/// Records a tenant has to publish for a domain
#[derive(Debug, Clone, Serialize)]
pub struct DnsInstructions {
    pub txt: DnsRecord,
    pub cname: DnsRecord,
    /// Alternative to the CNAME for apex domains
    pub a: DnsRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    pub record_type: String,
    pub name: String,
    pub value: String,
    pub ttl: u32,
}

/// Tenant-controlled changes to an existing domain
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDomain {
    pub is_active: Option<bool>,
}
