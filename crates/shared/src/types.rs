//! Common types used across Raya

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant ID wrapper (tenants are keyed by a numeric id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TenantId(pub i64);

impl From<i64> for TenantId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

// =============================================================================
// Tenants
// =============================================================================

/// Read-only view of a tenant as seen by the domain subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: TenantId,
    /// Short code used in URLs and logs
    pub code: String,
    pub name: String,
}

// =============================================================================
// Enums
// =============================================================================

/// Lifecycle state of a custom domain
///
/// Stored as TEXT in PostgreSQL (lowercase snake case), exposed over the API
/// in upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainStatus {
    #[default]
    Pending,
    Verifying,
    Verified,
    SslPending,
    Active,
    Failed,
    Expired,
    Disabled,
}

impl DomainStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::SslPending => "ssl_pending",
            Self::Active => "active",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::Disabled => "disabled",
        }
    }

    /// Whether ownership has been proven (VERIFIED or the later ACTIVE state)
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified | Self::Active)
    }

    /// Statuses whose verification window is still being waited on
    pub fn awaiting_verification(&self) -> bool {
        matches!(self, Self::Pending | Self::Verifying | Self::Failed)
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DomainStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "verifying" => Ok(Self::Verifying),
            "verified" => Ok(Self::Verified),
            "ssl_pending" => Ok(Self::SslPending),
            "active" => Ok(Self::Active),
            "failed" => Ok(Self::Failed),
            "expired" => Ok(Self::Expired),
            "disabled" => Ok(Self::Disabled),
            _ => Err(format!("Invalid domain status: {}", s)),
        }
    }
}

/// Kind of hostname a tenant has claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainType {
    /// Externally owned DNS name
    #[default]
    Custom,
    /// Name under the platform domain
    Subdomain,
}

impl DomainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Subdomain => "subdomain",
        }
    }
}

impl std::fmt::Display for DomainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DomainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "custom" => Ok(Self::Custom),
            "subdomain" => Ok(Self::Subdomain),
            _ => Err(format!("Invalid domain type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // DomainStatus Tests
    // =========================================================================

    #[test]
    fn test_domain_status_default() {
        assert_eq!(DomainStatus::default(), DomainStatus::Pending);
    }

    #[test]
    fn test_domain_status_db_round_trip() {
        for status in [
            DomainStatus::Pending,
            DomainStatus::Verifying,
            DomainStatus::Verified,
            DomainStatus::SslPending,
            DomainStatus::Active,
            DomainStatus::Failed,
            DomainStatus::Expired,
            DomainStatus::Disabled,
        ] {
            assert_eq!(status.as_str().parse::<DomainStatus>(), Ok(status));
        }
        assert!("bogus".parse::<DomainStatus>().is_err());
    }

    #[test]
    fn test_domain_status_serializes_upper_case() {
        let json = serde_json::to_string(&DomainStatus::SslPending).unwrap();
        assert_eq!(json, "\"SSL_PENDING\"");
    }

    #[test]
    fn test_domain_status_is_verified() {
        assert!(DomainStatus::Verified.is_verified());
        assert!(DomainStatus::Active.is_verified());
        assert!(!DomainStatus::Pending.is_verified());
        assert!(!DomainStatus::SslPending.is_verified());
        assert!(!DomainStatus::Expired.is_verified());
    }

    // =========================================================================
    // TenantId Tests
    // =========================================================================

    #[test]
    fn test_tenant_id_parse() {
        assert_eq!(" 42 ".parse::<TenantId>(), Ok(TenantId(42)));
        assert!("acme".parse::<TenantId>().is_err());
        assert_eq!(TenantId(7).to_string(), "7");
    }
}
