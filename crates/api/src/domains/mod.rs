//! Custom domains: ownership verification, routing checks and tenant lookup

pub mod challenge;
mod error;
pub mod model;
pub mod names;
mod service;
pub mod store;

pub use error::{DomainError, DomainResult};
pub use model::{
    CustomDomain, DnsCheckResult, DnsInstructions, DnsRecord, DnsRecordsSnapshot, UpdateDomain,
    VerificationOutcome,
};
pub use service::{cache_key, DomainConfig, DomainService, DEFAULT_CACHE_TTL};
pub use store::{DomainStore, MemoryDomainStore, PgDomainStore, StoreError};
