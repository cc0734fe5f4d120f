//! Application configuration

use std::env;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::domains::DomainConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis (optional - falls back to the in-process cache when unset)
    pub redis_url: Option<String>,

    // Platform routing targets
    pub platform_domain: String, // e.g., "raya.app" for *.raya.app routing
    pub platform_server_ip: Ipv4Addr,
    pub platform_cname_target: String,

    // Resolution
    pub tenant_header: String,
    pub domain_cache_ttl_secs: u64,
    pub resolution_timeout_ms: u64,
    pub dns_lookup_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let platform_domain = env::var("PLATFORM_DOMAIN")
            .unwrap_or_else(|_| "localhost".to_string())
            .trim()
            .trim_end_matches('.')
            .to_lowercase();
        if platform_domain.is_empty() {
            return Err(ConfigError::Invalid("PLATFORM_DOMAIN must not be empty"));
        }

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            // Redis
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),

            // Platform routing targets
            platform_server_ip: env::var("PLATFORM_SERVER_IP")
                .unwrap_or_else(|_| "127.0.0.1".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PLATFORM_SERVER_IP must be an IPv4 address"))?,
            platform_cname_target: env::var("PLATFORM_CNAME_TARGET")
                .map(|target| target.trim().trim_end_matches('.').to_lowercase())
                .unwrap_or_else(|_| format!("cname.{}", platform_domain)),
            platform_domain,

            // Resolution
            tenant_header: env::var("TENANT_HEADER")
                .unwrap_or_else(|_| "x-tenant-id".to_string())
                .to_lowercase(),
            domain_cache_ttl_secs: env::var("DOMAIN_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            resolution_timeout_ms: env::var("RESOLUTION_TIMEOUT_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            dns_lookup_timeout_ms: env::var("DNS_LOOKUP_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
        })
    }

    /// Platform targets handed to the domain service at construction
    pub fn domain_config(&self) -> DomainConfig {
        DomainConfig {
            platform_domain: self.platform_domain.clone(),
            server_ip: self.platform_server_ip,
            cname_target: self.platform_cname_target.clone(),
            cache_ttl: Duration::from_secs(self.domain_cache_ttl_secs),
        }
    }

    pub fn resolution_timeout(&self) -> Duration {
        Duration::from_millis(self.resolution_timeout_ms)
    }

    pub fn dns_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_lookup_timeout_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
