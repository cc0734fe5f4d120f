//! Custom Domain Expiry Sweep
//!
//! Marks domains whose verification window closed without a successful TXT
//! check as EXPIRED, so stale claims show up as needing a new token even if
//! the tenant never polls `verify` again.

use raya_api::domains::DomainStore;
use time::OffsetDateTime;
use tracing::{error, info};

/// Default schedule: every 15 minutes
pub const DEFAULT_EXPIRY_SWEEP_CRON: &str = "0 */15 * * * *";

/// Run one sweep; returns the number of domains expired
pub async fn sweep_expired_verifications(store: &dyn DomainStore) -> u64 {
    match store.expire_stale(OffsetDateTime::now_utc()).await {
        Ok(0) => 0,
        Ok(count) => {
            info!(count, "Expired stale domain verifications");
            count
        }
        Err(e) => {
            error!(error = %e, "Failed to expire stale domain verifications");
            0
        }
    }
}
