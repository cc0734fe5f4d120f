//! Ownership challenge tokens

use rand::RngCore;
use time::{Duration, OffsetDateTime};

/// Prefix of every verification token published in DNS
pub const TOKEN_PREFIX: &str = "raya-verify=";

/// How long a token remains a valid proof
pub const VERIFICATION_WINDOW: Duration = Duration::days(7);

/// A single-use verification token and the end of its validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

impl Challenge {
    /// Issue a new challenge valid for [`VERIFICATION_WINDOW`] from `now`
    pub fn issue(now: OffsetDateTime) -> Self {
        Self {
            token: generate_verification_token(),
            expires_at: now + VERIFICATION_WINDOW,
        }
    }
}

/// Generate a secure verification token (`raya-verify=` + 32 hex chars)
pub fn generate_verification_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", TOKEN_PREFIX, hex::encode(bytes))
}

/// Check a token has the shape produced by [`generate_verification_token`]
pub fn is_well_formed_token(token: &str) -> bool {
    token
        .strip_prefix(TOKEN_PREFIX)
        .map(|hex_part| {
            hex_part.len() == 32
                && hex_part
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        })
        .unwrap_or(false)
}
