//! Domain name normalization and validation

/// Normalize a domain entered by a tenant or taken from a Host header
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}

/// Validate domain format
pub fn is_valid_domain(domain: &str) -> bool {
    // Basic validation - should have at least one dot, no spaces, alphanumeric + hyphen
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    for part in parts {
        if part.is_empty() || part.len() > 63 {
            return false;
        }
        if part.starts_with('-') || part.ends_with('-') {
            return false;
        }
        if !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}

/// Whether `domain` is the platform domain itself or any name under it
pub fn is_platform_name(domain: &str, platform_domain: &str) -> bool {
    domain == platform_domain || domain.ends_with(&format!(".{}", platform_domain))
}
