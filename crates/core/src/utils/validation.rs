//! Tenant domain name validation

use lazy_static::lazy_static;
use raito_domain::{RaitoError, Result};
use regex::Regex;

lazy_static! {
    static ref DOMAIN_PATTERN: Regex = Regex::new(r"^[a-z][a-z0-9-]*[a-z0-9]$")
        .expect("DOMAIN_PATTERN should compile - this is a bug");
}

/// Check that `domain` starts with a lowercase letter, contains only
/// lowercase letters, digits and dashes, and does not end in a dash.
///
/// # Errors
/// Returns `RaitoError::Config` for an empty or malformed domain.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(RaitoError::Config("no domain specified".into()));
    }

    if !DOMAIN_PATTERN.is_match(domain) {
        return Err(RaitoError::Config(format!(
            "invalid domain name {domain:?}. A domain should start with a lowercase letter and \
             can only contain lowercase alphanumeric characters and the dash character. It also \
             should not end with a dash character"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_domains() {
        for domain in ["acme", "acme-corp", "a1", "tenant42-eu"] {
            assert!(validate_domain(domain).is_ok(), "{domain} should be accepted");
        }
    }

    #[test]
    fn rejects_malformed_domains() {
        for domain in ["", "a", "Acme", "acmE", "1acme", "-acme", "acme-", "ac_me", "ac.me"] {
            assert!(
                matches!(validate_domain(domain), Err(RaitoError::Config(_))),
                "{domain:?} should be rejected"
            );
        }
    }
}
