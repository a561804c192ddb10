//! Utility functions for handling domain names and the forbidden-domain
//! denylist.

use crate::error::{AppError, Result};
use url::Url;

/// Extracts the bare registrable domain (e.g., "example.com") from a domain
/// string or full URL. Handles missing schemes, "www." prefixes, and ports.
pub(crate) fn registrable_domain(input: &str) -> Result<String> {
    tracing::debug!("Attempting to extract domain from input: {}", input);
    if input.is_empty() {
        return Err(AppError::DomainExtraction(
            "Input domain string is empty".to_string(),
        ));
    }

    let with_scheme = if !input.starts_with("http://") && !input.starts_with("https://") {
        format!("https://{}", input)
    } else {
        input.to_string()
    };

    let url = Url::parse(&with_scheme).map_err(|e| {
        tracing::warn!("Failed to parse URL '{}' (original: {}): {}", with_scheme, input, e);
        AppError::UrlParse(e)
    })?;

    let host = url.host_str().ok_or_else(|| {
        AppError::DomainExtraction(format!("Could not extract host from: {}", with_scheme))
    })?;

    let domain = host.strip_prefix("www.").unwrap_or(host).to_lowercase();

    tracing::debug!("Extracted domain '{}' from '{}'", domain, input);
    Ok(domain)
}

/// Checks the domain against the forbidden-domain denylist (major
/// platforms, government/education patterns). Forbidden domains must never
/// enter the candidate pipeline.
pub(crate) fn is_forbidden(domain: &str, denylist: &[String]) -> bool {
    let domain = domain.to_lowercase();
    denylist.iter().any(|entry| domain.contains(entry.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denylist() -> Vec<String> {
        crate::config::Config::default().forbidden_domains
    }

    #[test]
    fn test_registrable_domain_simple() {
        assert_eq!(
            registrable_domain("https://www.example.com").unwrap(),
            "example.com"
        );
        assert_eq!(
            registrable_domain("http://example.com").unwrap(),
            "example.com"
        );
        assert_eq!(registrable_domain("example.com").unwrap(), "example.com");
    }

    #[test]
    fn test_registrable_domain_edge_cases() {
        assert_eq!(
            registrable_domain("www.example.com").unwrap(),
            "example.com"
        );
        assert_eq!(
            registrable_domain("https://EXAMPLE.com/path?query=1").unwrap(),
            "example.com"
        );
        assert_eq!(
            registrable_domain("http://example.com:8080").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn test_registrable_domain_invalid() {
        assert!(registrable_domain("").is_err());
        assert!(registrable_domain("http://").is_err());
    }

    #[test]
    fn test_forbidden_platforms() {
        let deny = denylist();
        assert!(is_forbidden("linkedin.com", &deny));
        assert!(is_forbidden("de.linkedin.com", &deny));
        assert!(is_forbidden("facebook.com", &deny));
        assert!(is_forbidden("YOUTUBE.com", &deny));
    }

    #[test]
    fn test_forbidden_tld_patterns() {
        let deny = denylist();
        assert!(is_forbidden("state.gov", &deny));
        assert!(is_forbidden("gov.uk", &deny));
        assert!(is_forbidden("mit.edu", &deny));
    }

    #[test]
    fn test_allowed_domains() {
        let deny = denylist();
        assert!(!is_forbidden("example.com", &deny));
        assert!(!is_forbidden("governance-consulting.com", &deny));
    }
}
