//! Per-record driver: validates input, gates forbidden domains, merges
//! suggestions and maps the final verdict onto the output record.

use crate::config::Config;
use crate::dns::MxResolver;
use crate::domain::{is_forbidden, registrable_domain};
use crate::models::{Contact, ContactOutcome};
use crate::name::PersonName;
use crate::smtp::MailboxProbe;
use crate::suggest::CandidateSuggester;
use crate::verifier::EmailVerifier;

/// Processes a single contact record end to end.
///
/// Never fails: malformed input produces a skipped record with a reason,
/// and every record that reaches the verifier terminates in a verdict.
pub(crate) async fn process_record<R, P, S>(
    config: &Config,
    verifier: &EmailVerifier<'_, R, P>,
    suggester: &S,
    record: Contact,
) -> ContactOutcome
where
    R: MxResolver,
    P: MailboxProbe,
    S: CandidateSuggester,
{
    let full_name = record
        .full_name
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    let domain_input = record.domain.as_deref().unwrap_or("").trim().to_string();

    let record_id = if full_name.is_empty() {
        domain_input.clone()
    } else {
        full_name.clone()
    };
    tracing::info!(target: "process_record_task", "[{}] Starting processing.", record_id);

    let mut missing_parts = Vec::new();
    if full_name.is_empty() {
        missing_parts.push("name");
    }
    if domain_input.is_empty() {
        missing_parts.push("domain");
    }
    if !missing_parts.is_empty() {
        let reason = format!("Missing {}", missing_parts.join(", "));
        tracing::warn!(target: "process_record_task", "[{}] Skipping record. Reason: {}", record_id, reason);
        return ContactOutcome::skipped(record, reason);
    }

    let domain = match registrable_domain(&domain_input) {
        Ok(domain) => domain,
        Err(e) => {
            let reason = format!("Cannot extract domain from '{}': {}", domain_input, e);
            tracing::warn!(target: "process_record_task", "[{}] Skipping record. Reason: {}", record_id, reason);
            return ContactOutcome::skipped(record, reason);
        }
    };

    if is_forbidden(&domain, &config.forbidden_domains) {
        let reason = format!("Domain '{}' is on the forbidden-domain denylist", domain);
        tracing::warn!(target: "process_record_task", "[{}] Skipping record. Reason: {}", record_id, reason);
        return ContactOutcome::skipped(record, reason);
    }

    let Some(name) = PersonName::parse(&full_name) else {
        let reason = format!("Unparseable name '{}'", full_name);
        tracing::warn!(target: "process_record_task", "[{}] Skipping record. Reason: {}", record_id, reason);
        return ContactOutcome::skipped(record, reason);
    };

    // Suggestion failures degrade to an empty set; verification proceeds on
    // template-derived candidates alone.
    let mut extras: Vec<String> = match suggester.suggest(&name, &domain).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            tracing::warn!(
                target: "process_record_task",
                "[{}] Suggestion service failed ({}); proceeding without suggestions",
                record_id,
                e
            );
            Vec::new()
        }
    };
    extras.extend(record.extra_candidates.iter().cloned());
    let extras: Vec<String> = extras
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let verdict = verifier.resolve_email(&name, &domain, &extras).await;

    tracing::info!(
        target: "process_record_task",
        "[{}] Finished processing. Verdict: {}",
        record_id,
        verdict.as_status()
    );

    ContactOutcome::from_verdict(record, verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::ProbeOutcome;
    use crate::suggest::NoSuggestions;
    use std::collections::HashMap;

    struct DeadResolver;

    impl MxResolver for DeadResolver {
        async fn resolve_mx(&self, domain: &str) -> Result<Vec<String>> {
            Err(AppError::NxDomain(domain.to_string()))
        }
    }

    struct PanicProbe;

    impl MailboxProbe for PanicProbe {
        async fn probe(&self, candidate: &str, _mx_host: &str) -> ProbeOutcome {
            panic!("probe must not be reached, got {}", candidate);
        }
    }

    struct FailingSuggester;

    impl CandidateSuggester for FailingSuggester {
        async fn suggest(&self, _name: &PersonName, _domain: &str) -> Result<Vec<String>> {
            Err(AppError::Suggestion("service unreachable".to_string()))
        }
    }

    fn contact(full_name: Option<&str>, domain: Option<&str>) -> Contact {
        Contact {
            full_name: full_name.map(|s| s.to_string()),
            domain: domain.map(|s| s.to_string()),
            extra_candidates: Vec::new(),
            other_fields: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_skip_record() {
        let config = Config::default();
        let verifier = EmailVerifier::new(&config, DeadResolver, PanicProbe);

        let outcome = process_record(
            &config,
            &verifier,
            &NoSuggestions,
            contact(None, Some("example.com")),
        )
        .await;
        assert!(outcome.skipped);
        assert_eq!(outcome.skip_reason.as_deref(), Some("Missing name"));

        let outcome =
            process_record(&config, &verifier, &NoSuggestions, contact(None, None)).await;
        assert_eq!(outcome.skip_reason.as_deref(), Some("Missing name, domain"));
    }

    #[tokio::test]
    async fn test_forbidden_domain_skips_record() {
        let config = Config::default();
        let verifier = EmailVerifier::new(&config, DeadResolver, PanicProbe);

        let outcome = process_record(
            &config,
            &verifier,
            &NoSuggestions,
            contact(Some("Jane Doe"), Some("de.linkedin.com")),
        )
        .await;
        assert!(outcome.skipped);
        assert!(outcome.skip_reason.unwrap().contains("forbidden"));
    }

    #[tokio::test]
    async fn test_dead_domain_sets_delete_directive() {
        let config = Config {
            probe_pause: (0.0, 0.0),
            ..Config::default()
        };
        let verifier = EmailVerifier::new(&config, DeadResolver, PanicProbe);

        let outcome = process_record(
            &config,
            &verifier,
            &NoSuggestions,
            contact(Some("Jane Doe"), Some("example.com")),
        )
        .await;
        assert_eq!(outcome.status, "domain_dead");
        assert!(outcome.delete_record);
        assert!(outcome.email.is_none());
    }

    #[tokio::test]
    async fn test_suggester_failure_is_recovered() {
        let config = Config {
            probe_pause: (0.0, 0.0),
            ..Config::default()
        };
        let verifier = EmailVerifier::new(&config, DeadResolver, PanicProbe);

        // The failing suggester is logged and ignored; verification still
        // runs and reaches the (dead) resolver.
        let outcome = process_record(
            &config,
            &verifier,
            &FailingSuggester,
            contact(Some("Jane Doe"), Some("example.com")),
        )
        .await;
        assert_eq!(outcome.status, "domain_dead");
    }
}
