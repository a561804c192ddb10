//! Core logic: drives candidates through syntax, DNS and mailbox probing
//! and converges on a single verdict.

use crate::config::Config;
use crate::dns::MxResolver;
use crate::models::{ProbeOutcome, Verdict};
use crate::name::PersonName;
use crate::patterns::{company_candidates, generate, merge_candidates};
use crate::smtp::MailboxProbe;
use crate::syntax::is_well_formed;
use std::collections::HashMap;
use tokio::time::sleep;

/// Orchestrates generator, syntax filter, domain check and mailbox probe
/// over a whole candidate list. Generic over the resolver and probe so
/// tests can inject deterministic stubs.
pub(crate) struct EmailVerifier<'a, R, P> {
    config: &'a Config,
    resolver: R,
    probe: P,
}

impl<'a, R: MxResolver, P: MailboxProbe> EmailVerifier<'a, R, P> {
    pub(crate) fn new(config: &'a Config, resolver: R, probe: P) -> Self {
        Self {
            config,
            resolver,
            probe,
        }
    }

    /// Full pipeline for one person: personal candidates first, then the
    /// role-based company fallback when every personal candidate was
    /// rejected. The fallback is never tried after a dead domain.
    pub(crate) async fn resolve_email(
        &self,
        name: &PersonName,
        domain: &str,
        extras: &[String],
    ) -> Verdict {
        match self.verify(name, domain, extras).await {
            Verdict::Invalid => {
                tracing::info!(
                    target: "verify_task",
                    "No personal mailbox validated for {}; trying company addresses",
                    domain
                );
                self.verify_company(domain).await
            }
            verdict => verdict,
        }
    }

    /// Verifies the template-generated candidates (plus `extras`) for one
    /// name+domain pair. First accepted mailbox wins; any MX resolution
    /// failure aborts the whole batch as `DomainDead`.
    pub(crate) async fn verify(
        &self,
        name: &PersonName,
        domain: &str,
        extras: &[String],
    ) -> Verdict {
        let mut candidates = generate(name, domain);
        merge_candidates(&mut candidates, extras);

        tracing::info!(
            target: "verify_task",
            "Assessing {} candidates for {} @ {}",
            candidates.len(),
            name.first,
            domain
        );

        self.run_candidates(&candidates, true).await
    }

    /// Tries the role-based company addresses (info@, sales@, ...) through
    /// the same syntax/DNS/probe loop.
    pub(crate) async fn verify_company(&self, domain: &str) -> Verdict {
        let candidates = company_candidates(&self.config.role_local_parts, domain);
        self.run_candidates(&candidates, false).await
    }

    async fn run_candidates(&self, candidates: &[String], gate_short_locals: bool) -> Verdict {
        // MX results are cached per domain within this run; resolving once
        // is enough for the whole batch.
        let mut mx_cache: HashMap<String, Vec<String>> = HashMap::new();

        for candidate in candidates {
            let local = candidate
                .split_once('@')
                .map(|(local, _)| local)
                .unwrap_or(candidate.as_str());

            if gate_short_locals && local.len() <= self.config.min_local_part_len {
                tracing::debug!(
                    target: "verify_task",
                    "Skipping {}: local part too short to be a personal mailbox",
                    candidate
                );
                continue;
            }

            if !is_well_formed(candidate) {
                tracing::debug!(target: "verify_task", "Skipping malformed candidate: {}", candidate);
                continue;
            }

            // Well-formed, so the rightmost '@' separates the parts.
            let Some((_, candidate_domain)) = candidate.rsplit_once('@') else {
                continue;
            };

            if !mx_cache.contains_key(candidate_domain) {
                match self.resolver.resolve_mx(candidate_domain).await {
                    Ok(exchanges) => {
                        mx_cache.insert(candidate_domain.to_string(), exchanges);
                    }
                    Err(e) => {
                        tracing::warn!(
                            target: "verify_task",
                            "MX resolution failed for {}: {}. Domain is dead; aborting batch.",
                            candidate_domain,
                            e
                        );
                        return Verdict::DomainDead;
                    }
                }
            }

            let Some(mx_host) = mx_cache
                .get(candidate_domain)
                .and_then(|exchanges| exchanges.first())
            else {
                tracing::warn!(
                    target: "verify_task",
                    "No usable mail exchanger for {}; treating domain as dead",
                    candidate_domain
                );
                return Verdict::DomainDead;
            };

            match self.probe.probe(candidate, mx_host).await {
                ProbeOutcome::Accepted => {
                    tracing::info!(target: "verify_task", "Confirmed mailbox: {}", candidate);
                    return Verdict::Valid(candidate.clone());
                }
                outcome @ (ProbeOutcome::Rejected | ProbeOutcome::TransportError) => {
                    tracing::debug!(
                        target: "verify_task",
                        "Candidate {} not accepted ({:?}); continuing",
                        candidate,
                        outcome
                    );
                    // Courtesy pacing so the probed server's anti-abuse
                    // defenses are not tripped.
                    let pause = self.config.random_probe_pause();
                    if !pause.is_zero() {
                        sleep(pause).await;
                    }
                }
            }
        }

        Verdict::Invalid
    }
}
