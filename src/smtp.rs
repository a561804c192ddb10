//! Mailbox probing via an SMTP RCPT handshake.

use crate::config::Config;
use crate::models::ProbeOutcome;
use lettre::Address;
use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::commands::{Ehlo, Mail, Rcpt};
use lettre::transport::smtp::extension::ClientId;
use std::net::ToSocketAddrs;
use std::str::FromStr;
use std::time::Duration;

const FALLBACK_SENDER: &str = "probe@mail-check.example.com";

/// Strategy for picking the sender identity used in the MAIL FROM command.
///
/// Rotation exists to reduce the chance any single probing identity gets
/// block-listed by a receiving server. Injected so tests can supply a
/// deterministic stub.
pub(crate) trait SenderRotation: Send + Sync {
    fn pick(&self) -> String;
}

/// Picks uniformly at random from a fixed pool of plausible sender addresses.
#[derive(Debug, Clone)]
pub(crate) struct RandomSenderPool {
    senders: Vec<String>,
}

impl RandomSenderPool {
    pub(crate) fn new(senders: Vec<String>) -> Self {
        Self { senders }
    }
}

impl SenderRotation for RandomSenderPool {
    fn pick(&self) -> String {
        use rand::seq::SliceRandom;
        self.senders
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_SENDER.to_string())
    }
}

/// Asks a mail exchanger whether it would accept mail for one candidate
/// address, without sending a message body.
pub(crate) trait MailboxProbe {
    async fn probe(&self, candidate: &str, mx_host: &str) -> ProbeOutcome;
}

/// The production probe: a short SMTP session against port 25.
pub(crate) struct SmtpProbe<S: SenderRotation> {
    timeout: Duration,
    senders: S,
}

impl<S: SenderRotation> SmtpProbe<S> {
    pub(crate) fn new(config: &Config, senders: S) -> Self {
        Self {
            timeout: config.smtp_timeout,
            senders,
        }
    }
}

impl<S: SenderRotation> MailboxProbe for SmtpProbe<S> {
    async fn probe(&self, candidate: &str, mx_host: &str) -> ProbeOutcome {
        tracing::debug!(target: "smtp_task", "Probing {} via {}", candidate, mx_host);

        let recipient = match Address::from_str(candidate) {
            Ok(addr) => addr,
            Err(e) => {
                tracing::warn!(target: "smtp_task", "Unprobeable recipient '{}': {}", candidate, e);
                return ProbeOutcome::Rejected;
            }
        };

        let sender_raw = self.senders.pick();
        let sender = match Address::from_str(&sender_raw) {
            Ok(addr) => addr,
            Err(e) => {
                tracing::error!(target: "smtp_task", "Invalid sender '{}' in pool: {}", sender_raw, e);
                return ProbeOutcome::TransportError;
            }
        };
        let sender_domain = sender_raw
            .rsplit_once('@')
            .map(|(_, d)| d.to_string())
            .unwrap_or_else(|| "localhost".to_string());

        let socket_addr = match (mx_host, 25_u16)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
        {
            Some(addr) => addr,
            None => {
                tracing::warn!(target: "smtp_task", "Could not resolve mail server address: {}", mx_host);
                return ProbeOutcome::TransportError;
            }
        };

        let helo_name = ClientId::Domain(sender_domain);

        let mut conn = match SmtpConnection::connect(
            socket_addr,
            Some(self.timeout),
            &helo_name,
            None,
            None,
        ) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(target: "smtp_task", "SMTP connection to {} failed: {}", mx_host, e);
                return ProbeOutcome::TransportError;
            }
        };

        if let Err(e) = conn.command(Ehlo::new(helo_name.clone())) {
            tracing::warn!(target: "smtp_task", "EHLO failed on {}: {}", mx_host, e);
            return ProbeOutcome::TransportError;
        }

        match conn.command(Mail::new(Some(sender), vec![])) {
            Ok(response) if response.is_positive() => {}
            Ok(response) => {
                tracing::warn!(
                    target: "smtp_task",
                    "Sender '{}' rejected by {}: {}",
                    sender_raw,
                    mx_host,
                    response.code()
                );
                conn.quit().ok();
                return ProbeOutcome::TransportError;
            }
            Err(e) => {
                tracing::warn!(target: "smtp_task", "MAIL FROM failed on {}: {}", mx_host, e);
                return ProbeOutcome::TransportError;
            }
        }

        let outcome = match conn.command(Rcpt::new(recipient, vec![])) {
            Ok(response) => {
                let code = response.code();
                tracing::info!(
                    target: "smtp_task",
                    "RCPT TO:<{}> on {}: {}",
                    candidate,
                    mx_host,
                    code
                );
                if u16::from(code) == 250 {
                    ProbeOutcome::Accepted
                } else {
                    ProbeOutcome::Rejected
                }
            }
            // A negative reply still means the server answered; only a
            // transport-level failure is inconclusive.
            Err(e) if e.is_permanent() || e.is_transient() => {
                tracing::info!(
                    target: "smtp_task",
                    "RCPT TO:<{}> rejected by {}: {}",
                    candidate,
                    mx_host,
                    e
                );
                ProbeOutcome::Rejected
            }
            Err(e) => {
                tracing::warn!(target: "smtp_task", "RCPT TO failed on {}: {}", mx_host, e);
                return ProbeOutcome::TransportError;
            }
        };

        conn.quit().ok();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSender(&'static str);

    impl SenderRotation for FixedSender {
        fn pick(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_random_pool_picks_from_pool() {
        let pool = RandomSenderPool::new(vec![
            "a@one.example".to_string(),
            "b@two.example".to_string(),
        ]);
        for _ in 0..20 {
            let picked = pool.pick();
            assert!(picked == "a@one.example" || picked == "b@two.example");
        }
    }

    #[test]
    fn test_empty_pool_falls_back() {
        let pool = RandomSenderPool::new(Vec::new());
        assert_eq!(pool.pick(), FALLBACK_SENDER);
    }

    #[test]
    fn test_fixed_stub_is_deterministic() {
        let stub = FixedSender("probe@fixed.example");
        assert_eq!(stub.pick(), stub.pick());
    }
}
