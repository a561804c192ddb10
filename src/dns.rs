//! MX resolution for candidate domains.

use crate::config::Config;
use crate::error::{AppError, Result};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};

/// Resolves the mail exchangers for a domain.
///
/// Any failure here is the domain-dead signal: the aggregator aborts the
/// whole candidate batch on the first resolution error.
pub(crate) trait MxResolver {
    /// Returns the exchange hostnames for `domain`, ordered by preference.
    async fn resolve_mx(&self, domain: &str) -> Result<Vec<String>>;
}

/// Creates a configured DNS resolver instance.
pub(crate) fn create_resolver(config: &Config) -> Result<TokioAsyncResolver> {
    let mut resolver_config = ResolverConfig::new();

    for server_str in &config.dns_servers {
        match IpAddr::from_str(server_str) {
            Ok(ip_addr) => {
                // Default DNS port is 53
                let socket_addr = SocketAddr::new(ip_addr, 53);
                resolver_config.add_name_server(trust_dns_resolver::config::NameServerConfig {
                    socket_addr,
                    protocol: trust_dns_resolver::config::Protocol::Udp, // Start with UDP
                    tls_dns_name: None,
                    trust_negative_responses: true,
                    bind_addr: None,
                });
                resolver_config.add_name_server(trust_dns_resolver::config::NameServerConfig {
                    socket_addr,
                    protocol: trust_dns_resolver::config::Protocol::Tcp, // Also allow TCP fallback
                    tls_dns_name: None,
                    trust_negative_responses: true,
                    bind_addr: None,
                });
            }
            Err(e) => {
                tracing::error!(
                    "Invalid DNS server IP address in config: '{}' - {}",
                    server_str,
                    e
                );
                return Err(AppError::Config(format!(
                    "Invalid DNS server IP address: {}",
                    server_str
                )));
            }
        }
    }

    let mut resolver_opts = ResolverOpts::default();
    resolver_opts.timeout = config.dns_timeout;
    resolver_opts.attempts = 2;
    resolver_opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

    let resolver = TokioAsyncResolver::tokio(resolver_config, resolver_opts);
    tracing::debug!("DNS resolver configured with public servers and timeout.");
    Ok(resolver)
}

/// The production resolver backed by a real DNS lookup.
#[derive(Debug, Clone)]
pub(crate) struct DnsMxResolver {
    resolver: TokioAsyncResolver,
}

impl DnsMxResolver {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            resolver: create_resolver(config)?,
        })
    }
}

impl MxResolver for DnsMxResolver {
    async fn resolve_mx(&self, domain: &str) -> Result<Vec<String>> {
        tracing::debug!(target: "dns_task", "Performing DNS MX lookup for {}", domain);

        match self.resolver.mx_lookup(domain).await {
            Ok(mx_response) => {
                let mut mx_records: Vec<_> = mx_response.iter().collect();
                mx_records.sort_by_key(|r| r.preference());

                let exchanges: Vec<String> = mx_records
                    .iter()
                    .map(|r| r.exchange().to_utf8().trim_end_matches('.').to_string())
                    .filter(|exchange| !exchange.is_empty())
                    .collect();

                if exchanges.is_empty() {
                    tracing::warn!(
                        target: "dns_task",
                        "MX lookup for {} succeeded but yielded no usable records.",
                        domain
                    );
                    return Err(AppError::NoMxRecords(domain.to_string()));
                }

                tracing::info!(
                    target: "dns_task",
                    "Found {} MX record(s) for {}; best: {}",
                    exchanges.len(),
                    domain,
                    exchanges[0]
                );
                Ok(exchanges)
            }
            Err(e) => {
                let error_string = format!("{:?}", e.kind());

                if error_string.contains("NoRecordsFound") {
                    tracing::warn!(target: "dns_task", "No MX records found for {}", domain);
                    Err(AppError::NoMxRecords(domain.to_string()))
                } else if error_string.contains("NXDomain")
                    || error_string.contains("Name does not exist")
                {
                    tracing::warn!(target: "dns_task", "Domain {} does not exist (NXDOMAIN)", domain);
                    Err(AppError::NxDomain(domain.to_string()))
                } else if error_string.contains("Timeout") {
                    tracing::warn!(target: "dns_task", "DNS resolution timeout for {}", domain);
                    Err(AppError::DnsTimeout(domain.to_string()))
                } else {
                    tracing::error!(
                        target: "dns_task",
                        "Unexpected DNS resolution error for {}: {}",
                        domain,
                        e
                    );
                    Err(AppError::Dns(e))
                }
            }
        }
    }
}
