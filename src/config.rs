//! Defines the configuration settings for the lead-sleuth application.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then CLI/env overrides, then a validation pass. The resulting `Config` is
//! constructed once at process start and passed by reference into each
//! component; there is no global configuration state.

use anyhow::Context;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration overrides shared by all subcommands.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (TOML format)
    #[arg(long, env = "LEAD_SLEUTH_CONFIG")]
    pub config_file: Option<String>,

    /// SMTP connection timeout in seconds
    #[arg(long, env = "LEAD_SLEUTH_SMTP_TIMEOUT")]
    pub smtp_timeout: Option<u64>,

    /// DNS resolution timeout in seconds
    #[arg(long, env = "LEAD_SLEUTH_DNS_TIMEOUT")]
    pub dns_timeout: Option<u64>,

    /// Comma-separated list of DNS servers
    #[arg(long, env = "LEAD_SLEUTH_DNS_SERVERS")]
    pub dns_servers: Option<String>,

    /// Minimum pause between mailbox probes (seconds)
    #[arg(long, env = "LEAD_SLEUTH_MIN_PAUSE")]
    pub min_pause: Option<f32>,

    /// Maximum pause between mailbox probes (seconds)
    #[arg(long, env = "LEAD_SLEUTH_MAX_PAUSE")]
    pub max_pause: Option<f32>,

    /// Local parts at or below this length are never probed
    #[arg(long, env = "LEAD_SLEUTH_MIN_LOCAL_PART")]
    pub min_local_part_len: Option<usize>,
}

/// TOML Configuration file structure
#[derive(Deserialize, Debug, Default)]
struct ConfigFile {
    dns: Option<DnsSection>,
    smtp: Option<SmtpSection>,
    verification: Option<VerificationSection>,
    filtering: Option<FilteringSection>,
}

#[derive(Deserialize, Debug, Default)]
struct DnsSection {
    timeout_secs: Option<u64>,
    servers: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct SmtpSection {
    timeout_secs: Option<u64>,
    sender_pool: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct VerificationSection {
    min_pause: Option<f32>,
    max_pause: Option<f32>,
    min_local_part_len: Option<usize>,
    role_local_parts: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct FilteringSection {
    forbidden_domains: Option<Vec<String>>,
}

/// Application configuration settings.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// DNS servers to use for MX resolution.
    pub dns_servers: Vec<String>,
    /// Timeout for DNS resolution queries.
    pub dns_timeout: Duration,
    /// Timeout for establishing SMTP connections and individual commands.
    pub smtp_timeout: Duration,
    /// Minimum and maximum courtesy pause between mailbox probes (seconds).
    pub probe_pause: (f32, f32),
    /// Local parts at or below this length are skipped without a probe.
    pub min_local_part_len: usize,
    /// Pool of sender identities rotated through during probing.
    pub sender_pool: Vec<String>,
    /// Role-based local parts tried as the company-email fallback.
    pub role_local_parts: Vec<String>,
    /// Denylist of domains that must never enter the candidate pipeline.
    pub forbidden_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let sender_pool = [
            "m.keller@nordwind-logistik.de",
            "j.brandt@ostsee-metall.de",
            "l.fischer@rheintal-pack.com",
            "s.novak@adriatic-freight.com",
            "p.lindqvist@baltic-crane.se",
            "a.moreau@loire-equip.fr",
            "d.okafor@crestline-works.co.uk",
            "t.virtanen@lakeshore-mill.fi",
            "r.santos@iberia-fasteners.com",
            "k.horvath@pannonia-tools.hu",
        ];

        let role_local_parts = [
            "info",
            "support",
            "contact",
            "contacts",
            "business",
            "purchase",
            "help",
            "hello",
            "sales",
        ];

        let forbidden_domains = [
            ".gov",
            "gov.",
            ".edu",
            "linkedin",
            "facebook",
            "microsoft",
            "wikipedia",
            "tiktok",
            "reddit",
            "google",
            "youtube",
        ];

        Config {
            dns_servers: vec![
                "8.8.8.8".to_string(),
                "8.8.4.4".to_string(),
                "1.1.1.1".to_string(),
                "1.0.0.1".to_string(),
            ],
            dns_timeout: Duration::from_secs(5),
            smtp_timeout: Duration::from_secs(10),
            probe_pause: (0.5, 1.5),
            min_local_part_len: 3,
            sender_pool: sender_pool.iter().map(|s| s.to_string()).collect(),
            role_local_parts: role_local_parts.iter().map(|s| s.to_string()).collect(),
            forbidden_domains: forbidden_domains.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Jittered courtesy pause between mailbox probes.
    pub(crate) fn random_probe_pause(&self) -> Duration {
        let (min, max) = self.probe_pause;
        if min >= max {
            return Duration::from_secs_f32(min.max(0.0));
        }
        let duration_secs = rand::thread_rng().gen_range(min..max);
        Duration::from_secs_f32(duration_secs)
    }
}

/// Load configuration from a TOML file
fn load_config_file(file_path: &str) -> anyhow::Result<ConfigFile> {
    let path = Path::new(file_path);
    if !path.exists() {
        tracing::warn!("Configuration file {} not found, using defaults", file_path);
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", file_path))?;

    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML configuration from {}", file_path))?;

    tracing::info!("Loaded configuration from {}", file_path);
    Ok(config)
}

fn apply_file_config(config: &mut Config, file_config: &ConfigFile) {
    if let Some(dns) = &file_config.dns {
        if let Some(timeout) = dns.timeout_secs {
            config.dns_timeout = Duration::from_secs(timeout);
        }
        if let Some(servers) = &dns.servers {
            config.dns_servers = servers.clone();
        }
    }

    if let Some(smtp) = &file_config.smtp {
        if let Some(timeout) = smtp.timeout_secs {
            config.smtp_timeout = Duration::from_secs(timeout);
        }
        if let Some(pool) = &smtp.sender_pool {
            config.sender_pool = pool.clone();
        }
    }

    if let Some(verification) = &file_config.verification {
        if let Some(min_pause) = verification.min_pause {
            config.probe_pause.0 = min_pause;
        }
        if let Some(max_pause) = verification.max_pause {
            config.probe_pause.1 = max_pause;
        }
        if let Some(min_len) = verification.min_local_part_len {
            config.min_local_part_len = min_len;
        }
        if let Some(roles) = &verification.role_local_parts {
            config.role_local_parts = roles.clone();
        }
    }

    if let Some(filtering) = &file_config.filtering {
        if let Some(domains) = &filtering.forbidden_domains {
            config.forbidden_domains = domains.clone();
        }
    }
}

/// Apply command line arguments to the Config instance
fn apply_cli_args(config: &mut Config, args: &ConfigArgs) {
    if let Some(timeout) = args.smtp_timeout {
        config.smtp_timeout = Duration::from_secs(timeout);
    }

    if let Some(timeout) = args.dns_timeout {
        config.dns_timeout = Duration::from_secs(timeout);
    }

    if let Some(ref servers) = args.dns_servers {
        config.dns_servers = servers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    if let Some(min_pause) = args.min_pause {
        config.probe_pause.0 = min_pause;
    }

    if let Some(max_pause) = args.max_pause {
        config.probe_pause.1 = max_pause;
    }

    if let Some(min_len) = args.min_local_part_len {
        config.min_local_part_len = min_len;
    }
}

fn validate_config(config: &mut Config) {
    if config.probe_pause.0 < 0.0 {
        config.probe_pause.0 = 0.0;
        tracing::warn!("Minimum probe pause was negative. Setting to 0.");
    }

    if config.probe_pause.0 > config.probe_pause.1 {
        config.probe_pause.1 = config.probe_pause.0;
        tracing::warn!(
            "Min probe pause was greater than max. Setting both to {}",
            config.probe_pause.0
        );
    }

    if config.dns_servers.is_empty() {
        config.dns_servers = vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()];
        tracing::warn!("DNS servers list was empty. Setting to default public DNS servers.");
    }

    if config.sender_pool.is_empty() {
        config.sender_pool = Config::default().sender_pool;
        tracing::warn!("Sender pool was empty. Restoring the default pool.");
    }

    if config.role_local_parts.is_empty() {
        config.role_local_parts = Config::default().role_local_parts;
        tracing::warn!("Role local-part list was empty. Restoring the default list.");
    }
}

pub(crate) fn build_config(args: &ConfigArgs) -> anyhow::Result<Config> {
    let mut config = Config::default();

    if let Some(ref file_path) = args.config_file {
        let file_config = load_config_file(file_path)?;
        apply_file_config(&mut config, &file_config);
    } else {
        for path in ["./lead-sleuth.toml", "./config.toml"].iter() {
            if Path::new(path).exists() {
                match load_config_file(path) {
                    Ok(file_config) => {
                        apply_file_config(&mut config, &file_config);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load configuration from {}: {}", path, e);
                    }
                }
            }
        }
    }

    apply_cli_args(&mut config, args);

    validate_config(&mut config);

    tracing::debug!("Final configuration: {:?}", config);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_clamps_reversed_pause() {
        let mut config = Config {
            probe_pause: (2.0, 0.5),
            ..Config::default()
        };
        validate_config(&mut config);
        assert_eq!(config.probe_pause, (2.0, 2.0));
    }

    #[test]
    fn test_validate_restores_empty_lists() {
        let mut config = Config {
            dns_servers: Vec::new(),
            sender_pool: Vec::new(),
            role_local_parts: Vec::new(),
            ..Config::default()
        };
        validate_config(&mut config);
        assert!(!config.dns_servers.is_empty());
        assert!(!config.sender_pool.is_empty());
        assert!(!config.role_local_parts.is_empty());
    }

    #[test]
    fn test_zero_pause_is_zero_duration() {
        let config = Config {
            probe_pause: (0.0, 0.0),
            ..Config::default()
        };
        assert!(config.random_probe_pause().is_zero());
    }

    #[test]
    fn test_cli_overrides() {
        let args = ConfigArgs {
            dns_servers: Some("9.9.9.9, 149.112.112.112".to_string()),
            smtp_timeout: Some(3),
            min_local_part_len: Some(4),
            ..ConfigArgs::default()
        };
        let mut config = Config::default();
        apply_cli_args(&mut config, &args);
        assert_eq!(config.dns_servers, vec!["9.9.9.9", "149.112.112.112"]);
        assert_eq!(config.smtp_timeout, Duration::from_secs(3));
        assert_eq!(config.min_local_part_len, 4);
    }
}
