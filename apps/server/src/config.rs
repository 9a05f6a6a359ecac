use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use policyhub_messaging::TransportKind;

/// A service this process hosts. Each role mounts its routes and, for the
/// downstream projections, registers its event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceRole {
    Products,
    Pricing,
    Policies,
    Payments,
    Dashboard,
    Search,
    Chat,
}

impl ServiceRole {
    pub const ALL: [ServiceRole; 7] = [
        ServiceRole::Products,
        ServiceRole::Pricing,
        ServiceRole::Policies,
        ServiceRole::Payments,
        ServiceRole::Dashboard,
        ServiceRole::Search,
        ServiceRole::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRole::Products => "products",
            ServiceRole::Pricing => "pricing",
            ServiceRole::Policies => "policies",
            ServiceRole::Payments => "payments",
            ServiceRole::Dashboard => "dashboard",
            ServiceRole::Search => "search",
            ServiceRole::Chat => "chat",
        }
    }
}

impl FromStr for ServiceRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown service role '{}'", s.trim()))
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
    /// Name stamped as `source` on published envelopes.
    pub service_name: String,
    pub roles: BTreeSet<ServiceRole>,
    pub transport: TransportKind,
    pub udp_bind: SocketAddr,
    pub udp_peers: Vec<SocketAddr>,
    pub queue_root: PathBuf,
    pub queue_name: String,
    pub queue_destinations: Vec<String>,
    pub queue_max_retries: u32,
    pub queue_poll_interval: Duration,
    /// Base URL of a remote pricing service. Required when the policies role
    /// runs without the pricing role.
    pub pricing_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl: Duration,
    pub demo_password: String,
    pub publish_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            log_format: LogFormat::Text,
            service_name: "policyhub".to_string(),
            roles: ServiceRole::ALL.into_iter().collect(),
            transport: TransportKind::Memory,
            udp_bind: SocketAddr::from(([127, 0, 0, 1], 7400)),
            udp_peers: Vec::new(),
            queue_root: PathBuf::from(".queues"),
            queue_name: "policyhub".to_string(),
            queue_destinations: vec!["policyhub".to_string()],
            queue_max_retries: 5,
            queue_poll_interval: Duration::from_millis(250),
            pricing_url: None,
            jwt_secret: None,
            token_ttl: Duration::from_secs(60 * 60),
            demo_password: "secret".to_string(),
            publish_retries: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let listen_addr = match env("PH_LISTEN_ADDR") {
            Some(raw) => raw.parse().context("Invalid PH_LISTEN_ADDR")?,
            None => defaults.listen_addr,
        };
        let cors_allow = env("PH_CORS_ALLOW_ORIGINS")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.cors_allow);
        let timeout_ms: u64 = env("PH_REQUEST_TIMEOUT_MS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(30_000);
        let log_format = match env("PH_LOG_FORMAT").as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let service_name = env("PH_SERVICE_NAME").unwrap_or(defaults.service_name);
        let roles = match env("PH_SERVICES") {
            Some(raw) => parse_roles(&raw)?,
            None => defaults.roles,
        };
        let transport = match env("PH_TRANSPORT") {
            Some(raw) => raw.parse().context("Invalid PH_TRANSPORT")?,
            None => defaults.transport,
        };

        let udp_bind = match env("PH_UDP_BIND") {
            Some(raw) => raw.parse().context("Invalid PH_UDP_BIND")?,
            None => defaults.udp_bind,
        };
        let udp_peers = env("PH_UDP_PEERS")
            .map(|raw| {
                split_list(&raw)
                    .iter()
                    .map(|peer| {
                        peer.parse::<SocketAddr>()
                            .with_context(|| format!("Invalid PH_UDP_PEERS entry '{}'", peer))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let queue_root = env("PH_QUEUE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.queue_root);
        let queue_name = env("PH_QUEUE_NAME").unwrap_or_else(|| service_name.clone());
        let queue_destinations = env("PH_QUEUE_DESTINATIONS")
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|| vec![queue_name.clone()]);
        let queue_max_retries = env("PH_QUEUE_MAX_RETRIES")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.queue_max_retries);
        let queue_poll_interval = env("PH_QUEUE_POLL_MS")
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.queue_poll_interval);

        let token_ttl = env("PH_TOKEN_TTL_SECS")
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.token_ttl);
        let publish_retries = env("PH_PUBLISH_RETRIES")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.publish_retries);

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            log_format,
            service_name,
            roles,
            transport,
            udp_bind,
            udp_peers,
            queue_root,
            queue_name,
            queue_destinations,
            queue_max_retries,
            queue_poll_interval,
            pricing_url: env("PH_PRICING_URL"),
            jwt_secret: env("PH_JWT_SECRET"),
            token_ttl,
            demo_password: env("PH_DEMO_PASSWORD").unwrap_or(defaults.demo_password),
            publish_retries,
        })
    }

    pub fn hosts(&self, role: ServiceRole) -> bool {
        self.roles.contains(&role)
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn parse_roles(raw: &str) -> anyhow::Result<BTreeSet<ServiceRole>> {
    let entries = split_list(raw);
    if entries.iter().any(|e| e.eq_ignore_ascii_case("all")) {
        return Ok(ServiceRole::ALL.into_iter().collect());
    }
    let roles = entries
        .iter()
        .map(|e| e.parse())
        .collect::<anyhow::Result<BTreeSet<_>>>()?;
    if roles.is_empty() {
        anyhow::bail!("PH_SERVICES must name at least one service");
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_lists_and_all() {
        let roles = parse_roles("policies, Pricing").unwrap();
        assert_eq!(
            roles.into_iter().collect::<Vec<_>>(),
            vec![ServiceRole::Pricing, ServiceRole::Policies]
        );
        assert_eq!(parse_roles("all").unwrap().len(), ServiceRole::ALL.len());
        assert!(parse_roles("billing").is_err());
        assert!(parse_roles(" , ").is_err());
    }

    #[test]
    fn default_config_hosts_everything_in_memory() {
        let config = Config::default();
        assert!(ServiceRole::ALL.iter().all(|r| config.hosts(*r)));
        assert_eq!(config.transport, TransportKind::Memory);
        assert!(config.pricing_url.is_none());
    }
}
