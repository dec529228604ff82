use std::net::IpAddr;

use async_trait::async_trait;
use tracing::debug;
use trust_dns_resolver::{
    config::{ResolverConfig, ResolverOpts},
    TokioAsyncResolver,
};

use crate::Error;

/// Best-effort name resolution for probe rows.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, host: &str) -> Option<IpAddr>;
}

pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    /// Uses the system configuration, falling back to the library defaults.
    pub fn new() -> Result<Self, Error> {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(err) => {
                debug!("dns: system configuration unavailable: {}", err);
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())?
            }
        };
        Ok(DnsResolver { resolver })
    }
}

#[async_trait]
impl Resolve for DnsResolver {
    async fn resolve(&self, host: &str) -> Option<IpAddr> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Some(ip);
        }

        let lookup = match self.resolver.lookup_ip(host).await {
            Ok(lookup) => lookup,
            Err(err) => {
                debug!("dns: {}: {}", host, err);
                return None;
            }
        };
        let ips: Vec<IpAddr> = lookup.iter().collect();

        ips.iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| ips.first())
            .copied()
    }
}

/// Resolver that never answers, for runs where DNS is unwanted.
pub struct NoResolver;

#[async_trait]
impl Resolve for NoResolver {
    async fn resolve(&self, host: &str) -> Option<IpAddr> {
        host.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn literal_addresses_resolve_to_themselves() {
        let resolver = NoResolver;
        assert_eq!(
            resolver.resolve("127.0.0.1").await,
            Some(IpAddr::from([127, 0, 0, 1]))
        );
        assert_eq!(resolver.resolve("example.com").await, None);
    }
}
