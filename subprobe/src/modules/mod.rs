use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Client;

use crate::{normalize::Domain, Error};

pub mod subdomains;

use subdomains::{AnubisDb, CrtSh, HackerTarget, RapidDns, WebArchive};

pub trait Module {
    fn name(&self) -> String;
    fn description(&self) -> String;
}

/// One source of subdomain intelligence.
///
/// An `Err` is the failure marker for the whole query: an adapter either
/// returns every normalized finding or nothing at all.
#[async_trait]
pub trait SubdomainModule: Module + Send + Sync {
    async fn enumerate(&self, domain: &Domain) -> Result<BTreeSet<String>, Error>;
}

/// The fixed set of providers queried for every domain.
#[derive(Debug, Clone)]
pub enum Provider {
    AnubisDb(AnubisDb),
    HackerTarget(HackerTarget),
    RapidDns(RapidDns),
    CrtSh(CrtSh),
    WebArchive(WebArchive),
}

pub fn all_providers(http_client: &Client) -> Vec<Provider> {
    vec![
        Provider::AnubisDb(AnubisDb::new(http_client.clone())),
        Provider::HackerTarget(HackerTarget::new(http_client.clone())),
        Provider::RapidDns(RapidDns::new(http_client.clone())),
        Provider::CrtSh(CrtSh::new(http_client.clone())),
        Provider::WebArchive(WebArchive::new(http_client.clone())),
    ]
}

impl Module for Provider {
    fn name(&self) -> String {
        match self {
            Provider::AnubisDb(module) => module.name(),
            Provider::HackerTarget(module) => module.name(),
            Provider::RapidDns(module) => module.name(),
            Provider::CrtSh(module) => module.name(),
            Provider::WebArchive(module) => module.name(),
        }
    }

    fn description(&self) -> String {
        match self {
            Provider::AnubisDb(module) => module.description(),
            Provider::HackerTarget(module) => module.description(),
            Provider::RapidDns(module) => module.description(),
            Provider::CrtSh(module) => module.description(),
            Provider::WebArchive(module) => module.description(),
        }
    }
}

#[async_trait]
impl SubdomainModule for Provider {
    async fn enumerate(&self, domain: &Domain) -> Result<BTreeSet<String>, Error> {
        match self {
            Provider::AnubisDb(module) => module.enumerate(domain).await,
            Provider::HackerTarget(module) => module.enumerate(domain).await,
            Provider::RapidDns(module) => module.enumerate(domain).await,
            Provider::CrtSh(module) => module.enumerate(domain).await,
            Provider::WebArchive(module) => module.enumerate(domain).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_are_unique() {
        let providers = all_providers(&Client::new());
        let names: BTreeSet<String> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(providers.len(), 5);
        assert_eq!(names.len(), providers.len());
        assert!(names.iter().all(|name| name.starts_with("subdomains/")));
    }
}
