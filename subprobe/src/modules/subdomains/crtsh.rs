use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::endpoint;
use crate::{
    http::{get_with_retry, RetryPolicy},
    modules::{Module, SubdomainModule},
    normalize::{normalize, Domain},
    Error,
};

const BASE_URL: &str = "https://crt.sh";

#[derive(Debug, Clone)]
pub struct CrtSh {
    http_client: Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Clone, Deserialize)]
struct CrtShEntry {
    name_value: Option<String>,
}

impl CrtSh {
    pub fn new(http_client: Client) -> Self {
        CrtSh::with_base_url(http_client, BASE_URL)
    }

    pub fn with_base_url(http_client: Client, base_url: &str) -> Self {
        CrtSh {
            http_client,
            base_url: base_url.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Module for CrtSh {
    fn name(&self) -> String {
        String::from("subdomains/crtsh")
    }

    fn description(&self) -> String {
        String::from("Use crt.sh's certificate transparency logs to find subdomains")
    }
}

#[async_trait]
impl SubdomainModule for CrtSh {
    async fn enumerate(&self, domain: &Domain) -> Result<BTreeSet<String>, Error> {
        let mut url = endpoint(&self.base_url, "/")?;
        url.query_pairs_mut()
            .append_pair("q", &format!("%.{}", domain))
            .append_pair("output", "json");

        let res = get_with_retry(&self.http_client, url, self.retry, &self.name()).await?;

        let entries: Vec<CrtShEntry> = match res.json().await {
            Ok(entries) => entries,
            Err(_) => return Err(Error::InvalidHttpResponse(self.name())),
        };

        // a certificate can carry several names, one per line
        Ok(entries
            .iter()
            .filter_map(|entry| entry.name_value.as_deref())
            .flat_map(|names| names.split('\n'))
            .filter_map(|name| normalize(name, domain))
            .collect())
    }
}
