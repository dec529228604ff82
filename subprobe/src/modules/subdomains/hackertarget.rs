use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};

use super::endpoint;
use crate::{
    modules::{Module, SubdomainModule},
    normalize::{normalize, Domain},
    Error,
};

const BASE_URL: &str = "https://api.hackertarget.com";

#[derive(Debug, Clone)]
pub struct HackerTarget {
    http_client: Client,
    base_url: String,
}

impl HackerTarget {
    pub fn new(http_client: Client) -> Self {
        HackerTarget::with_base_url(http_client, BASE_URL)
    }

    pub fn with_base_url(http_client: Client, base_url: &str) -> Self {
        HackerTarget {
            http_client,
            base_url: base_url.to_string(),
        }
    }
}

impl Module for HackerTarget {
    fn name(&self) -> String {
        String::from("subdomains/hackertarget")
    }

    fn description(&self) -> String {
        String::from("Use hackertarget.com's host search to find subdomains")
    }
}

#[async_trait]
impl SubdomainModule for HackerTarget {
    async fn enumerate(&self, domain: &Domain) -> Result<BTreeSet<String>, Error> {
        let mut url = endpoint(&self.base_url, "/hostsearch/")?;
        url.query_pairs_mut().append_pair("q", domain.as_str());

        let res = self.http_client.get(url).send().await?;
        if !res.status().is_success() {
            return Err(Error::HttpStatus(self.name(), res.status().as_u16()));
        }

        // errors such as "API count exceeded" come back as JSON or HTML
        let is_text = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.contains("text"));
        if !is_text {
            return Err(Error::InvalidHttpResponse(self.name()));
        }

        let body = res.text().await?;

        Ok(body
            .lines()
            .filter_map(|line| line.split(',').next())
            .filter_map(|host| normalize(host, domain))
            .collect())
    }
}
