use std::collections::BTreeSet;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use super::endpoint;
use crate::{
    modules::{Module, SubdomainModule},
    normalize::{normalize, Domain},
    Error,
};

const BASE_URL: &str = "http://web.archive.org";

#[derive(Debug, Clone)]
pub struct WebArchive {
    http_client: Client,
    base_url: String,
}

impl WebArchive {
    pub fn new(http_client: Client) -> Self {
        WebArchive::with_base_url(http_client, BASE_URL)
    }

    pub fn with_base_url(http_client: Client, base_url: &str) -> Self {
        WebArchive {
            http_client,
            base_url: base_url.to_string(),
        }
    }
}

impl Module for WebArchive {
    fn name(&self) -> String {
        String::from("subdomains/webarchive")
    }

    fn description(&self) -> String {
        String::from("Use web.archive.org's CDX index to find subdomains")
    }
}

fn extract_hosts(body: &str, domain: &Domain) -> Result<BTreeSet<String>, Error> {
    let pattern = Regex::new(&format!(
        r"(?i)(?:[a-z0-9-]+\.)+{}",
        regex::escape(domain.as_str())
    ))
    .map_err(|_| Error::InvalidDomain(domain.to_string()))?;

    Ok(body
        .lines()
        .filter(|line| line.to_ascii_lowercase().contains(domain.as_str()))
        .flat_map(|line| pattern.find_iter(line))
        .filter_map(|found| normalize(found.as_str(), domain))
        .collect())
}

#[async_trait]
impl SubdomainModule for WebArchive {
    async fn enumerate(&self, domain: &Domain) -> Result<BTreeSet<String>, Error> {
        let mut url = endpoint(&self.base_url, "/cdx/search/cdx")?;
        url.query_pairs_mut()
            .append_pair("url", &format!("*.{}/*", domain))
            .append_pair("output", "text")
            .append_pair("fl", "original")
            .append_pair("collapse", "urlkey");

        let res = self.http_client.get(url).send().await?;
        if !res.status().is_success() {
            return Err(Error::HttpStatus(self.name(), res.status().as_u16()));
        }

        let body = res.text().await?;
        extract_hosts(&body, domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hosts_from_archived_urls() {
        let domain = Domain::parse("example.com").unwrap();
        let body = "\
http://www.example.com/index.html
https://Api.Example.com:443/v1/users?id=1
http://cdn.other.org/example.com/logo.png
https://example.com/
";
        let hosts = extract_hosts(body, &domain).unwrap();
        assert_eq!(
            hosts.into_iter().collect::<Vec<_>>(),
            vec!["api.example.com".to_string(), "www.example.com".to_string()]
        );
    }
}
