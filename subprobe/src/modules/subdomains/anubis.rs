use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Client;

use super::endpoint;
use crate::{
    modules::{Module, SubdomainModule},
    normalize::{normalize, Domain},
    Error,
};

const BASE_URL: &str = "https://jldc.me";

#[derive(Debug, Clone)]
pub struct AnubisDb {
    http_client: Client,
    base_url: String,
}

impl AnubisDb {
    pub fn new(http_client: Client) -> Self {
        AnubisDb::with_base_url(http_client, BASE_URL)
    }

    pub fn with_base_url(http_client: Client, base_url: &str) -> Self {
        AnubisDb {
            http_client,
            base_url: base_url.to_string(),
        }
    }
}

impl Module for AnubisDb {
    fn name(&self) -> String {
        String::from("subdomains/anubisdb")
    }

    fn description(&self) -> String {
        String::from("Use jldc.me's Anubis database to find subdomains")
    }
}

#[async_trait]
impl SubdomainModule for AnubisDb {
    async fn enumerate(&self, domain: &Domain) -> Result<BTreeSet<String>, Error> {
        let url = endpoint(&self.base_url, &format!("/anubis/subdomains/{}", domain))?;
        let res = self.http_client.get(url).send().await?;

        if !res.status().is_success() {
            return Err(Error::HttpStatus(self.name(), res.status().as_u16()));
        }

        let entries: Vec<String> = match res.json().await {
            Ok(entries) => entries,
            Err(_) => return Err(Error::InvalidHttpResponse(self.name())),
        };

        Ok(entries
            .iter()
            .filter_map(|entry| normalize(entry, domain))
            .collect())
    }
}
