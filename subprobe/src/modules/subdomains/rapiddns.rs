use std::{collections::BTreeSet, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

use super::endpoint;
use crate::{
    modules::{Module, SubdomainModule},
    normalize::{normalize, Domain},
    Error,
};

const BASE_URL: &str = "https://rapiddns.io";

pub const PAGE_SIZE: usize = 100;
pub const MAX_PAGES: u32 = 50;
const PAGE_DELAY: Duration = Duration::from_millis(500);

/// Number of pages to fetch for `total` results, page 1 included.
pub fn page_count(total: usize) -> u32 {
    let pages = total / PAGE_SIZE + usize::from(total % PAGE_SIZE != 0);
    pages.clamp(1, MAX_PAGES as usize) as u32
}

/// Remaining page numbers after the first one, bounded by `MAX_PAGES`.
#[derive(Debug, Clone)]
struct Pages {
    next: u32,
    last: u32,
}

impl Pages {
    fn after_first(total: usize) -> Self {
        Pages {
            next: 2,
            last: page_count(total),
        }
    }
}

impl Iterator for Pages {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.next > self.last {
            return None;
        }
        let page = self.next;
        self.next += 1;
        Some(page)
    }
}

#[derive(Debug, Clone)]
pub struct RapidDns {
    http_client: Client,
    base_url: String,
    page_delay: Duration,
}

impl RapidDns {
    pub fn new(http_client: Client) -> Self {
        RapidDns::with_base_url(http_client, BASE_URL)
    }

    pub fn with_base_url(http_client: Client, base_url: &str) -> Self {
        RapidDns {
            http_client,
            base_url: base_url.to_string(),
            page_delay: PAGE_DELAY,
        }
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    async fn fetch_page(&self, domain: &Domain, page: u32) -> Result<String, Error> {
        let mut url = endpoint(&self.base_url, &format!("/subdomain/{}", domain))?;
        if page == 1 {
            url.query_pairs_mut().append_pair("full", "1");
        } else {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }

        let res = self.http_client.get(url).send().await?;
        if !res.status().is_success() {
            return Err(Error::HttpStatus(self.name(), res.status().as_u16()));
        }

        Ok(res.text().await?)
    }
}

impl Module for RapidDns {
    fn name(&self) -> String {
        String::from("subdomains/rapiddns")
    }

    fn description(&self) -> String {
        String::from("Use rapiddns.io's paginated subdomain listing")
    }
}

struct ParsedPage {
    cells: Vec<String>,
    total: Option<usize>,
}

fn parse_page(body: &str) -> ParsedPage {
    let document = Html::parse_document(body);

    let cells = match Selector::parse("td") {
        Ok(selector) => document
            .select(&selector)
            .map(|cell| cell.text().collect::<String>())
            .collect(),
        Err(_) => Vec::new(),
    };

    // the result count is rendered in a highlighted span above the table
    let total = Selector::parse("span[style*='39cfca']")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .find_map(|span| span.text().collect::<String>().trim().parse().ok())
        });

    ParsedPage { cells, total }
}

#[async_trait]
impl SubdomainModule for RapidDns {
    async fn enumerate(&self, domain: &Domain) -> Result<BTreeSet<String>, Error> {
        let first = parse_page(&self.fetch_page(domain, 1).await?);

        let mut subdomains: BTreeSet<String> = first
            .cells
            .iter()
            .filter_map(|cell| normalize(cell, domain))
            .collect();

        let total = first.total.unwrap_or(0);
        for page in Pages::after_first(total) {
            tokio::time::sleep(self.page_delay).await;

            match self.fetch_page(domain, page).await {
                Ok(body) => {
                    let parsed = parse_page(&body);
                    subdomains.extend(
                        parsed
                            .cells
                            .iter()
                            .filter_map(|cell| normalize(cell, domain)),
                    );
                }
                Err(err) => debug!("{}: skipping page {}: {}", self.name(), page, err),
            }
        }

        Ok(subdomains)
    }
}
