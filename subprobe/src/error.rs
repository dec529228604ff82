use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Url: {0}")]
    Url(#[from] url::ParseError),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("DNS resolver: {0}")]
    Resolver(#[from] trust_dns_resolver::error::ResolveError),
    #[error("{0}: Invalid HTTP response")]
    InvalidHttpResponse(String),
    #[error("{0}: Unexpected HTTP status {1}")]
    HttpStatus(String, u16),
    #[error("{0}: Gave up after {1} attempts")]
    RetriesExhausted(String, u32),
    #[error("{0}: Invalid domain")]
    InvalidDomain(String),
    #[error("{}: {source}", .path.display())]
    InputUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No valid targets found in input")]
    NoTargets,
}
