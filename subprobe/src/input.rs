use std::path::Path;

use tracing::warn;

use crate::{normalize::Domain, Error};

/// Non-blank, trimmed lines of `path`.
pub async fn read_lines(path: &Path) -> Result<Vec<String>, Error> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Validates each entry as a domain, dropping invalid ones with a warning.
/// Fails when nothing valid is left.
pub fn parse_domains<S: AsRef<str>>(entries: &[S]) -> Result<Vec<Domain>, Error> {
    let mut domains: Vec<Domain> = Vec::with_capacity(entries.len());
    for entry in entries {
        match Domain::parse(entry.as_ref()) {
            Ok(domain) if !domains.contains(&domain) => domains.push(domain),
            Ok(_) => {}
            Err(err) => warn!("skipping {}", err),
        }
    }

    if domains.is_empty() {
        return Err(Error::NoTargets);
    }
    Ok(domains)
}

pub fn require_hosts(hosts: Vec<String>) -> Result<Vec<String>, Error> {
    let hosts: Vec<String> = hosts
        .into_iter()
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .collect();

    if hosts.is_empty() {
        return Err(Error::NoTargets);
    }
    Ok(hosts)
}
