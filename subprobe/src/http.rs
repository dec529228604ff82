use std::time::Duration;

use reqwest::{redirect, Client, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::{
    config::{MAX_REDIRECTS, USER_AGENT},
    Error,
};

pub fn build_client(timeout: Duration) -> Result<Client, Error> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Bounded linear backoff for sources that answer with gateway errors under load.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// GETs `url`, retrying gateway errors and network failures.
///
/// Any other non-200 status fails immediately.
pub async fn get_with_retry(
    client: &Client,
    url: Url,
    policy: RetryPolicy,
    source: &str,
) -> Result<Response, Error> {
    let mut attempt = 0;

    while attempt < policy.max_attempts {
        attempt += 1;

        match client.get(url.clone()).send().await {
            Ok(res) if res.status() == StatusCode::OK => return Ok(res),
            Ok(res) if is_transient(res.status()) => {
                debug!("{}: attempt {} got {}", source, attempt, res.status());
            }
            Ok(res) => return Err(Error::HttpStatus(source.to_string(), res.status().as_u16())),
            Err(err) => {
                debug!("{}: attempt {} failed: {}", source, attempt, err);
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.backoff(attempt)).await;
        }
    }

    Err(Error::RetriesExhausted(source.to_string(), attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(6));
    }

    #[test]
    fn only_gateway_errors_are_transient() {
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_transient(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::NOT_FOUND));
    }
}
