use std::{
    fmt,
    future::Future,
    net::IpAddr,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use colored::Colorize;
use futures::{stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{header, Client, Method};
use tracing::{debug, error, info};
use url::Url;

use crate::{
    config::ProbeConfig,
    dns::Resolve,
    http::build_client,
    ports::{build_targets, probe_url},
    progress,
    sink::Sink,
    Error,
};

pub const HEADER: &str = "Code  Server               Port   IP Address     Host";
const SENTINEL: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Head,
}

impl HttpMethod {
    /// Parses `input` case-insensitively, falling back to GET.
    pub fn from_input(input: &str) -> Self {
        input.parse().unwrap_or(HttpMethod::Get)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Head => "HEAD",
        };
        f.write_str(name)
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Head => Method::HEAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
    pub method: HttpMethod,
}

/// What the prober needs from the final response of a request.
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub status: u16,
    pub server: Option<String>,
    pub location: Option<String>,
    pub final_url: String,
    pub redirected: bool,
}

#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn fetch(&self, method: HttpMethod, url: &str) -> Result<ProbeResponse, Error>;
}

pub struct ReqwestProbe {
    http_client: Client,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        Ok(ReqwestProbe {
            http_client: build_client(timeout)?,
        })
    }
}

fn header_value(headers: &header::HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn fetch(&self, method: HttpMethod, url: &str) -> Result<ProbeResponse, Error> {
        let res = self.http_client.request(method.into(), url).send().await?;
        let requested = Url::parse(url).ok();
        let redirected = requested.as_ref() != Some(res.url());
        let final_url = res.url().to_string();

        Ok(ProbeResponse {
            status: res.status().as_u16(),
            server: header_value(res.headers(), header::SERVER),
            location: header_value(res.headers(), header::LOCATION),
            final_url,
            redirected,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: u16,
    pub server: Option<String>,
    pub port: u16,
    pub ip: Option<IpAddr>,
    pub host: String,
}

impl ProbeResult {
    fn columns(&self) -> (String, String, String, String) {
        (
            format!("{:<4}", self.status),
            format!("{:<20}", self.server.as_deref().unwrap_or(SENTINEL)),
            format!("{:<5}", self.port),
            format!(
                "{:<15}",
                self.ip.map_or_else(|| SENTINEL.to_string(), |ip| ip.to_string())
            ),
        )
    }

    /// Fixed-width line written to the result file.
    pub fn row(&self) -> String {
        let (code, server, port, ip) = self.columns();
        format!("{code} {server} {port} {ip} {}", self.host)
    }

    pub fn colored_row(&self) -> String {
        let (code, server, port, ip) = self.columns();
        format!(
            "{} {} {} {} {}",
            code.green().bold(),
            server.cyan().bold(),
            port.yellow().bold(),
            ip.magenta().bold(),
            self.host.bright_blue().bold()
        )
    }
}

pub fn separator() -> String {
    "-".repeat(65)
}

/// `Xm Ys` from one minute up, seconds with two decimals below.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds >= 60.0 {
        format!("{}m {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Shared state handed to every probe worker.
pub struct ProbeContext {
    pub http_client: Arc<dyn HttpProbe>,
    pub resolver: Arc<dyn Resolve>,
    pub sink: Arc<Sink>,
    pub config: ProbeConfig,
}

fn is_excluded(response: &ProbeResponse, excluded_locations: &[String]) -> bool {
    excluded_locations
        .iter()
        .filter(|excluded| !excluded.is_empty())
        .any(|excluded| {
            let in_location = response
                .location
                .as_deref()
                .map_or(false, |location| location.contains(excluded.as_str()));
            let in_final_url =
                response.redirected && response.final_url.contains(excluded.as_str());
            in_location || in_final_url
        })
}

/// Requests one target. Network failures and excluded redirects yield `None`.
pub async fn probe(ctx: &ProbeContext, target: &ProbeTarget) -> Option<ProbeResult> {
    let url = probe_url(&target.host, target.port);

    let response = match tokio::time::timeout(
        ctx.config.timeout,
        ctx.http_client.fetch(target.method, &url),
    )
    .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            debug!("{} {}: {}", target.method, url, err);
            return None;
        }
        Err(_) => {
            debug!("{} {}: timed out", target.method, url);
            return None;
        }
    };

    if is_excluded(&response, &ctx.config.excluded_locations) {
        debug!("{}: redirected to an excluded location", url);
        return None;
    }

    let lookup = ctx.resolver.resolve(&target.host);
    let ip = match tokio::time::timeout(ctx.config.timeout, lookup).await {
        Ok(ip) => ip,
        Err(_) => {
            debug!("{}: lookup timed out", target.host);
            None
        }
    };

    Some(ProbeResult {
        status: response.status,
        server: response.server,
        port: target.port,
        ip,
        host: target.host.clone(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSummary {
    pub total: usize,
    pub scanned: usize,
    pub found: usize,
    pub elapsed: Duration,
}

fn progress_line(total: u64) -> ProgressBar {
    let progress = progress::register(ProgressBar::new(total));
    if let Ok(style) = ProgressStyle::with_template("{msg}") {
        progress.set_style(style);
    }
    progress
}

fn print_line(progress: &ProgressBar, line: String) {
    if progress.is_hidden() {
        println!("{line}");
    } else {
        progress.println(line);
    }
}

/// Probes every host on every configured port.
///
/// Results are printed and saved in completion order. Once `shutdown`
/// resolves no new targets are started; requests already in flight finish.
pub async fn run<F>(ctx: &ProbeContext, hosts: &[String], shutdown: F) -> ProbeSummary
where
    F: Future<Output = ()>,
{
    let targets = build_targets(hosts, &ctx.config.ports, ctx.config.method);
    let total = targets.len();

    if let Err(err) = ctx.sink.append([HEADER.to_string(), separator()]).await {
        error!("could not write header to {}: {}", ctx.sink.path().display(), err);
    }

    let progress = progress_line(total as u64);
    print_line(
        &progress,
        format!(
            "{}  {}               {}   {}     {}",
            "Code".green(),
            "Server".cyan(),
            "Port".yellow(),
            "IP Address".magenta(),
            "Host".bright_blue()
        ),
    );
    print_line(&progress, separator());

    let start = Instant::now();
    let mut scanned = 0;
    let mut found = 0;

    let results = stream::iter(targets)
        .take_until(shutdown)
        .map(|target| async move { probe(ctx, &target).await })
        .buffer_unordered(ctx.config.concurrency.max(1));
    futures::pin_mut!(results);

    while let Some(result) = results.next().await {
        scanned += 1;

        if let Some(result) = result {
            found += 1;
            print_line(&progress, result.colored_row());
            if let Err(err) = ctx.sink.append([result.row()]).await {
                error!("could not save {}: {}", result.host, err);
            }
        }

        progress.inc(1);
        progress.set_message(format!(
            "Progress: {}/{} | Found: {} | Time: {}",
            scanned,
            total,
            found,
            format_elapsed(start.elapsed())
        ));
    }

    progress.finish_and_clear();
    progress::release(&progress);
    info!("probed {}/{} targets, {} responsive", scanned, total, found);

    ProbeSummary {
        total,
        scanned,
        found,
        elapsed: start.elapsed(),
    }
}
