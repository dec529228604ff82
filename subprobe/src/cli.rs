use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Result;
use colored::Colorize;
use subprobe::{
    config::{with_txt_extension, EnumerateConfig, ProbeConfig},
    dns::{DnsResolver, NoResolver, Resolve},
    enumerate::{run_domains, DomainSummary, ProviderOutcome},
    http::build_client,
    input::{parse_domains, read_lines, require_hosts},
    modules::{all_providers, Module},
    probe::{self, format_elapsed, HttpMethod, ProbeContext, ReqwestProbe},
    sink::Sink,
};
use tracing::{error, warn};

use crate::args::Input;

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

async fn load_input(input: &Input) -> Result<Vec<String>> {
    match (&input.target, &input.list) {
        (Some(target), _) => Ok(vec![target.clone()]),
        (None, Some(path)) => Ok(read_lines(path).await?),
        (None, None) => Ok(Vec::new()),
    }
}

async fn open_sink(results_dir: &Path, file_name: &str) -> Sink {
    match Sink::in_dir(results_dir, file_name).await {
        Ok(sink) => sink,
        Err(err) => {
            error!("could not create {}: {}", results_dir.display(), err);
            Sink::new(results_dir.join(file_name))
        }
    }
}

pub fn modules() {
    let http_client = reqwest::Client::new();
    let providers = all_providers(&http_client);

    println!("Subdomain providers");
    for provider in providers {
        println!("    {}: {}", provider.name(), provider.description());
    }
}

fn print_domain(summary: &DomainSummary) {
    println!("\n{} {}", "Target:".yellow().bold(), summary.domain.to_string().cyan().bold());
    for report in &summary.reports {
        let name = report.provider.trim_start_matches("subdomains/");
        match &report.outcome {
            ProviderOutcome::Found(0) => println!("  {}", format!("• {}: 0", name).dimmed()),
            ProviderOutcome::Found(count) => {
                println!("  {}", format!("✔ {}: {}", name, count).green())
            }
            ProviderOutcome::Failed(_) => println!("  {}", format!("✘ {}: Failed", name).red()),
        }
    }
}

pub fn enumerate(input: Input, output: String, timeout: u64, results_dir: PathBuf) -> Result<()> {
    let config = EnumerateConfig {
        results_dir,
        output: with_txt_extension(&output),
        timeout: Duration::from_secs(timeout),
    };

    let runtime = runtime()?;
    runtime.block_on(async move {
        let entries = load_input(&input).await?;
        let domains = parse_domains(entries.as_slice())?;

        let http_client = build_client(config.timeout)?;
        let providers = all_providers(&http_client);
        let sink = open_sink(&config.results_dir, &config.output).await;

        println!("{}", format!("Scanning {} targets...", domains.len()).bold());
        let summaries = run_domains(&domains, &providers, &sink, print_domain).await;

        let total: usize = summaries.iter().map(|summary| summary.found).sum();
        println!("\n{}", format!("Done! Total Found: {}", total).green().bold());
        println!("{}", format!("Saved to: {}", sink.path().display()).yellow().bold());

        Ok::<(), anyhow::Error>(())
    })
}

pub struct ProbeArgs {
    pub input: Input,
    pub ports: Vec<u16>,
    pub threads: usize,
    pub method: String,
    pub output: String,
    pub timeout: u64,
    pub excluded_locations: Vec<String>,
    pub no_dns: bool,
    pub results_dir: PathBuf,
}

pub fn probe(args: ProbeArgs) -> Result<()> {
    let ProbeArgs {
        input,
        ports,
        threads,
        method,
        output,
        timeout,
        excluded_locations,
        no_dns,
        results_dir,
    } = args;

    let parsed_method = HttpMethod::from_input(&method);
    if parsed_method.to_string() != method.trim().to_ascii_uppercase() {
        warn!("unsupported method {}, using {}", method, parsed_method);
    }

    let mut config = ProbeConfig {
        results_dir,
        output,
        ports,
        concurrency: threads.max(1),
        method: parsed_method,
        timeout: Duration::from_secs(timeout),
        ..ProbeConfig::default()
    };
    config.excluded_locations.extend(
        excluded_locations
            .into_iter()
            .filter(|location| !location.trim().is_empty()),
    );

    let runtime = runtime()?;
    runtime.block_on(async move {
        let hosts = require_hosts(load_input(&input).await?)?;

        let resolver: Arc<dyn Resolve> = if no_dns {
            Arc::new(NoResolver)
        } else {
            match DnsResolver::new() {
                Ok(resolver) => Arc::new(resolver),
                Err(err) => {
                    warn!("DNS resolution disabled: {}", err);
                    Arc::new(NoResolver)
                }
            }
        };

        let sink = open_sink(&config.results_dir, &config.output).await;
        let ctx = ProbeContext {
            http_client: Arc::new(ReqwestProbe::new(config.timeout)?),
            resolver,
            sink: Arc::new(sink),
            config,
        };

        println!("{}", format!("Scanning ({})...", ctx.config.method).green());
        let shutdown = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => warn!("interrupted, waiting for requests in flight"),
                Err(_) => futures::future::pending::<()>().await,
            }
        };
        let summary = probe::run(&ctx, &hosts, shutdown).await;

        println!(
            "\n{}",
            format!(
                "[+] Scan Complete! {} responsive ({}/{} scanned in {}).",
                summary.found,
                summary.scanned,
                summary.total,
                format_elapsed(summary.elapsed)
            )
            .green()
        );
        println!("{}", format!("[+] Saved to: {}", ctx.sink.path().display()).green());

        Ok::<(), anyhow::Error>(())
    })
}
