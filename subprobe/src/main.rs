use anyhow::Result;
use args::Args;
use clap::Parser;
use subprobe::progress;
use tracing_subscriber::EnvFilter;

mod args;
mod cli;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(progress::log_writer)
        .init();

    let args = Args::parse();

    match args {
        Args::Modules => cli::modules(),
        Args::Enumerate {
            input,
            output,
            timeout,
            results_dir,
        } => cli::enumerate(input, output, timeout, results_dir)?,
        Args::Probe {
            input,
            ports,
            threads,
            method,
            output,
            timeout,
            excluded_locations,
            no_dns,
            results_dir,
        } => cli::probe(cli::ProbeArgs {
            input,
            ports,
            threads,
            method,
            output,
            timeout,
            excluded_locations,
            no_dns,
            results_dir,
        })?,
    }

    Ok(())
}
