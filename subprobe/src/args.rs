use std::path::PathBuf;

use clap::Parser;
use subprobe::config::{DEFAULT_ENUMERATION_OUTPUT, DEFAULT_PROBE_OUTPUT, DEFAULT_RESULTS_DIR};

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Input {
    /// A single domain or host
    #[arg(long)]
    pub target: Option<String>,
    /// File with one domain or host per line
    #[arg(short, long)]
    pub list: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub enum Args {
    /// List the subdomain providers
    Modules,
    /// Find subdomains through every provider
    Enumerate {
        #[command(flatten)]
        input: Input,
        /// Result file name, `.txt` is appended when missing
        #[arg(short, long, default_value = DEFAULT_ENUMERATION_OUTPUT)]
        output: String,
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
        #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
        results_dir: PathBuf,
    },
    /// Probe hosts over HTTP(S) and record the responsive ones
    Probe {
        #[command(flatten)]
        input: Input,
        /// Comma separated ports
        #[arg(short, long, value_delimiter = ',', default_value = "80")]
        ports: Vec<u16>,
        /// Concurrent requests
        #[arg(short, long, default_value_t = 50)]
        threads: usize,
        /// GET, POST or HEAD
        #[arg(short, long, default_value = "GET")]
        method: String,
        #[arg(short, long, default_value = DEFAULT_PROBE_OUTPUT)]
        output: String,
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,
        /// Extra redirect targets to treat as false positives
        #[arg(long = "exclude")]
        excluded_locations: Vec<String>,
        /// Skip resolving hosts to IP addresses
        #[arg(long)]
        no_dns: bool,
        #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
        results_dir: PathBuf,
    },
}
