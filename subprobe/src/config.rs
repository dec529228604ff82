use std::{path::PathBuf, time::Duration};

use crate::probe::HttpMethod;

pub const DEFAULT_RESULTS_DIR: &str = "files";
pub const DEFAULT_ENUMERATION_OUTPUT: &str = "API_Results";
pub const DEFAULT_PROBE_OUTPUT: &str = "scan_results.txt";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Maximum number of providers queried at once for a single domain.
pub const PROVIDER_CONCURRENCY: usize = 5;
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PROBE_CONCURRENCY: usize = 50;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_PROBE_PORTS: &[u16] = &[80];
pub const MAX_REDIRECTS: usize = 10;

/// Redirect targets injected by carrier captive portals. A probe that ends up
/// on one of these did not reach the host.
pub const DEFAULT_EXCLUDED_LOCATIONS: &[&str] = &[
    "https://jio.com/BalanceExhaust",
    "http://filter.ncell.com.np/nc",
];

#[derive(Debug, Clone)]
pub struct EnumerateConfig {
    pub results_dir: PathBuf,
    pub output: String,
    pub timeout: Duration,
}

impl Default for EnumerateConfig {
    fn default() -> Self {
        EnumerateConfig {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            output: with_txt_extension(DEFAULT_ENUMERATION_OUTPUT),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub results_dir: PathBuf,
    pub output: String,
    pub ports: Vec<u16>,
    pub concurrency: usize,
    pub method: HttpMethod,
    pub timeout: Duration,
    pub excluded_locations: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            output: DEFAULT_PROBE_OUTPUT.to_string(),
            ports: DEFAULT_PROBE_PORTS.to_vec(),
            concurrency: DEFAULT_PROBE_CONCURRENCY,
            method: HttpMethod::Get,
            timeout: DEFAULT_PROBE_TIMEOUT,
            excluded_locations: DEFAULT_EXCLUDED_LOCATIONS
                .iter()
                .map(|location| location.to_string())
                .collect(),
        }
    }
}

pub fn with_txt_extension(name: &str) -> String {
    if name.ends_with(".txt") {
        name.to_string()
    } else {
        format!("{name}.txt")
    }
}
